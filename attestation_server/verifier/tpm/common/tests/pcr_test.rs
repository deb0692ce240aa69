/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use tpm_common_verifier::{AlgorithmId, CryptoVerifier, PcrBank, TcgError, PCR_COUNT, create_initial_pcr_value};

// sha256(00 00 00 00), the digest of an EV_SEPARATOR event
const SHA256_SEPARATOR: &str = "df3f619804a92fdb4057192dc43dd748ea778adc52bc498ce80524c014b81119";
// PCR value after extending only the separator into a zeroed register
const SHA256_SEPARATOR_PCR: &str = "3d458cfe55cc03ea1f443f1562beec8df51c75e14a9fcf9a7234a13f198e7969";
const SHA1_SEPARATOR: &str = "9069ca78e7450a285173431b3e52c5c25299e473";
const SHA1_SEPARATOR_PCR: &str = "b2a83b0ebf2f8374299a5b2bdfc31ea955ad7236";

#[test]
fn test_hash_of_separator_value() {
    let sha256 = CryptoVerifier::hash(AlgorithmId::Sha256, &[&[0u8; 4]]).unwrap();
    assert_eq!(hex::encode(sha256), SHA256_SEPARATOR);

    let sha1 = CryptoVerifier::hash(AlgorithmId::Sha1, &[&[0u8; 4]]).unwrap();
    assert_eq!(hex::encode(sha1), SHA1_SEPARATOR);
}

#[test]
fn test_extend_separator_into_zeroed_register() {
    let mut bank = PcrBank::new(AlgorithmId::Sha256);
    bank.extend(2, &hex::decode(SHA256_SEPARATOR).unwrap()).unwrap();
    assert_eq!(hex::encode(bank.value(2).unwrap()), SHA256_SEPARATOR_PCR);

    let mut bank = PcrBank::new(AlgorithmId::Sha1);
    bank.extend(2, &hex::decode(SHA1_SEPARATOR).unwrap()).unwrap();
    assert_eq!(hex::encode(bank.value(2).unwrap()), SHA1_SEPARATOR_PCR);
}

#[test]
fn test_extend_zero_measurement() {
    let extended = CryptoVerifier::extend(AlgorithmId::Sha256, &[0u8; 32], &[0u8; 32]).unwrap();
    assert_eq!(
        hex::encode(extended),
        "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"
    );
}

#[test]
fn test_extend_rejects_wrong_measurement_length() {
    let result = CryptoVerifier::extend(AlgorithmId::Sha256, &[0u8; 32], &[0u8; 20]);
    assert!(matches!(result, Err(TcgError::Hash(_))));
}

#[test]
fn test_new_bank_holds_reset_values() {
    let bank = PcrBank::new(AlgorithmId::Sha384);
    let values = bank.to_hex_values();
    assert_eq!(values.len(), PCR_COUNT);

    for (index, value) in values.iter().enumerate() {
        let expected = if (17..=22).contains(&index) { "ff" } else { "00" }.repeat(48);
        assert_eq!(value, &expected, "PCR{} reset value", index);
        assert_eq!(bank.extend_count(index as u32), 0);
    }
}

#[test]
fn test_extend_is_order_sensitive() {
    let first = [0x11u8; 32];
    let second = [0x22u8; 32];

    let mut forward = PcrBank::new(AlgorithmId::Sha256);
    forward.extend(4, &first).unwrap();
    forward.extend(4, &second).unwrap();

    let mut backward = PcrBank::new(AlgorithmId::Sha256);
    backward.extend(4, &second).unwrap();
    backward.extend(4, &first).unwrap();

    assert_ne!(forward.value(4), backward.value(4));
    assert_eq!(forward.extend_count(4), 2);
    // untouched registers keep their reset value
    assert_eq!(forward.value(5), backward.value(5));
}

#[test]
fn test_extend_out_of_range_index() {
    let mut bank = PcrBank::new(AlgorithmId::Sha1);
    assert_eq!(bank.extend(24, &[0u8; 20]), Err(TcgError::InvalidPcrIndex(24)));
}

#[test]
fn test_startup_locality_seeds_pcr0() {
    let mut bank = PcrBank::new(AlgorithmId::Sha256);
    assert!(bank.set_startup_locality(3).unwrap());
    let mut expected = vec![0u8; 32];
    expected[31] = 3;
    assert_eq!(bank.value(0).unwrap(), expected.as_slice());

    bank.extend(0, &[0xaa; 32]).unwrap();
    assert!(!bank.set_startup_locality(4).unwrap());
}

#[test]
fn test_new_bank_matches_initial_values() {
    for alg in [AlgorithmId::Sha1, AlgorithmId::Sha256, AlgorithmId::Sha512] {
        let bank = PcrBank::new(alg);
        for index in 0..PCR_COUNT as u32 {
            let expected = create_initial_pcr_value(alg, index, None).unwrap();
            assert_eq!(bank.value(index), Some(expected.as_slice()), "{} PCR{}", alg, index);
        }
    }
}

#[test]
fn test_create_initial_pcr_value() {
    let pcr0 = create_initial_pcr_value(AlgorithmId::Sha1, 0, Some(3)).unwrap();
    assert_eq!(hex::encode(pcr0), "0000000000000000000000000000000000000003");

    let pcr17 = create_initial_pcr_value(AlgorithmId::Sha1, 17, Some(3)).unwrap();
    assert_eq!(pcr17, vec![0xff; 20]);

    assert_eq!(create_initial_pcr_value(AlgorithmId::Sha1, 30, None), Err(TcgError::InvalidPcrIndex(30)));
}

#[test]
fn test_fingerprint_tracks_content() {
    let mut bank = PcrBank::new(AlgorithmId::Sha256);
    let before = bank.fingerprint().unwrap();
    assert_eq!(before, bank.clone().fingerprint().unwrap());

    bank.extend(7, &[0x01; 32]).unwrap();
    assert_ne!(before, bank.fingerprint().unwrap());
}
