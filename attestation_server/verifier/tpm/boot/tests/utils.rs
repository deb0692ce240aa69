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

#![allow(dead_code)]

use openssl::hash::{hash, MessageDigest};

pub const SHA1: u16 = 0x0004;
pub const SHA256: u16 = 0x000B;
pub const SHA384: u16 = 0x000C;
/// An algorithm id with no hash implementation
pub const UNSUPPORTED_ALG: u16 = 0x0040;

pub const EV_POST_CODE: u32 = 0x0000_0001;
pub const EV_NO_ACTION: u32 = 0x0000_0003;
pub const EV_SEPARATOR: u32 = 0x0000_0004;
pub const EV_S_CRTM_VERSION: u32 = 0x0000_0008;
pub const EV_EFI_ACTION: u32 = 0x8000_0007;

const SPEC_ID_SIGNATURE: &[u8; 16] = b"Spec ID Event03\0";
const STARTUP_LOCALITY_SIGNATURE: &[u8; 16] = b"StartupLocality\0";

fn message_digest(alg: u16) -> Option<MessageDigest> {
    match alg {
        SHA1 => Some(MessageDigest::sha1()),
        SHA256 => Some(MessageDigest::sha256()),
        SHA384 => Some(MessageDigest::sha384()),
        _ => None,
    }
}

/// Digest of `data`; algorithms without an implementation get a filler of `size` bytes
pub fn digest_of(alg: u16, size: u16, data: &[u8]) -> Vec<u8> {
    match message_digest(alg) {
        Some(md) => hash(md, data).unwrap().to_vec(),
        None => vec![0xAB; size as usize],
    }
}

/// Independent TPM extend, used as the replay oracle
pub fn extend(alg: u16, current: &[u8], measurement: &[u8]) -> Vec<u8> {
    let md = message_digest(alg).unwrap();
    hash(md, &[current, measurement].concat()).unwrap().to_vec()
}

/// Assembles synthetic binary event logs
pub struct LogBuilder {
    bytes: Vec<u8>,
    algorithms: Vec<(u16, u16)>,
    crypto_agile: bool,
}

impl LogBuilder {
    /// TCG 1.2 log, every record carries one SHA1 digest
    pub fn legacy() -> Self {
        Self { bytes: Vec::new(), algorithms: vec![(SHA1, 20)], crypto_agile: false }
    }

    /// TCG 2.0 log starting with a Spec ID Event03 header declaring `algorithms` as (id, size)
    pub fn crypto_agile(algorithms: &[(u16, u16)]) -> Self {
        let mut spec_id = SPEC_ID_SIGNATURE.to_vec();
        spec_id.extend_from_slice(&0u32.to_le_bytes()); // platform class
        spec_id.extend_from_slice(&[0, 2, 0, 2]); // minor, major, errata, uintn size
        spec_id.extend_from_slice(&(algorithms.len() as u32).to_le_bytes());
        for (id, size) in algorithms {
            spec_id.extend_from_slice(&id.to_le_bytes());
            spec_id.extend_from_slice(&size.to_le_bytes());
        }
        spec_id.push(0); // vendor info size

        let mut builder = Self { bytes: Vec::new(), algorithms: algorithms.to_vec(), crypto_agile: true };
        builder.legacy_record(0, EV_NO_ACTION, &[0u8; 20], &spec_id);
        builder
    }

    /// Byte offset the next record will start at
    pub fn offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Record whose digests are the hash of `data` for every declared algorithm
    pub fn event(&mut self, pcr: u32, event_type: u32, data: &[u8]) -> &mut Self {
        let digests: Vec<(u16, Vec<u8>)> = self.algorithms.iter()
            .map(|(id, size)| (*id, digest_of(*id, *size, data)))
            .collect();
        self.event_with_digests(pcr, event_type, &digests, data)
    }

    /// Record with explicit digests
    pub fn event_with_digests(&mut self, pcr: u32, event_type: u32, digests: &[(u16, Vec<u8>)], data: &[u8]) -> &mut Self {
        if !self.crypto_agile {
            let digest: [u8; 20] = digests[0].1.as_slice().try_into().unwrap();
            self.legacy_record(pcr, event_type, &digest, data);
            return self;
        }

        self.bytes.extend_from_slice(&pcr.to_le_bytes());
        self.bytes.extend_from_slice(&event_type.to_le_bytes());
        self.bytes.extend_from_slice(&(digests.len() as u32).to_le_bytes());
        for (id, digest) in digests {
            self.bytes.extend_from_slice(&id.to_le_bytes());
            self.bytes.extend_from_slice(digest);
        }
        self.bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(data);
        self
    }

    /// EV_NO_ACTION StartupLocality record with zero digests
    pub fn startup_locality(&mut self, locality: u8) -> &mut Self {
        let mut data = STARTUP_LOCALITY_SIGNATURE.to_vec();
        data.push(locality);
        let digests: Vec<(u16, Vec<u8>)> = self.algorithms.iter()
            .map(|(id, size)| (*id, vec![0u8; *size as usize]))
            .collect();
        self.event_with_digests(0, EV_NO_ACTION, &digests, &data)
    }

    /// Raw bytes appended as-is
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    fn legacy_record(&mut self, pcr: u32, event_type: u32, digest: &[u8; 20], data: &[u8]) {
        self.bytes.extend_from_slice(&pcr.to_le_bytes());
        self.bytes.extend_from_slice(&event_type.to_le_bytes());
        self.bytes.extend_from_slice(digest);
        self.bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(data);
    }
}

/// A typical crypto-agile boot log with SHA1 and SHA256 banks
pub fn sample_agile_log() -> Vec<u8> {
    LogBuilder::crypto_agile(&[(SHA1, 20), (SHA256, 32)])
        .event(0, EV_S_CRTM_VERSION, &[0x31, 0x00, 0x2e, 0x00, 0x30, 0x00, 0x00, 0x00])
        .event(0, EV_POST_CODE, b"ACPI DATA")
        .event(1, EV_EFI_ACTION, b"Calling EFI Application from Boot Option")
        .event(0, EV_SEPARATOR, &[0, 0, 0, 0])
        .event(7, EV_SEPARATOR, &[0, 0, 0, 0])
        .build()
}
