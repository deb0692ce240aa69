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

//! PCR banks, one per digest algorithm, mutated only through the TPM extend operation.
//! # Examples
//! ```
//! use tpm_common_verifier::{AlgorithmId, PcrBank};
//!
//! let mut bank = PcrBank::new(AlgorithmId::Sha256);
//! bank.extend(7, &[0u8; 32]).unwrap();
//! assert_eq!(bank.to_hex_values().len(), 24);
//! ```

use log::debug;

use crate::crypto_utils::CryptoVerifier;
use crate::error::TcgError;
use crate::structure::AlgorithmId;

/// Number of PCR registers in a PC Client TPM bank
pub const PCR_COUNT: usize = 24;

/// Only PCR 0 observes the startup locality
const LOCALITY_PCR_INDEX: u32 = 0;

/// Build the reset value of a PCR register.
///
/// PCR 0-16 and 23 reset to zeros, PCR 17-22 (dynamic RTM) reset to all ones. For PCR 0 the startup
/// locality, if known, is placed in the last byte.
pub fn create_initial_pcr_value(alg: AlgorithmId, pcr_index: u32, locality: Option<u8>) -> Result<Vec<u8>, TcgError> {
    let digest_size = alg.digest_size();

    let mut initial_value = match pcr_index {
        0..=16 | 23 => vec![0u8; digest_size],
        17..=22 => vec![0xffu8; digest_size],
        _ => return Err(TcgError::InvalidPcrIndex(pcr_index)),
    };

    if pcr_index == LOCALITY_PCR_INDEX {
        if let Some(loc) = locality {
            initial_value[digest_size - 1] = loc;
        }
    }

    Ok(initial_value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcrBank {
    algorithm: AlgorithmId,
    values: Vec<Vec<u8>>,
    extend_counts: Vec<u32>,
}

impl PcrBank {
    /// Create a bank holding the reset value of every register
    pub fn new(algorithm: AlgorithmId) -> Self {
        // every index below PCR_COUNT has a reset value
        let values = (0..PCR_COUNT as u32)
            .filter_map(|index| create_initial_pcr_value(algorithm, index, None).ok())
            .collect();

        Self {
            algorithm,
            values,
            extend_counts: vec![0; PCR_COUNT],
        }
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Re-seed PCR 0 with the startup locality.
    ///
    /// Has no effect once PCR 0 has been extended; the locality only applies to the reset value.
    pub fn set_startup_locality(&mut self, locality: u8) -> Result<bool, TcgError> {
        let index = LOCALITY_PCR_INDEX as usize;
        if self.extend_counts[index] > 0 {
            return Ok(false);
        }
        self.values[index] = create_initial_pcr_value(self.algorithm, LOCALITY_PCR_INDEX, Some(locality))?;
        debug!("Re-seeded {} PCR {} with startup locality {}", self.algorithm, LOCALITY_PCR_INDEX, locality);
        Ok(true)
    }

    /// Extend `measurement` into register `index`: `bank[index] = H(bank[index] || measurement)`
    pub fn extend(&mut self, index: u32, measurement: &[u8]) -> Result<(), TcgError> {
        let slot = Self::slot(index)?;
        let next = CryptoVerifier::extend(self.algorithm, &self.values[slot], measurement)?;
        self.values[slot] = next;
        self.extend_counts[slot] += 1;
        Ok(())
    }

    pub fn value(&self, index: u32) -> Option<&[u8]> {
        self.values.get(index as usize).map(|v| v.as_slice())
    }

    /// Number of measurements extended into register `index`
    pub fn extend_count(&self, index: u32) -> u32 {
        self.extend_counts.get(index as usize).copied().unwrap_or(0)
    }

    /// Hex-encoded register values, indexed 0..PCR_COUNT
    pub fn to_hex_values(&self) -> Vec<String> {
        self.values.iter().map(hex::encode).collect()
    }

    /// SHA-256 over the concatenated register values, hex-encoded.
    ///
    /// Used by callers to detect whether the expected PCR set of a log has changed.
    pub fn fingerprint(&self) -> Result<String, TcgError> {
        let parts: Vec<&[u8]> = self.values.iter().map(|v| v.as_slice()).collect();
        let digest = CryptoVerifier::hash(AlgorithmId::Sha256, &parts)?;
        Ok(hex::encode(digest))
    }

    fn slot(index: u32) -> Result<usize, TcgError> {
        if (index as usize) < PCR_COUNT {
            Ok(index as usize)
        } else {
            Err(TcgError::InvalidPcrIndex(index))
        }
    }
}
