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

//! Hash helpers for PCR replay
//!
//! This module provides helper functions for:
//! - Converting algorithm IDs to OpenSSL message digests
//! - Hashing arbitrary data
//! - The TPM extend operation `new = H(old || measurement)`
use openssl::hash::{Hasher, MessageDigest};
use crate::error::TcgError;
use crate::structure::AlgorithmId;

pub struct CryptoVerifier;

impl CryptoVerifier {
    pub fn algorithm_to_message_digest(alg: AlgorithmId) -> MessageDigest {
        match alg {
            AlgorithmId::Sha1 => MessageDigest::sha1(),
            AlgorithmId::Sha256 => MessageDigest::sha256(),
            AlgorithmId::Sha384 => MessageDigest::sha384(),
            AlgorithmId::Sha512 => MessageDigest::sha512(),
            AlgorithmId::Sm3 => MessageDigest::sm3(),
        }
    }

    /// Hash the concatenation of `parts` with the given algorithm
    pub fn hash(alg: AlgorithmId, parts: &[&[u8]]) -> Result<Vec<u8>, TcgError> {
        let mut hasher = Hasher::new(Self::algorithm_to_message_digest(alg))
            .map_err(|e| TcgError::Hash(format!("Failed to create {} hasher: {}", alg, e)))?;

        for part in parts {
            hasher.update(part)
                .map_err(|e| TcgError::Hash(format!("Failed to update {} hasher: {}", alg, e)))?;
        }

        let digest = hasher.finish()
            .map_err(|e| TcgError::Hash(format!("Failed to finalize {} hash: {}", alg, e)))?;
        Ok(digest.to_vec())
    }

    /// TPM extend: returns `H(current || measurement)`.
    ///
    /// Both inputs must be exactly one digest long for `alg`.
    pub fn extend(alg: AlgorithmId, current: &[u8], measurement: &[u8]) -> Result<Vec<u8>, TcgError> {
        let size = alg.digest_size();
        if current.len() != size || measurement.len() != size {
            return Err(TcgError::Hash(format!(
                "Extend with {} requires {}-byte values, got current {} and measurement {}",
                alg, size, current.len(), measurement.len()
            )));
        }
        Self::hash(alg, &[current, measurement])
    }
}
