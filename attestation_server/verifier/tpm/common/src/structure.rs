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

//! TPM algorithm identifiers (TPM_ALG_ID) for the digest algorithms this crate can hash.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Serializer};
use crate::error::TcgError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum AlgorithmId {
    Sha1 = 0x0004,
    Sha256 = 0x000B,
    Sha384 = 0x000C,
    Sha512 = 0x000D,
    Sm3 = 0x0012,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 5] = [
        AlgorithmId::Sha1,
        AlgorithmId::Sha256,
        AlgorithmId::Sha384,
        AlgorithmId::Sha512,
        AlgorithmId::Sm3,
    ];

    pub fn id(&self) -> u16 {
        *self as u16
    }

    pub fn digest_size(&self) -> usize {
        match self {
            AlgorithmId::Sha1 => 20,
            AlgorithmId::Sha256 => 32,
            AlgorithmId::Sha384 => 48,
            AlgorithmId::Sha512 => 64,
            AlgorithmId::Sm3 => 32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmId::Sha1 => "sha1",
            AlgorithmId::Sha256 => "sha256",
            AlgorithmId::Sha384 => "sha384",
            AlgorithmId::Sha512 => "sha512",
            AlgorithmId::Sm3 => "sm3",
        }
    }

    /// Display name for a raw TPM_ALG_ID, including ids this crate cannot hash
    pub fn name_of(raw: u16) -> String {
        match AlgorithmId::try_from(raw) {
            Ok(alg) => alg.name().to_string(),
            Err(_) => format!("UNKNOWN_0x{:04X}", raw),
        }
    }
}

impl TryFrom<u16> for AlgorithmId {
    type Error = TcgError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0004 => Ok(AlgorithmId::Sha1),
            0x000B => Ok(AlgorithmId::Sha256),
            0x000C => Ok(AlgorithmId::Sha384),
            0x000D => Ok(AlgorithmId::Sha512),
            0x0012 => Ok(AlgorithmId::Sm3),
            other => Err(TcgError::UnsupportedAlgorithm(other)),
        }
    }
}

impl FromStr for AlgorithmId {
    type Err = TcgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha1" => Ok(AlgorithmId::Sha1),
            "sha256" => Ok(AlgorithmId::Sha256),
            "sha384" => Ok(AlgorithmId::Sha384),
            "sha512" => Ok(AlgorithmId::Sha512),
            "sm3" => Ok(AlgorithmId::Sm3),
            other => Err(TcgError::Decode(format!("Unsupported algorithm name: {}", other))),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_algorithm_id_is_rejected() {
        assert_eq!(AlgorithmId::try_from(0x0027), Err(TcgError::UnsupportedAlgorithm(0x0027)));
        assert_eq!(AlgorithmId::name_of(0x0027), "UNKNOWN_0x0027");
    }

    #[test]
    fn test_name_round_trip() {
        for alg in AlgorithmId::ALL {
            assert_eq!(alg.name().parse::<AlgorithmId>().unwrap(), alg);
            assert_eq!(AlgorithmId::try_from(alg.id()).unwrap(), alg);
        }
    }
}
