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

use thiserror::Error;
use crate::structure::AlgorithmId;

/// Errors raised while reading a TCG event log or replaying it into PCR banks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TcgError {
    /// The byte stream does not match a supported log layout, or a record is truncated.
    /// `offset` is the start of the first record that could not be read.
    #[error("Malformed event log at offset {offset}: {reason}")]
    MalformedLog { offset: u64, reason: String },

    #[error("Unsupported digest algorithm: 0x{0:04x}")]
    UnsupportedAlgorithm(u16),

    #[error("Digest algorithm {0} is not active in the event log")]
    InactiveAlgorithm(AlgorithmId),

    #[error("Invalid PCR index: {0}")]
    InvalidPcrIndex(u32),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl TcgError {
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        TcgError::MalformedLog { offset, reason: reason.into() }
    }

    /// Byte offset carried by the error, if it refers to a position in the log
    pub fn offset(&self) -> Option<u64> {
        match self {
            TcgError::MalformedLog { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
