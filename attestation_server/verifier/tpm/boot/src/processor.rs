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

//! Event Log Processor
//!
//! Facade over the reader and the replay engine. The strict methods return `Result`; the `get_*` methods
//! never fail, they log the failure and return `LogOutcome::Unreadable`, whose empty value means
//! "unknown" and never "no measurements".

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error};
use tpm_common_verifier::{AlgorithmId, TcgError};
use crate::event::model::EventRecord;
use crate::event::parser::EventLogReader;
use crate::replay::{replay_log, ReplayResult};

/// Result of a processor call that is not allowed to fail
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutcome<T> {
    Parsed(T),
    /// The log could not be read or replayed; the error has already been logged
    Unreadable(TcgError),
}

impl<T> LogOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, LogOutcome::Parsed(_))
    }

    pub fn error(&self) -> Option<&TcgError> {
        match self {
            LogOutcome::Parsed(_) => None,
            LogOutcome::Unreadable(e) => Some(e),
        }
    }

    pub fn parsed(self) -> Option<T> {
        match self {
            LogOutcome::Parsed(value) => Some(value),
            LogOutcome::Unreadable(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, TcgError> {
        match self {
            LogOutcome::Parsed(value) => Ok(value),
            LogOutcome::Unreadable(e) => Err(e),
        }
    }
}

impl<T: Default> LogOutcome<T> {
    /// The parsed value, or the empty value for an unreadable log
    pub fn or_empty(self) -> T {
        self.parsed().unwrap_or_default()
    }
}

impl<T> From<Result<T, TcgError>> for LogOutcome<T> {
    fn from(result: Result<T, TcgError>) -> Self {
        match result {
            Ok(value) => LogOutcome::Parsed(value),
            Err(e) => LogOutcome::Unreadable(e),
        }
    }
}

/// Event log processor over one log buffer
///
/// # Examples
/// ```rust ignore
/// let pcrs = EventLogProcessor::new(&log_bytes)
///     .with_algorithm(AlgorithmId::Sha256)
///     .get_expected_pcr_values()
///     .or_empty();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EventLogProcessor<'a> {
    log: &'a [u8],
    algorithm: Option<AlgorithmId>,
}

impl<'a> EventLogProcessor<'a> {
    pub fn new(log: &'a [u8]) -> Self {
        Self { log, algorithm: None }
    }

    /// Select the bank reported by `expected_pcr_values`; by default SHA-256 when active, else the first
    /// replayed bank
    pub fn with_algorithm(mut self, algorithm: AlgorithmId) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn reader(&self) -> Result<EventLogReader<'a>, TcgError> {
        EventLogReader::new(self.log)
    }

    /// Replay the whole log into every supported bank
    pub fn replay(&self) -> Result<ReplayResult, TcgError> {
        let reader = self.reader()?;
        let result = replay_log(&reader)?;
        debug!("Replayed {} events ({} extended), banks: {:?}, skipped algorithms: {:?}",
            result.event_count(),
            result.extended_count(),
            result.banks().iter().map(|b| b.algorithm()).collect::<Vec<_>>(),
            result.skipped_algorithms());
        Ok(result)
    }

    pub fn expected_pcr_values(&self) -> Result<Vec<String>, TcgError> {
        self.replay()?.expected_pcr_values(self.algorithm)
    }

    pub fn event_list(&self) -> Result<Vec<EventRecord>, TcgError> {
        self.reader()?.read_all()
    }

    /// Expected PCR values 0..24 as hex strings; empty when the log is unreadable
    pub fn get_expected_pcr_values(&self) -> LogOutcome<Vec<String>> {
        self.expected_pcr_values()
            .map_err(|e| {
                error!("Unable to compute expected PCR values from event log: {}", e);
                e
            })
            .into()
    }

    /// Every record of the log in order; empty when the log is unreadable
    pub fn get_event_list(&self) -> LogOutcome<Vec<EventRecord>> {
        self.event_list()
            .map_err(|e| {
                error!("Unable to read event list from event log: {}", e);
                e
            })
            .into()
    }

    /// Replay result with every bank; unreadable when the log cannot be replayed
    pub fn get_replay(&self) -> LogOutcome<ReplayResult> {
        self.replay()
            .map_err(|e| {
                error!("Unable to replay event log: {}", e);
                e
            })
            .into()
    }

    /// Decode a base64 transported event log
    pub fn decode_base64(text: &str) -> Result<Vec<u8>, TcgError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        BASE64.decode(compact.as_bytes())
            .map_err(|e| TcgError::Decode(format!("Failed to decode event log: {}", e)))
    }
}

/// Expected PCR values of `log` with the default bank selection
pub fn get_expected_pcr_values(log: &[u8]) -> LogOutcome<Vec<String>> {
    EventLogProcessor::new(log).get_expected_pcr_values()
}

/// Event list of `log`
pub fn get_event_list(log: &[u8]) -> LogOutcome<Vec<EventRecord>> {
    EventLogProcessor::new(log).get_event_list()
}
