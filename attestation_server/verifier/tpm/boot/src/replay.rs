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

//! PCR Replay Engine
//!
//! Folds event records into one PCR bank per active digest algorithm. EV_NO_ACTION records are never
//! extended; a StartupLocality record re-seeds PCR 0. Algorithms declared by the log that this crate
//! cannot hash get no bank and are reported in `ReplayResult::skipped_algorithms`.

use log::{debug, warn};
use tpm_common_verifier::{AlgorithmId, PcrBank, TcgError, PCR_COUNT};
use crate::event::model::{EventRecord, LogFormat};
use crate::event::parser::EventLogReader;

/// Algorithm preferred for the single expected PCR list
const PREFERRED_ALGORITHM: AlgorithmId = AlgorithmId::Sha256;

/// Final PCR state of one replay run
#[derive(Debug, Clone)]
pub struct ReplayResult {
    format: LogFormat,
    banks: Vec<PcrBank>,
    skipped_algorithms: Vec<u16>,
    startup_locality: Option<u8>,
    event_count: usize,
    extended_count: usize,
}

impl ReplayResult {
    pub fn format(&self) -> &LogFormat {
        &self.format
    }

    /// Banks in the declaration order of the log
    pub fn banks(&self) -> &[PcrBank] {
        &self.banks
    }

    pub fn bank(&self, alg: AlgorithmId) -> Option<&PcrBank> {
        self.banks.iter().find(|b| b.algorithm() == alg)
    }

    /// Declared algorithm ids that were not replayed
    pub fn skipped_algorithms(&self) -> &[u16] {
        &self.skipped_algorithms
    }

    pub fn startup_locality(&self) -> Option<u8> {
        self.startup_locality
    }

    /// Number of records seen, including EV_NO_ACTION records
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Number of records extended into the banks
    pub fn extended_count(&self) -> usize {
        self.extended_count
    }

    /// SHA-256 when active, otherwise the first replayed bank
    ///
    /// # Errors
    /// * `TcgError::UnsupportedAlgorithm` - If no declared algorithm could be replayed
    pub fn primary_bank(&self) -> Result<&PcrBank, TcgError> {
        self.bank(PREFERRED_ALGORITHM)
            .or_else(|| self.banks.first())
            .ok_or_else(|| {
                TcgError::UnsupportedAlgorithm(self.skipped_algorithms.first().copied().unwrap_or_default())
            })
    }

    /// Hex PCR values 0..24 of `alg`, or of the primary bank when `alg` is `None`
    pub fn expected_pcr_values(&self, alg: Option<AlgorithmId>) -> Result<Vec<String>, TcgError> {
        let bank = match alg {
            Some(alg) => self.bank(alg).ok_or(TcgError::InactiveAlgorithm(alg))?,
            None => self.primary_bank()?,
        };
        Ok(bank.to_hex_values())
    }
}

/// Incremental replay over the records of one log
pub struct PcrReplayEngine {
    format: LogFormat,
    banks: Vec<PcrBank>,
    skipped_algorithms: Vec<u16>,
    startup_locality: Option<u8>,
    event_count: usize,
    extended_count: usize,
}

impl PcrReplayEngine {
    /// Create seeded banks for every hashable algorithm the log declares
    pub fn new(format: &LogFormat) -> Self {
        let mut banks: Vec<PcrBank> = Vec::new();
        let mut skipped_algorithms: Vec<u16> = Vec::new();

        for algorithm_id in format.algorithm_ids() {
            match AlgorithmId::try_from(algorithm_id) {
                Ok(alg) if banks.iter().any(|b| b.algorithm() == alg) => {},
                Ok(alg) => banks.push(PcrBank::new(alg)),
                Err(_) => {
                    warn!("Digest algorithm {} is not supported, its PCR bank is not replayed",
                        AlgorithmId::name_of(algorithm_id));
                    skipped_algorithms.push(algorithm_id);
                }
            }
        }

        Self {
            format: format.clone(),
            banks,
            skipped_algorithms,
            startup_locality: None,
            event_count: 0,
            extended_count: 0,
        }
    }

    /// Apply one record
    ///
    /// # Errors
    /// * `TcgError::MalformedLog` - If the record lacks a digest for a replayed algorithm
    /// * `TcgError::InvalidPcrIndex` - If the record targets a PCR outside 0..24
    pub fn process(&mut self, event: &EventRecord) -> Result<(), TcgError> {
        self.event_count += 1;

        if event.is_no_action() {
            if let Some(locality) = event.startup_locality() {
                self.apply_startup_locality(event, locality)?;
            }
            return Ok(());
        }

        if event.pcr_index as usize >= PCR_COUNT {
            return Err(TcgError::InvalidPcrIndex(event.pcr_index));
        }

        // every bank must be measured before any bank moves
        let mut measurements: Vec<&[u8]> = Vec::with_capacity(self.banks.len());
        for bank in &self.banks {
            let digest = event.digest(bank.algorithm()).ok_or_else(|| TcgError::malformed(
                event.offset,
                format!("Event {} ({}) carries no {} digest", event.sequence_number, event.event_type, bank.algorithm()),
            ))?;
            measurements.push(digest);
        }

        for (bank, measurement) in self.banks.iter_mut().zip(measurements) {
            bank.extend(event.pcr_index, measurement)?;
        }
        self.extended_count += 1;
        Ok(())
    }

    fn apply_startup_locality(&mut self, event: &EventRecord, locality: u8) -> Result<(), TcgError> {
        let mut applied = false;
        for bank in self.banks.iter_mut() {
            applied |= bank.set_startup_locality(locality)?;
        }
        if applied || self.banks.is_empty() {
            debug!("Startup locality {} applied to PCR0", locality);
            self.startup_locality = Some(locality);
        } else {
            warn!("StartupLocality event {} follows a PCR0 measurement and is ignored", event.sequence_number);
        }
        Ok(())
    }

    pub fn finish(self) -> ReplayResult {
        ReplayResult {
            format: self.format,
            banks: self.banks,
            skipped_algorithms: self.skipped_algorithms,
            startup_locality: self.startup_locality,
            event_count: self.event_count,
            extended_count: self.extended_count,
        }
    }
}

/// Replay a sequence of records; the first error aborts the run
pub fn replay_events<I>(format: &LogFormat, events: I) -> Result<ReplayResult, TcgError>
where
    I: IntoIterator<Item = Result<EventRecord, TcgError>>,
{
    let mut engine = PcrReplayEngine::new(format);
    for event in events {
        engine.process(&event?)?;
    }
    Ok(engine.finish())
}

/// Replay every record of `reader`
pub fn replay_log(reader: &EventLogReader) -> Result<ReplayResult, TcgError> {
    replay_events(reader.format(), reader.events())
}
