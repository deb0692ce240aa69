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

//! Support reference integrity manifest: a reference event log shipped next to a base RIM.

use log::{error, info};
use tpm_common_verifier::TcgError;
use crate::event::model::EventRecord;
use crate::processor::{EventLogProcessor, LogOutcome};

pub const DEFAULT_RIM_FILE_NAME: &str = "blank.rimel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportReferenceManifest {
    file_name: String,
    rim_bytes: Vec<u8>,
    pcr_hash: Option<String>,
    updated: bool,
    processed: bool,
    swid_patch: bool,
    swid_supplemental: bool,
}

impl SupportReferenceManifest {
    pub fn new(file_name: impl Into<String>, rim_bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            rim_bytes,
            pcr_hash: None,
            updated: false,
            processed: false,
            swid_patch: false,
            swid_supplemental: false,
        }
    }

    pub fn from_bytes(rim_bytes: Vec<u8>) -> Self {
        Self::new(DEFAULT_RIM_FILE_NAME, rim_bytes)
    }

    pub fn with_swid_patch(mut self, swid_patch: bool) -> Self {
        self.swid_patch = swid_patch;
        self
    }

    pub fn with_swid_supplemental(mut self, swid_supplemental: bool) -> Self {
        self.swid_supplemental = swid_supplemental;
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn rim_bytes(&self) -> &[u8] {
        &self.rim_bytes
    }

    /// Fingerprint of the last successfully computed PCR list
    pub fn pcr_hash(&self) -> Option<&str> {
        self.pcr_hash.as_deref()
    }

    /// Set when a recomputed PCR list differs from the cached one
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn set_updated(&mut self, updated: bool) {
        self.updated = updated;
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// A base support RIM is neither a supplemental nor a patch RIM
    pub fn is_base_support(&self) -> bool {
        !self.swid_supplemental && !self.swid_patch
    }

    /// Expected PCR values of the embedded log; empty when the log is unreadable
    pub fn expected_pcr_list(&mut self) -> LogOutcome<Vec<String>> {
        match self.compute_pcr_list() {
            Ok((values, fingerprint)) => {
                if self.pcr_hash.as_deref().map_or(false, |cached| cached != fingerprint) {
                    info!("Expected PCR values of support RIM {} changed", self.file_name);
                    self.updated = true;
                }
                self.pcr_hash = Some(fingerprint);
                self.processed = true;
                LogOutcome::Parsed(values)
            },
            Err(e) => {
                error!("Unable to compute expected PCR list of support RIM {}: {}", self.file_name, e);
                LogOutcome::Unreadable(e)
            }
        }
    }

    fn compute_pcr_list(&self) -> Result<(Vec<String>, String), TcgError> {
        let result = EventLogProcessor::new(&self.rim_bytes).replay()?;
        let bank = result.primary_bank()?;
        Ok((bank.to_hex_values(), bank.fingerprint()?))
    }

    /// Event records of the embedded log; empty when the log is unreadable
    pub fn event_log(&self) -> LogOutcome<Vec<EventRecord>> {
        EventLogProcessor::new(&self.rim_bytes).get_event_list()
    }
}
