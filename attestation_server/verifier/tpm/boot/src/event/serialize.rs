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

//! Event Serialization Module
//!
//! JSON rendering of event records and their decoded content. Digests and binary payloads are hex
//! strings, addresses are `0x` prefixed, and algorithm ids are shown by name.

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeStruct},
};
use serde_json::Value;
use tpm_common_verifier::{AlgorithmId, TcgError};
use crate::event::model::{
    EfiSpecIdEvent, EvNoActionEvent, EvSeparatorEvent, EventBaseString, EventContent, EventRecord, EventType,
    LegacySpecIdEvent, LogFormat, PCClientTaggedEvent, SCrtmVersionEvent, SpecIdAlgorithm, StartupLocalityEvent,
    TpmDigestEntry, UefiFirmwareBlobEvent, UefiImageLoadEvent, UefiPlatformFirmwareBlobEvent,
    UefiPlatformFirmwareBlobEvent2, UefiVariableDataEvent,
};

/// EventType is shown by its TCG name, e.g. EvNoAction -> EV_NO_ACTION
impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

impl Serialize for LogFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

/// Serializes a single string value as `{ "value": ... }`, without trailing nulls
fn serialize_string<S>(serializer: S, struct_name: &'static str, value: &str) -> Result<S::Ok, S::Error>
where
    S: Serializer
{
    let mut state = serializer.serialize_struct(struct_name, 1)?;
    state.serialize_field("value", &value.trim_end_matches('\0'))?;
    state.end()
}

fn serialize_firmware_blob<S>(serializer: S, blob_base: u64, blob_length: u64) -> Result<S::Ok, S::Error>
where
    S: Serializer
{
    let mut state = serializer.serialize_struct("FirmwareBlob", 2)?;
    state.serialize_field("blob_base", &format!("0x{:x}", blob_base))?;
    state.serialize_field("blob_length", &format!("0x{:x}", blob_length))?;
    state.end()
}

impl Serialize for SpecIdAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("SpecIdAlgorithm", 2)?;
        state.serialize_field("algorithm_id", &AlgorithmId::name_of(self.algorithm_id))?;
        state.serialize_field("digest_size", &self.digest_size)?;
        state.end()
    }
}

impl Serialize for EfiSpecIdEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("EfiSpecIdEvent", 8)?;
        state.serialize_field("signature", "Spec ID Event03")?;
        state.serialize_field("platform_class", &self.platform_class)?;
        state.serialize_field("family_minor", &self.family_minor)?;
        state.serialize_field("family_major", &self.family_major)?;
        state.serialize_field("spec_errata", &self.spec_errata)?;
        state.serialize_field("uintn_size", &self.uintn_size)?;
        state.serialize_field("digest_algorithms", &self.digest_algorithms)?;
        if !self.vendor_info.is_empty() {
            state.serialize_field("vendor_info", &hex::encode(&self.vendor_info))?;
        }
        state.end()
    }
}

impl Serialize for LegacySpecIdEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("LegacySpecIdEvent", 7)?;
        state.serialize_field("signature", "Spec ID Event00")?;
        state.serialize_field("platform_class", &self.platform_class)?;
        state.serialize_field("family_minor", &self.family_minor)?;
        state.serialize_field("family_major", &self.family_major)?;
        state.serialize_field("spec_errata", &self.spec_errata)?;
        state.serialize_field("uintn_size", &self.uintn_size)?;
        if !self.vendor_info.is_empty() {
            state.serialize_field("vendor_info", &hex::encode(&self.vendor_info))?;
        }
        state.end()
    }
}

impl Serialize for StartupLocalityEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("StartupLocalityEvent", 2)?;
        state.serialize_field("signature", "StartupLocality")?;
        state.serialize_field("locality", &self.locality)?;
        state.end()
    }
}

impl Serialize for EvNoActionEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EvNoActionEvent::SpecIdEvent(spec_id) => {
                let mut state = serializer.serialize_struct("SpecIdEvent", 1)?;
                state.serialize_field("spec_id", spec_id)?;
                state.end()
            },
            EvNoActionEvent::LegacySpecIdEvent(spec_id) => {
                let mut state = serializer.serialize_struct("LegacySpecIdEvent", 1)?;
                state.serialize_field("spec_id", spec_id)?;
                state.end()
            },
            EvNoActionEvent::StartupLocality(locality) => {
                let mut state = serializer.serialize_struct("StartupLocality", 1)?;
                state.serialize_field("startup_locality", locality)?;
                state.end()
            },
            EvNoActionEvent::Unknown(data) => {
                let mut state = serializer.serialize_struct("Unknown", 1)?;
                state.serialize_field("value", &hex::encode(data))?;
                state.end()
            }
        }
    }
}

impl Serialize for EventBaseString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serialize_string(serializer, "EventBaseString", &self.value)
    }
}

/// Separator value as a hexadecimal string
impl Serialize for EvSeparatorEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("EvSeparatorEvent", 1)?;
        state.serialize_field("value", &format!("{:08x}", self.value))?;
        state.end()
    }
}

impl Serialize for PCClientTaggedEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("PCClientTaggedEvent", 2)?;
        state.serialize_field("tagged_event_id", &format!("0x{:08x}", self.tagged_event_id))?;
        state.serialize_field("tagged_event_data", &hex::encode(&self.tagged_event_data))?;
        state.end()
    }
}

impl Serialize for SCrtmVersionEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serialize_string(serializer, "SCrtmVersionEvent", &self.version)
    }
}

impl Serialize for UefiPlatformFirmwareBlobEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        serialize_firmware_blob(serializer, self.blob_base, self.blob_length)
    }
}

impl Serialize for UefiPlatformFirmwareBlobEvent2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("FirmwareBlob", 3)?;
        state.serialize_field("description", &self.blob_description)?;
        state.serialize_field("blob_base", &format!("0x{:x}", self.blob_base))?;
        state.serialize_field("blob_length", &format!("0x{:x}", self.blob_length))?;
        state.end()
    }
}

impl Serialize for UefiFirmwareBlobEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        match self {
            UefiFirmwareBlobEvent::UefiPlatformFirmwareString(s) => {
                serialize_string(serializer, "UefiPlatformFirmwareString", s)
            },
            UefiFirmwareBlobEvent::UefiPlatformFirmwareBlob(blob) => blob.serialize(serializer),
            UefiFirmwareBlobEvent::UefiPlatformFirmwareBlob2(blob) => blob.serialize(serializer),
        }
    }
}

impl Serialize for UefiVariableDataEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("UefiVariableDataEvent", 3)?;
        state.serialize_field("variable_name", &self.variable_name)?;
        state.serialize_field("unicode_name", &self.unicode_name)?;
        state.serialize_field("variable_data", &hex::encode(&self.variable_data))?;
        state.end()
    }
}

impl Serialize for UefiImageLoadEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("UefiImageLoadEvent", 4)?;
        state.serialize_field("image_location_in_memory", &format!("0x{:x}", self.image_location_in_memory))?;
        state.serialize_field("image_length_in_memory", &self.image_length_in_memory)?;
        state.serialize_field("image_link_time_address", &format!("0x{:x}", self.image_link_time_address))?;
        state.serialize_field("device_path", &hex::encode(&self.device_path))?;
        state.end()
    }
}

/// Delegates to the serializer of the decoded structure
impl Serialize for EventContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EventContent::Raw(data) => {
                let mut state = serializer.serialize_struct("EventBase", 1)?;
                state.serialize_field("value", &hex::encode(data))?;
                state.end()
            },
            EventContent::BaseString(e) => e.serialize(serializer),
            EventContent::FirmwareBlob(e) => e.serialize(serializer),
            EventContent::NoAction(e) => e.serialize(serializer),
            EventContent::Separator(e) => e.serialize(serializer),
            EventContent::PCClientTagged(e) => e.serialize(serializer),
            EventContent::SCrtmVersion(e) => e.serialize(serializer),
            EventContent::PlatformFirmwareBlob(e) => e.serialize(serializer),
            EventContent::PlatformFirmwareBlob2(e) => e.serialize(serializer),
            EventContent::UefiVariable(e) => e.serialize(serializer),
            EventContent::UefiImageLoad(e) => e.serialize(serializer),
        }
    }
}

/// Digest list rendered as `{ "<algorithm>": "<hex>" }`
struct DigestMap<'a>(&'a [TpmDigestEntry]);

impl Serialize for DigestMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&AlgorithmId::name_of(entry.algorithm_id), &hex::encode(&entry.digest))?;
        }
        map.end()
    }
}

impl Serialize for EventRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer {
        let mut state = serializer.serialize_struct("EventRecord", 7)?;
        state.serialize_field("event_number", &self.sequence_number)?;
        state.serialize_field("offset", &self.offset)?;
        state.serialize_field("pcr_index", &self.pcr_index)?;
        state.serialize_field("event_type", &self.event_type)?;
        state.serialize_field("event_type_code", &format!("0x{:08x}", self.event_type_code))?;
        state.serialize_field("digests", &DigestMap(&self.digests))?;
        state.serialize_field("event", &self.content())?;
        state.end()
    }
}

/// Render an event list as a JSON array
pub fn events_to_json_value(events: &[EventRecord]) -> Result<Value, TcgError> {
    serde_json::to_value(events)
        .map_err(|e| TcgError::Decode(format!("Failed to serialize event list: {}", e)))
}
