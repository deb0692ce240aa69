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

//! Event Type Definitions
//!
//! Event type codes, the parsed event record, the detected log layout and the typed views of event data
//! used for display.

use std::fmt;
use tpm_common_verifier::AlgorithmId;

/// Length of the signature that prefixes every recognised EV_NO_ACTION payload
pub const NO_ACTION_EVENT_SIZE: usize = 16;

/// SHA1 digest length of a legacy record
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Header of a crypto-agile log
pub const SPEC_ID_EVENT_SIGNATURE_03: &[u8] = b"Spec ID Event03\0";

/// Header of a TCG 1.2 log, decoded for display only
pub const SPEC_ID_EVENT_SIGNATURE_00: &[u8] = b"Spec ID Event00\0";

pub const STARTUP_LOCALITY_SIGNATURE: &[u8] = b"StartupLocality\0";

/// Declares `EventType` from one table of variant, code and TCG name
macro_rules! event_types {
    ($($variant:ident = $code:literal => $name:literal,)+) => {
        /// TCG Event Type Enumeration
        ///
        /// Standard PC Client event types and UEFI-specific event types. Codes outside this table map to
        /// `Unknown`; the raw code stays available on the record.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u32)]
        pub enum EventType {
            $($variant = $code,)+
            Unknown = 0xFFFF_FFFF,
        }

        impl EventType {
            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Name used by the TCG PC Client profile, e.g. `EV_SEPARATOR`
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Unknown => "UNKNOWN",
                }
            }
        }
    };
}

event_types! {
    EvPrebootCert = 0x0000_0000 => "EV_PREBOOT_CERT",
    EvPostCode = 0x0000_0001 => "EV_POST_CODE",
    EvUnused = 0x0000_0002 => "EV_UNUSED",
    EvNoAction = 0x0000_0003 => "EV_NO_ACTION",
    EvSeparator = 0x0000_0004 => "EV_SEPARATOR",
    EvAction = 0x0000_0005 => "EV_ACTION",
    EvEventTag = 0x0000_0006 => "EV_EVENT_TAG",
    EvSCrtmContents = 0x0000_0007 => "EV_S_CRTM_CONTENTS",
    EvSCrtmVersion = 0x0000_0008 => "EV_S_CRTM_VERSION",
    EvCpuMicrocode = 0x0000_0009 => "EV_CPU_MICROCODE",
    EvPlatformConfigFlags = 0x0000_000A => "EV_PLATFORM_CONFIG_FLAGS",
    EvTableOfDevices = 0x0000_000B => "EV_TABLE_OF_DEVICES",
    EvCompactHash = 0x0000_000C => "EV_COMPACT_HASH",
    EvIpl = 0x0000_000D => "EV_IPL",
    EvIplPartitionData = 0x0000_000E => "EV_IPL_PARTITION_DATA",
    EvNonhostCode = 0x0000_000F => "EV_NONHOST_CODE",
    EvNonhostConfig = 0x0000_0010 => "EV_NONHOST_CONFIG",
    EvNonhostInfo = 0x0000_0011 => "EV_NONHOST_INFO",
    EvOmitBootDeviceEvents = 0x0000_0012 => "EV_OMIT_BOOT_DEVICE_EVENTS",
    EvPostCode2 = 0x0000_0013 => "EV_POST_CODE2",
    EvEfiEventBase = 0x8000_0000 => "EV_EFI_EVENT_BASE",
    EvEfiVariableDriverConfig = 0x8000_0001 => "EV_EFI_VARIABLE_DRIVER_CONFIG",
    EvEfiVariableBoot = 0x8000_0002 => "EV_EFI_VARIABLE_BOOT",
    EvEfiBootServicesApplication = 0x8000_0003 => "EV_EFI_BOOT_SERVICES_APPLICATION",
    EvEfiBootServicesDriver = 0x8000_0004 => "EV_EFI_BOOT_SERVICES_DRIVER",
    EvEfiRuntimeServicesDriver = 0x8000_0005 => "EV_EFI_RUNTIME_SERVICES_DRIVER",
    EvEfiGptEvent = 0x8000_0006 => "EV_EFI_GPT_EVENT",
    EvEfiAction = 0x8000_0007 => "EV_EFI_ACTION",
    EvEfiPlatformFirmwareBlob = 0x8000_0008 => "EV_EFI_PLATFORM_FIRMWARE_BLOB",
    EvEfiHandoffTables = 0x8000_0009 => "EV_EFI_HANDOFF_TABLES",
    EvEfiPlatformFirmwareBlob2 = 0x8000_000A => "EV_EFI_PLATFORM_FIRMWARE_BLOB2",
    EvEfiHandoffTables2 = 0x8000_000B => "EV_EFI_HANDOFF_TABLES2",
    EvEfiVariableBoot2 = 0x8000_000C => "EV_EFI_VARIABLE_BOOT2",
    EvEfiGptEvent2 = 0x8000_000D => "EV_EFI_GPT_EVENT2",
    EvEfiHcrtmEvent = 0x8000_0010 => "EV_EFI_HCRTM_EVENT",
    EvEfiVariableAuthority = 0x8000_00E0 => "EV_EFI_VARIABLE_AUTHORITY",
    EvEfiSpdmFirmwareBlob = 0x8000_00E1 => "EV_EFI_SPDM_FIRMWARE_BLOB",
    EvEfiSpdmFirmwareConfig = 0x8000_00E2 => "EV_EFI_SPDM_FIRMWARE_CONFIG",
    EvEfiSpdmDevicePolicy = 0x8000_00E3 => "EV_EFI_SPDM_DEVICE_POLICY",
    EvEfiSpdmDeviceAuthority = 0x8000_00E4 => "EV_EFI_SPDM_DEVICE_AUTHORITY",
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// TPM Digest Entry
///
/// Algorithm id as declared in the log (it may not be one this crate can hash) and the raw digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpmDigestEntry {
    pub algorithm_id: u16,
    pub digest: Vec<u8>,
}

impl TpmDigestEntry {
    pub fn new(algorithm_id: u16, digest: Vec<u8>) -> Self {
        Self { algorithm_id, digest }
    }

    /// The hashable algorithm, or `None` for ids outside `AlgorithmId`
    pub fn algorithm(&self) -> Option<AlgorithmId> {
        AlgorithmId::try_from(self.algorithm_id).ok()
    }
}

/// One algorithm row of the Spec ID Event03 table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecIdAlgorithm {
    pub algorithm_id: u16,
    pub digest_size: u16,
}

impl SpecIdAlgorithm {
    pub fn new(algorithm_id: u16, digest_size: u16) -> Self {
        Self { algorithm_id, digest_size }
    }
}

/// Record layout of a log, fixed by its first record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// TCG 1.2 layout: every record carries one SHA1 digest
    Legacy,
    /// TCG 2.0 layout: records after the header carry one digest per algorithm of the Spec ID table
    CryptoAgile { algorithms: Vec<SpecIdAlgorithm> },
}

impl LogFormat {
    /// Algorithm ids the log declares, in declaration order
    pub fn algorithm_ids(&self) -> Vec<u16> {
        match self {
            LogFormat::Legacy => vec![AlgorithmId::Sha1.id()],
            LogFormat::CryptoAgile { algorithms } => algorithms.iter().map(|a| a.algorithm_id).collect(),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Legacy => write!(f, "legacy"),
            LogFormat::CryptoAgile { .. } => write!(f, "crypto-agile"),
        }
    }
}

/// Event Log Entry
///
/// One record of the log in file order. `offset` is the byte position of the record start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub sequence_number: u32,
    pub offset: u64,
    pub pcr_index: u32,
    pub event_type: EventType,
    pub event_type_code: u32,
    pub digests: Vec<TpmDigestEntry>,
    pub event_data: Vec<u8>,
}

impl EventRecord {
    /// Digest recorded for `alg`, if the record carries one
    pub fn digest(&self, alg: AlgorithmId) -> Option<&[u8]> {
        self.digest_by_id(alg.id())
    }

    pub fn digest_by_id(&self, algorithm_id: u16) -> Option<&[u8]> {
        self.digests.iter()
            .find(|d| d.algorithm_id == algorithm_id)
            .map(|d| d.digest.as_slice())
    }

    pub fn is_no_action(&self) -> bool {
        self.event_type == EventType::EvNoAction
    }

    /// Locality carried by a `StartupLocality` no-action record
    pub fn startup_locality(&self) -> Option<u8> {
        if !self.is_no_action() || !self.event_data.starts_with(STARTUP_LOCALITY_SIGNATURE) {
            return None;
        }
        self.event_data.get(NO_ACTION_EVENT_SIZE).copied()
    }
}

/// Specification ID Event Data (TCG 2.0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EfiSpecIdEvent {
    pub platform_class: u32,
    pub family_minor: u8,
    pub family_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub digest_algorithms: Vec<SpecIdAlgorithm>,
    pub vendor_info: Vec<u8>,
}

/// Specification ID Event Data (TCG 1.2), decoded for display only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySpecIdEvent {
    pub platform_class: u32,
    pub family_minor: u8,
    pub family_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub vendor_info: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupLocalityEvent {
    pub locality: u8,
}

/// No Action Event Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvNoActionEvent {
    SpecIdEvent(EfiSpecIdEvent),
    LegacySpecIdEvent(LegacySpecIdEvent),
    StartupLocality(StartupLocalityEvent),
    Unknown(Vec<u8>),
}

/// UEFI Variable Event Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UefiVariableDataEvent {
    pub variable_name: String,                  // Variable GUID
    pub unicode_name: String,
    pub variable_data: Vec<u8>,
}

/// Platform Firmware Blob Event Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UefiPlatformFirmwareBlobEvent {
    pub blob_base: u64,                         // Efi physical address
    pub blob_length: u64,
}

/// Platform Firmware Blob Event2 Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UefiPlatformFirmwareBlobEvent2 {
    pub blob_description: String,
    pub blob_base: u64,
    pub blob_length: u64,
}

/// POST code payloads: a v1 blob, a v2 blob or a plain string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UefiFirmwareBlobEvent {
    UefiPlatformFirmwareString(String),
    UefiPlatformFirmwareBlob(UefiPlatformFirmwareBlobEvent),
    UefiPlatformFirmwareBlob2(UefiPlatformFirmwareBlobEvent2),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PCClientTaggedEvent {
    pub tagged_event_id: u32,
    pub tagged_event_data: Vec<u8>,
}

/// S-CRTM Version Event Data
/// Version of the S-CRTM as either a 16-byte GUID or a UCS-2 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SCrtmVersionEvent {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvSeparatorEvent {
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBaseString {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UefiImageLoadEvent {
    pub image_location_in_memory: u64,
    pub image_length_in_memory: u64,
    pub image_link_time_address: u64,
    pub device_path: Vec<u8>,
}

/// Typed view of an event's data, selected by event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventContent {
    Raw(Vec<u8>),
    BaseString(EventBaseString),
    FirmwareBlob(UefiFirmwareBlobEvent),
    NoAction(EvNoActionEvent),
    Separator(EvSeparatorEvent),
    PCClientTagged(PCClientTaggedEvent),
    SCrtmVersion(SCrtmVersionEvent),
    PlatformFirmwareBlob(UefiPlatformFirmwareBlobEvent),
    PlatformFirmwareBlob2(UefiPlatformFirmwareBlobEvent2),
    UefiVariable(UefiVariableDataEvent),
    UefiImageLoad(UefiImageLoadEvent),
}
