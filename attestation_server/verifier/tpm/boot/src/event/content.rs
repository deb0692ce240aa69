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

//! Event Content Decoding
//!
//! `ByteParseable` implementations for the event data structures of the PC Client profile, and the
//! dispatch from event type to structure. Decoding is for display only; replay never looks at it.

use log::debug;
use tpm_common_verifier::TcgError;
use crate::event::byte_reader::{ByteParseable, ByteReader, UEFI_GUID_SIZE};
use crate::event::model::{
    EfiSpecIdEvent, EvNoActionEvent, EvSeparatorEvent, EventBaseString, EventContent, EventRecord, EventType,
    LegacySpecIdEvent, PCClientTaggedEvent, SCrtmVersionEvent, SpecIdAlgorithm, StartupLocalityEvent,
    UefiFirmwareBlobEvent, UefiImageLoadEvent, UefiPlatformFirmwareBlobEvent, UefiPlatformFirmwareBlobEvent2,
    UefiVariableDataEvent,
    NO_ACTION_EVENT_SIZE, SPEC_ID_EVENT_SIGNATURE_00, SPEC_ID_EVENT_SIGNATURE_03, STARTUP_LOCALITY_SIGNATURE,
};

// blob base (u64) + blob length (u64)
const FIRMWARE_BLOB_SIZE: usize = 16;
// algorithm id (u16) + digest size (u16)
const SPEC_ID_ALGORITHM_ENTRY_SIZE: u64 = 4;

impl ByteParseable for EfiSpecIdEvent {
    /// Parses the body of "Spec ID Event03", after the signature
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let platform_class: u32 = parser.read_u32()?;
        let family_minor: u8 = parser.read_u8()?;
        let family_major: u8 = parser.read_u8()?;
        let spec_errata: u8 = parser.read_u8()?;
        let uintn_size: u8 = parser.read_u8()?;

        let algorithm_count: u32 = parser.read_u32()?;
        if algorithm_count as u64 * SPEC_ID_ALGORITHM_ENTRY_SIZE > parser.remaining() {
            return Err(TcgError::Decode(format!(
                "Invalid algorithm count {}, only {} bytes remain", algorithm_count, parser.remaining()
            )));
        }

        let mut digest_algorithms: Vec<SpecIdAlgorithm> = Vec::with_capacity(algorithm_count as usize);
        for _ in 0..algorithm_count {
            let algorithm_id: u16 = parser.read_u16()?;
            let digest_size: u16 = parser.read_u16()?;
            digest_algorithms.push(SpecIdAlgorithm::new(algorithm_id, digest_size));
        }

        let vendor_info_size: u8 = parser.read_u8()?;
        let vendor_info: Vec<u8> = parser.read_bytes(vendor_info_size as usize)?;

        Ok(EfiSpecIdEvent {
            platform_class,
            family_minor,
            family_major,
            spec_errata,
            uintn_size,
            digest_algorithms,
            vendor_info,
        })
    }
}

impl ByteParseable for LegacySpecIdEvent {
    /// Parses the body of "Spec ID Event00", after the signature
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let platform_class: u32 = parser.read_u32()?;
        let family_minor: u8 = parser.read_u8()?;
        let family_major: u8 = parser.read_u8()?;
        let spec_errata: u8 = parser.read_u8()?;
        let uintn_size: u8 = parser.read_u8()?;
        let vendor_info_size: u8 = parser.read_u8()?;
        let vendor_info: Vec<u8> = parser.read_bytes(vendor_info_size as usize)?;
        Ok(LegacySpecIdEvent {
            platform_class,
            family_minor,
            family_major,
            spec_errata,
            uintn_size,
            vendor_info,
        })
    }
}

impl ByteParseable for StartupLocalityEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let locality: u8 = parser.read_u8()?;
        Ok(StartupLocalityEvent { locality })
    }
}

impl ByteParseable for EvNoActionEvent {
    /// Parses into different no action event types based on signature
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        if parser.remaining() < NO_ACTION_EVENT_SIZE as u64 {
            let data = parser.read_bytes(parser.remaining() as usize)?;
            return Ok(EvNoActionEvent::Unknown(data));
        }

        let signature: Vec<u8> = parser.read_bytes(NO_ACTION_EVENT_SIZE)?;
        if signature == SPEC_ID_EVENT_SIGNATURE_03 {
            Ok(EvNoActionEvent::SpecIdEvent(EfiSpecIdEvent::parse_from(parser)?))
        } else if signature == SPEC_ID_EVENT_SIGNATURE_00 {
            Ok(EvNoActionEvent::LegacySpecIdEvent(LegacySpecIdEvent::parse_from(parser)?))
        } else if signature == STARTUP_LOCALITY_SIGNATURE {
            Ok(EvNoActionEvent::StartupLocality(StartupLocalityEvent::parse_from(parser)?))
        } else {
            let mut data = signature;
            data.extend(parser.read_bytes(parser.remaining() as usize)?);
            Ok(EvNoActionEvent::Unknown(data))
        }
    }
}

impl ByteParseable for EvSeparatorEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let value: u32 = parser.read_u32()?;
        Ok(EvSeparatorEvent { value })
    }
}

impl ByteParseable for EventBaseString {
    /// Parses all remaining bytes as a UTF-8 string
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let value: Vec<u8> = parser.read_bytes(parser.remaining() as usize)?;
        Ok(EventBaseString { value: String::from_utf8_lossy(&value).to_string() })
    }
}

impl ByteParseable for PCClientTaggedEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let tagged_event_id: u32 = parser.read_u32()?;
        let tagged_event_data_size: u32 = parser.read_u32()?;
        let tagged_event_data: Vec<u8> = parser.read_bytes(tagged_event_data_size as usize)?;
        Ok(PCClientTaggedEvent { tagged_event_id, tagged_event_data })
    }
}

impl ByteParseable for UefiPlatformFirmwareBlobEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let blob_base: u64 = parser.read_u64()?;
        let blob_length: u64 = parser.read_u64()?;
        Ok(UefiPlatformFirmwareBlobEvent { blob_base, blob_length })
    }
}

impl ByteParseable for UefiPlatformFirmwareBlobEvent2 {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let blob_description_size: u8 = parser.read_u8()?;
        let blob_description: Vec<u8> = parser.read_bytes(blob_description_size as usize)?;
        let blob_base: u64 = parser.read_u64()?;
        let blob_length: u64 = parser.read_u64()?;
        Ok(UefiPlatformFirmwareBlobEvent2 {
            blob_description: String::from_utf8_lossy(&blob_description).to_string(),
            blob_base,
            blob_length,
        })
    }
}

impl ByteParseable for UefiFirmwareBlobEvent {
    /// A v1 blob, a v2 blob or a string, told apart by payload length
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let remaining = parser.remaining() as usize;
        if remaining == FIRMWARE_BLOB_SIZE {
            return Ok(UefiFirmwareBlobEvent::UefiPlatformFirmwareBlob(
                UefiPlatformFirmwareBlobEvent::parse_from(parser)?
            ));
        }

        if remaining > FIRMWARE_BLOB_SIZE {
            let start_position = parser.position();
            let blob_description_size = parser.read_u8()? as usize;
            parser.set_position(start_position)?;

            if remaining == 1 + blob_description_size + FIRMWARE_BLOB_SIZE {
                return Ok(UefiFirmwareBlobEvent::UefiPlatformFirmwareBlob2(
                    UefiPlatformFirmwareBlobEvent2::parse_from(parser)?
                ));
            }
        }

        let data: Vec<u8> = parser.read_bytes(remaining)?;
        Ok(UefiFirmwareBlobEvent::UefiPlatformFirmwareString(String::from_utf8_lossy(&data).to_string()))
    }
}

impl ByteParseable for SCrtmVersionEvent {
    /// A 16-byte GUID or a UCS-2 string
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        if parser.remaining() as usize == UEFI_GUID_SIZE {
            Ok(SCrtmVersionEvent { version: parser.read_guid()? })
        } else {
            Ok(SCrtmVersionEvent { version: parser.read_ucs2_string()? })
        }
    }
}

impl ByteParseable for UefiVariableDataEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let variable_name: String = parser.read_guid()?;
        // name length in char16, data length in bytes
        let unicode_name_length: u64 = parser.read_u64()?;
        let variable_data_length: u64 = parser.read_u64()?;
        let unicode_name: String = parser.read_unicode_name(unicode_name_length as usize)?;
        let variable_data: Vec<u8> = parser.read_bytes(variable_data_length as usize)?;
        Ok(UefiVariableDataEvent {
            variable_name,
            unicode_name,
            variable_data,
        })
    }
}

impl ByteParseable for UefiImageLoadEvent {
    fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
        let image_location_in_memory: u64 = parser.read_u64()?;
        let image_length_in_memory: u64 = parser.read_u64()?;
        let image_link_time_address: u64 = parser.read_u64()?;
        let length_of_device_path: u64 = parser.read_u64()?;
        let device_path: Vec<u8> = parser.read_bytes(length_of_device_path as usize)?;
        Ok(UefiImageLoadEvent {
            image_location_in_memory,
            image_length_in_memory,
            image_link_time_address,
            device_path,
        })
    }
}

/// Parse `parser` as `T` and wrap it into an `EventContent` variant
fn parse_typed_event<T, F>(parser: &mut ByteReader, wrapper: F, event_name: &str) -> Result<EventContent, TcgError>
where
    T: ByteParseable,
    F: FnOnce(T) -> EventContent,
{
    T::parse_from(parser)
        .map(wrapper)
        .map_err(|e| TcgError::Decode(format!("Failed to parse {}: {}", event_name, e)))
}

/// Decode event data according to the event type
///
/// # Errors
/// * `TcgError::Decode` - If the data does not match the structure its event type calls for
pub fn decode_event_content(event_type: EventType, event_data: &[u8]) -> Result<EventContent, TcgError> {
    let mut parser = ByteReader::new(event_data);

    match event_type {
        EventType::EvPostCode | EventType::EvPostCode2 | EventType::EvSCrtmContents => {
            parse_typed_event::<UefiFirmwareBlobEvent, _>(&mut parser, EventContent::FirmwareBlob, "Firmware Blob Event")
        },
        EventType::EvEfiPlatformFirmwareBlob => {
            parse_typed_event::<UefiPlatformFirmwareBlobEvent, _>(
                &mut parser,
                EventContent::PlatformFirmwareBlob,
                "UEFI Platform Firmware Blob Event"
            )
        },
        EventType::EvEfiPlatformFirmwareBlob2 => {
            parse_typed_event::<UefiPlatformFirmwareBlobEvent2, _>(
                &mut parser,
                EventContent::PlatformFirmwareBlob2,
                "UEFI Platform Firmware Blob2 Event"
            )
        },
        EventType::EvNoAction => {
            parse_typed_event::<EvNoActionEvent, _>(&mut parser, EventContent::NoAction, "No Action Event")
        },
        EventType::EvSeparator => {
            parse_typed_event::<EvSeparatorEvent, _>(&mut parser, EventContent::Separator, "Separator Event")
        },
        EventType::EvAction | EventType::EvOmitBootDeviceEvents |
        EventType::EvEfiAction | EventType::EvIpl | EventType::EvEfiHcrtmEvent => {
            parse_typed_event::<EventBaseString, _>(&mut parser, EventContent::BaseString, "Base String Event")
        },
        EventType::EvEventTag => {
            parse_typed_event::<PCClientTaggedEvent, _>(&mut parser, EventContent::PCClientTagged, "PC Client Tagged Event")
        },
        EventType::EvSCrtmVersion => {
            parse_typed_event::<SCrtmVersionEvent, _>(&mut parser, EventContent::SCrtmVersion, "S-CRTM Version Event")
        },
        EventType::EvEfiVariableDriverConfig | EventType::EvEfiVariableBoot |
        EventType::EvEfiVariableBoot2 | EventType::EvEfiVariableAuthority => {
            parse_typed_event::<UefiVariableDataEvent, _>(&mut parser, EventContent::UefiVariable, "UEFI Variable Event")
        },
        EventType::EvEfiBootServicesApplication | EventType::EvEfiBootServicesDriver |
        EventType::EvEfiRuntimeServicesDriver => {
            parse_typed_event::<UefiImageLoadEvent, _>(&mut parser, EventContent::UefiImageLoad, "UEFI Image Load Event")
        },
        _ => Ok(EventContent::Raw(event_data.to_vec())),
    }
}

impl EventRecord {
    /// Typed view of the event data; data that does not decode is returned raw
    pub fn content(&self) -> EventContent {
        decode_event_content(self.event_type, &self.event_data).unwrap_or_else(|e| {
            debug!("Event {} ({}) shown as raw data: {}", self.sequence_number, self.event_type, e);
            EventContent::Raw(self.event_data.clone())
        })
    }
}
