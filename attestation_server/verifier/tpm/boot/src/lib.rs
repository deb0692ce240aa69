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

mod event;
mod processor;
mod replay;
mod rim;

pub use event::byte_reader::{ByteParseable, ByteReader, UEFI_GUID_SIZE};
pub use event::content::decode_event_content;
pub use event::model::{
    EventType, EventRecord, EventContent, LogFormat, SpecIdAlgorithm, TpmDigestEntry,
    EfiSpecIdEvent, LegacySpecIdEvent, StartupLocalityEvent, EvNoActionEvent,
    EvSeparatorEvent, EventBaseString, PCClientTaggedEvent, SCrtmVersionEvent,
    UefiFirmwareBlobEvent, UefiPlatformFirmwareBlobEvent, UefiPlatformFirmwareBlobEvent2,
    UefiVariableDataEvent, UefiImageLoadEvent,
    NO_ACTION_EVENT_SIZE, SHA1_DIGEST_SIZE,
    SPEC_ID_EVENT_SIGNATURE_03, SPEC_ID_EVENT_SIGNATURE_00, STARTUP_LOCALITY_SIGNATURE,
};
pub use event::parser::{EventIter, EventLogReader, TcgDigestParse, TcgDigestParseV1, TcgDigestParseV2};
pub use event::serialize::events_to_json_value;
pub use processor::{get_event_list, get_expected_pcr_values, EventLogProcessor, LogOutcome};
pub use replay::{replay_events, replay_log, PcrReplayEngine, ReplayResult};
pub use rim::{SupportReferenceManifest, DEFAULT_RIM_FILE_NAME};
