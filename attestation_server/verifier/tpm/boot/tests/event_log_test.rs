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

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tpm_boot_verifier::{
    events_to_json_value, get_event_list, get_expected_pcr_values,
    EventContent, EventLogProcessor, EventLogReader, EventType, EvNoActionEvent, LogFormat, LogOutcome,
    SpecIdAlgorithm, SupportReferenceManifest,
};
use tpm_common_verifier::{AlgorithmId, TcgError};

mod utils;
use utils::{
    sample_agile_log, LogBuilder,
    EV_EFI_ACTION, EV_NO_ACTION, EV_SEPARATOR, SHA1, SHA256, UNSUPPORTED_ALG,
};

#[test]
fn test_detects_crypto_agile_log() {
    let log = sample_agile_log();
    let reader = EventLogReader::new(&log).unwrap();
    assert_eq!(
        reader.format(),
        &LogFormat::CryptoAgile { algorithms: vec![SpecIdAlgorithm::new(SHA1, 20), SpecIdAlgorithm::new(SHA256, 32)] }
    );

    let events = reader.read_all().unwrap();
    assert_eq!(events.len(), 6);
    assert_eq!(events[0].event_type, EventType::EvNoAction);
    assert!(matches!(events[0].content(), EventContent::NoAction(EvNoActionEvent::SpecIdEvent(_))));
    for (index, event) in events.iter().enumerate() {
        assert_eq!(event.sequence_number as usize, index);
    }
    assert_eq!(events[5].pcr_index, 7);
    assert_eq!(events[5].event_type, EventType::EvSeparator);
    assert_eq!(events[5].digests.len(), 2);
}

#[test]
fn test_detects_legacy_log() {
    let mut builder = LogBuilder::legacy();
    builder.event(0, EV_SEPARATOR, &[0, 0, 0, 0]).event(4, EV_EFI_ACTION, b"Exit Boot Services Invocation");
    let log = builder.build();

    let reader = EventLogReader::new(&log).unwrap();
    assert_eq!(reader.format(), &LogFormat::Legacy);
    let events = reader.read_all().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].offset, 32 + 4);
    assert!(events[1].digest(AlgorithmId::Sha1).is_some());
    assert!(events[1].digest(AlgorithmId::Sha256).is_none());
}

#[test]
fn test_empty_log_is_malformed_at_offset_zero() {
    let err = EventLogReader::new(&[]).unwrap_err();
    assert_eq!(err.offset(), Some(0));

    let outcome = get_expected_pcr_values(&[]);
    assert!(matches!(outcome, LogOutcome::Unreadable(TcgError::MalformedLog { offset: 0, .. })));
    assert!(outcome.or_empty().is_empty());
}

#[test]
fn test_truncated_record_reports_its_offset() {
    let mut builder = LogBuilder::crypto_agile(&[(SHA256, 32)]);
    builder.event(0, EV_SEPARATOR, &[0, 0, 0, 0]);
    let last_offset = builder.offset();
    builder.event(7, EV_SEPARATOR, &[0, 0, 0, 0]);
    let mut log = builder.build();
    log.truncate(log.len() - 3);

    let reader = EventLogReader::new(&log).unwrap();
    let results: Vec<_> = reader.events().collect();
    assert_eq!(results.len(), 3);
    assert!(results[1].is_ok());
    assert_eq!(results[2].as_ref().unwrap_err().offset(), Some(last_offset));

    let processor = EventLogProcessor::new(&log);
    assert!(matches!(processor.expected_pcr_values(), Err(TcgError::MalformedLog { offset, .. }) if offset == last_offset));

    let pcrs = processor.get_expected_pcr_values();
    assert!(!pcrs.is_parsed());
    assert!(pcrs.or_empty().is_empty());

    let events = get_event_list(&log);
    assert!(events.error().is_some());
    assert!(events.or_empty().is_empty());
}

#[test]
fn test_event_size_beyond_buffer_is_malformed() {
    let mut builder = LogBuilder::legacy();
    builder.event(0, EV_SEPARATOR, &[0, 0, 0, 0]);
    let mut log = builder.build();
    // event size field of the only record claims 0xff bytes
    log[28] = 0xff;
    let err = EventLogReader::new(&log).unwrap_err();
    assert!(matches!(err, TcgError::MalformedLog { offset: 0, ref reason } if reason.contains("exceeds remaining data")));
}

#[test]
fn test_undeclared_digest_algorithm_is_malformed() {
    let mut builder = LogBuilder::crypto_agile(&[(SHA256, 32)]);
    let offset = builder.offset();
    builder.event_with_digests(0, EV_SEPARATOR, &[(SHA1, vec![0u8; 20])], &[0, 0, 0, 0]);
    let log = builder.build();

    let err = EventLogReader::new(&log).unwrap().read_all().unwrap_err();
    assert_eq!(err.offset(), Some(offset));
}

#[test]
fn test_spec_id_with_wrong_digest_size_is_rejected() {
    let log = LogBuilder::crypto_agile(&[(SHA256, 20)]).build();
    let err = EventLogReader::new(&log).unwrap_err();
    assert!(matches!(err, TcgError::MalformedLog { offset: 0, .. }));
}

#[test]
fn test_event_list_keeps_no_action_events() {
    let mut builder = LogBuilder::crypto_agile(&[(SHA256, 32)]);
    builder.startup_locality(3).event(0, EV_SEPARATOR, &[0, 0, 0, 0]);
    let log = builder.build();

    let events = get_event_list(&log).parsed().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1].event_type_code, EV_NO_ACTION);
    assert_eq!(events[1].startup_locality(), Some(3));
}

#[test]
fn test_event_list_json_rendering() {
    let log = sample_agile_log();
    let events = get_event_list(&log).or_empty();
    let json = events_to_json_value(&events).unwrap();

    let separator = &json[5];
    assert_eq!(separator["event_type"], "EV_SEPARATOR");
    assert_eq!(separator["event_type_code"], "0x00000004");
    assert_eq!(separator["pcr_index"], 7);
    assert_eq!(separator["digests"]["sha256"], "df3f619804a92fdb4057192dc43dd748ea778adc52bc498ce80524c014b81119");
    assert_eq!(separator["event"]["value"], "00000000");

    let action = &json[3];
    assert_eq!(action["event"]["value"], "Calling EFI Application from Boot Option");
    assert_eq!(json[0]["event"]["spec_id"]["digest_algorithms"][1]["algorithm_id"], "sha256");
}

#[test]
fn test_unsupported_algorithm_is_named_in_json() {
    let mut builder = LogBuilder::crypto_agile(&[(SHA256, 32), (UNSUPPORTED_ALG, 16)]);
    builder.event(0, EV_SEPARATOR, &[0, 0, 0, 0]);
    let events = get_event_list(&builder.build()).or_empty();
    let json = events_to_json_value(&events).unwrap();
    assert_eq!(json[1]["digests"]["UNKNOWN_0x0040"], "abababababababababababababababab");
}

#[test]
fn test_decode_base64_transport() {
    let log = sample_agile_log();
    let mut encoded = BASE64.encode(&log);
    encoded.insert(10, '\n');
    assert_eq!(EventLogProcessor::decode_base64(&encoded).unwrap(), log);
    assert!(matches!(EventLogProcessor::decode_base64("not base64!"), Err(TcgError::Decode(_))));
}

#[test]
fn test_support_rim_caches_fingerprint() {
    let mut rim = SupportReferenceManifest::from_bytes(sample_agile_log());
    assert_eq!(rim.file_name(), "blank.rimel");
    assert!(rim.is_base_support());
    assert!(rim.pcr_hash().is_none());

    let pcrs = rim.expected_pcr_list().or_empty();
    assert_eq!(pcrs.len(), 24);
    assert!(rim.is_processed());
    assert!(!rim.is_updated());
    let fingerprint = rim.pcr_hash().unwrap().to_string();
    assert_eq!(fingerprint.len(), 64);

    rim.expected_pcr_list();
    assert_eq!(rim.pcr_hash(), Some(fingerprint.as_str()));
    assert!(!rim.is_updated());
    assert_eq!(rim.event_log().or_empty().len(), 6);
}

#[test]
fn test_support_rim_with_unreadable_log() {
    let mut rim = SupportReferenceManifest::new("broken.rimel", vec![1, 2, 3]).with_swid_supplemental(true);
    assert!(!rim.is_base_support());
    assert!(rim.expected_pcr_list().or_empty().is_empty());
    assert!(!rim.is_processed());
    assert!(rim.pcr_hash().is_none());
    assert!(!rim.event_log().is_parsed());
}
