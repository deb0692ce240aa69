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

//! Binary Event Log Reader
//!
//! Splits a raw TCG event log into `EventRecord`s. The first record is always read in the TCG 1.2 layout;
//! when it is an EV_NO_ACTION carrying "Spec ID Event03" the log is crypto-agile and every later record
//! is read with the digest table declared there. Otherwise every record is a TCG 1.2 SHA1 record.
//!
//! Reading is lazy: `EventLogReader::events` hands out a fresh iterator over the same buffer each time,
//! and the iterator stops after the first malformed record.

use std::iter::FusedIterator;
use log::debug;
use tpm_common_verifier::{AlgorithmId, TcgError};
use crate::event::byte_reader::{ByteParseable, ByteReader};
use crate::event::model::{
    EfiSpecIdEvent, EventRecord, EventType, LogFormat, SpecIdAlgorithm, TpmDigestEntry,
    NO_ACTION_EVENT_SIZE, SHA1_DIGEST_SIZE, SPEC_ID_EVENT_SIGNATURE_03,
};

/// TCG Digest Parsing Trait
///
/// TCG 1.2 and TCG 2.0 records differ only in the digest field; this trait hides that difference from
/// the record parser.
pub trait TcgDigestParse {
    /// Parses the digest field of one record
    ///
    /// # Errors
    /// * `TcgError::Decode` - If the digest field is truncated or inconsistent with the log header
    fn parse_digest(&self, reader: &mut ByteReader) -> Result<Vec<TpmDigestEntry>, TcgError>;
}

/// TCG 1.2 version digest parser
pub struct TcgDigestParseV1;

/// TCG 2.0 version digest parser, bound to the algorithm table of the log header
pub struct TcgDigestParseV2<'t> {
    algorithms: &'t [SpecIdAlgorithm],
}

impl<'t> TcgDigestParseV2<'t> {
    pub fn new(algorithms: &'t [SpecIdAlgorithm]) -> Self {
        Self { algorithms }
    }
}

/// TCG 1.2 digest contains only a single SHA1 digest
impl TcgDigestParse for TcgDigestParseV1 {
    fn parse_digest(&self, reader: &mut ByteReader) -> Result<Vec<TpmDigestEntry>, TcgError> {
        let digest: Vec<u8> = reader.read_bytes(SHA1_DIGEST_SIZE)?;
        Ok(vec![TpmDigestEntry::new(AlgorithmId::Sha1.id(), digest)])
    }
}

/// TCG 2.0 digest contains a count followed by (algorithm id, digest) pairs. Digest sizes come from the
/// header table, so algorithms this crate cannot hash are still stepped over.
impl TcgDigestParse for TcgDigestParseV2<'_> {
    fn parse_digest(&self, reader: &mut ByteReader) -> Result<Vec<TpmDigestEntry>, TcgError> {
        let digest_count: u32 = reader.read_u32()
            .map_err(|e| TcgError::Decode(format!("Failed to read digest count: {}", e)))?;

        if digest_count == 0 || digest_count as usize > self.algorithms.len() {
            return Err(TcgError::Decode(format!(
                "Invalid digest count {}, log declares {} algorithms", digest_count, self.algorithms.len()
            )));
        }

        let mut digests: Vec<TpmDigestEntry> = Vec::with_capacity(digest_count as usize);
        for _ in 0..digest_count {
            let algorithm_id: u16 = reader.read_u16()
                .map_err(|e| TcgError::Decode(format!("Failed to read algorithm ID: {}", e)))?;

            let digest_size = self.algorithms.iter()
                .find(|a| a.algorithm_id == algorithm_id)
                .map(|a| a.digest_size as usize)
                .ok_or_else(|| TcgError::Decode(format!(
                    "Digest algorithm 0x{:04x} is not declared in the Spec ID event", algorithm_id
                )))?;

            let digest: Vec<u8> = reader.read_bytes(digest_size)
                .map_err(|e| TcgError::Decode(format!("Failed to read digest data: {}", e)))?;

            digests.push(TpmDigestEntry::new(algorithm_id, digest));
        }

        Ok(digests)
    }
}

/// Parse a single record: PCR index, event type, digest field, event size, event data.
///
/// Every failure is reported as `MalformedLog` at the record start.
fn parse_event_record(
    reader: &mut ByteReader,
    digest_parser: &dyn TcgDigestParse,
    sequence_number: u32,
) -> Result<EventRecord, TcgError> {
    let offset = reader.position();
    let malformed = |what: &str, e: TcgError| {
        TcgError::malformed(offset, format!("{}: {}, event_number: {}", what, e, sequence_number))
    };

    let pcr_index: u32 = reader.read_u32()
        .map_err(|e| malformed("Failed to read PCR index", e))?;

    let event_type_code: u32 = reader.read_u32()
        .map_err(|e| malformed("Failed to read event type", e))?;
    // Unrecognised codes still parse; the raw code is kept on the record
    let event_type: EventType = EventType::from_u32(event_type_code).unwrap_or(EventType::Unknown);

    let digests = digest_parser.parse_digest(reader)
        .map_err(|e| malformed("Failed to parse digest", e))?;

    let event_size: u32 = reader.read_u32()
        .map_err(|e| malformed("Failed to read event size", e))?;
    if event_size as u64 > reader.remaining() {
        return Err(TcgError::malformed(offset, format!(
            "Event size {} exceeds remaining data {}, event_number: {}, event_type: {}",
            event_size, reader.remaining(), sequence_number, event_type
        )));
    }

    let event_data: Vec<u8> = reader.read_bytes(event_size as usize)
        .map_err(|e| malformed("Failed to read event data", e))?;

    Ok(EventRecord {
        sequence_number,
        offset,
        pcr_index,
        event_type,
        event_type_code,
        digests,
        event_data,
    })
}

/// Reader over one event log buffer
///
/// # Examples
/// ```rust ignore
/// let reader = EventLogReader::new(&log_bytes)?;
/// for record in reader.events() {
///     let record = record?;
///     println!("{} {}", record.pcr_index, record.event_type);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EventLogReader<'a> {
    data: &'a [u8],
    format: LogFormat,
}

impl<'a> EventLogReader<'a> {
    /// Detect the layout of `data` from its first record
    ///
    /// # Errors
    /// * `TcgError::MalformedLog` - If the buffer is empty, the first record is truncated, or the Spec ID
    ///   header is inconsistent
    pub fn new(data: &'a [u8]) -> Result<Self, TcgError> {
        if data.is_empty() {
            return Err(TcgError::malformed(0, "Event log is empty"));
        }

        let mut reader = ByteReader::new(data);
        let header = parse_event_record(&mut reader, &TcgDigestParseV1, 0)?;
        let format = Self::detect_format(&header)?;
        debug!("Detected {} event log, algorithms: {:?}", format, format.algorithm_ids());

        Ok(Self { data, format })
    }

    fn detect_format(header: &EventRecord) -> Result<LogFormat, TcgError> {
        if !header.is_no_action() || !header.event_data.starts_with(SPEC_ID_EVENT_SIGNATURE_03) {
            return Ok(LogFormat::Legacy);
        }

        let mut parser = ByteReader::new(&header.event_data[NO_ACTION_EVENT_SIZE..]);
        let spec_id = EfiSpecIdEvent::parse_from(&mut parser)
            .map_err(|e| TcgError::malformed(header.offset, format!("Invalid Spec ID Event03: {}", e)))?;

        if spec_id.digest_algorithms.is_empty() {
            return Err(TcgError::malformed(header.offset, "Spec ID Event03 declares no digest algorithms"));
        }
        for entry in &spec_id.digest_algorithms {
            if entry.digest_size == 0 {
                return Err(TcgError::malformed(header.offset, format!(
                    "Spec ID Event03 declares zero digest size for algorithm 0x{:04x}", entry.algorithm_id
                )));
            }
            if let Ok(alg) = AlgorithmId::try_from(entry.algorithm_id) {
                if alg.digest_size() != entry.digest_size as usize {
                    return Err(TcgError::malformed(header.offset, format!(
                        "Spec ID Event03 declares {} bytes for {}, expected {}",
                        entry.digest_size, alg, alg.digest_size()
                    )));
                }
            }
        }

        Ok(LogFormat::CryptoAgile { algorithms: spec_id.digest_algorithms })
    }

    pub fn format(&self) -> &LogFormat {
        &self.format
    }

    /// A new iterator over every record, starting from the first byte of the log
    pub fn events(&self) -> EventIter<'_> {
        EventIter {
            reader: ByteReader::new(self.data),
            format: &self.format,
            sequence_number: 0,
            done: false,
        }
    }

    /// Read every record, failing on the first malformed one
    pub fn read_all(&self) -> Result<Vec<EventRecord>, TcgError> {
        self.events().collect()
    }
}

/// Iterator over the records of one log. Yields at most one error, after which it is exhausted.
pub struct EventIter<'r> {
    reader: ByteReader<'r>,
    format: &'r LogFormat,
    sequence_number: u32,
    done: bool,
}

impl Iterator for EventIter<'_> {
    type Item = Result<EventRecord, TcgError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.is_end() {
            self.done = true;
            return None;
        }

        let result = match self.format {
            LogFormat::CryptoAgile { algorithms } if self.sequence_number > 0 => {
                parse_event_record(&mut self.reader, &TcgDigestParseV2::new(algorithms), self.sequence_number)
            },
            _ => parse_event_record(&mut self.reader, &TcgDigestParseV1, self.sequence_number),
        };

        match result {
            Ok(record) => {
                self.sequence_number += 1;
                Some(Ok(record))
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for EventIter<'_> {}
