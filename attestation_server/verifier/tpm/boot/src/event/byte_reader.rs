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

//! Byte Reader Module
//!
//! Little-endian cursor over an event log buffer. Every read is bounds checked; a short read returns
//! `TcgError::Decode` naming the offset, and record level callers turn that into `TcgError::MalformedLog`.
//!
//! - `ByteReader`: reads integers, byte runs, GUIDs and UCS-2 names
//! - `ByteParseable`: types decoded directly from a `ByteReader`

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use tpm_common_verifier::TcgError;
use uuid::Uuid;

/// UEFI GUID size
pub const UEFI_GUID_SIZE: usize = 16;

pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

/// Trait for types that can be parsed from a byte stream
///
/// # Example
///
/// ```rust ignore
/// use tpm_boot_verifier::{ByteReader, ByteParseable};
/// use tpm_common_verifier::TcgError;
///
/// struct Marker {
///     tag: u32,
///     payload: Vec<u8>,
/// }
///
/// impl ByteParseable for Marker {
///     fn parse_from(parser: &mut ByteReader) -> Result<Self, TcgError> {
///         let tag = parser.read_u32()?;
///         let payload = parser.read_bytes(parser.remaining() as usize)?;
///         Ok(Self { tag, payload })
///     }
/// }
/// ```
pub trait ByteParseable: Sized {
    /// Parse an instance of the current type from a byte reader
    ///
    /// # Errors
    ///
    /// Returns `TcgError::Decode` when the byte stream is too short or incorrectly formatted
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, TcgError>;
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current reading position (byte offset)
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Move the cursor to `pos`
    ///
    /// # Errors
    /// * Returns an error when the position exceeds the data range
    pub fn set_position(&mut self, pos: u64) -> Result<(), TcgError> {
        if pos > self.get_length() {
            return Err(TcgError::Decode(format!(
                "Position {} exceeds data range {}", pos, self.get_length()
            )));
        }
        self.cursor.set_position(pos);
        Ok(())
    }

    /// Number of unread bytes remaining
    pub fn remaining(&self) -> u64 {
        self.get_length().saturating_sub(self.cursor.position())
    }

    pub fn read_u8(&mut self) -> Result<u8, TcgError> {
        let pos = self.position();
        self.cursor.read_u8()
            .map_err(|e| TcgError::Decode(format!("Failed to read u8 at offset {}: {}", pos, e)))
    }

    /// Read a u16 value (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, TcgError> {
        let pos = self.position();
        self.cursor.read_u16::<LittleEndian>()
            .map_err(|e| TcgError::Decode(format!("Failed to read u16 at offset {}: {}", pos, e)))
    }

    /// Read a u32 value (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, TcgError> {
        let pos = self.position();
        self.cursor.read_u32::<LittleEndian>()
            .map_err(|e| TcgError::Decode(format!("Failed to read u32 at offset {}: {}", pos, e)))
    }

    /// Read a u64 value (little-endian)
    pub fn read_u64(&mut self) -> Result<u64, TcgError> {
        let pos = self.position();
        self.cursor.read_u64::<LittleEndian>()
            .map_err(|e| TcgError::Decode(format!("Failed to read u64 at offset {}: {}", pos, e)))
    }

    /// Read `length` bytes
    ///
    /// # Errors
    /// * Returns an error when the requested number of bytes exceeds the remaining bytes
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, TcgError> {
        if length as u64 > self.remaining() {
            return Err(TcgError::Decode(format!(
                "Read exceeds data range at offset {}: requested {} bytes but only {} bytes remain",
                self.position(), length, self.remaining()
            )));
        }

        let mut buffer: Vec<u8> = vec![0u8; length];
        self.cursor.read_exact(&mut buffer)
            .map_err(|e| TcgError::Decode(format!("Failed to read bytes: {}", e)))?;
        Ok(buffer)
    }

    /// Read a 16 byte mixed-endian UEFI GUID and format it as a standard GUID string
    pub fn read_guid(&mut self) -> Result<String, TcgError> {
        let bytes = self.read_bytes(UEFI_GUID_SIZE)?;
        let mut guid_bytes: [u8; UEFI_GUID_SIZE] = [0; UEFI_GUID_SIZE];
        guid_bytes.copy_from_slice(&bytes);

        let guid: Uuid = Uuid::from_bytes_le(guid_bytes);
        Ok(guid.to_string())
    }

    /// Read all `length` UTF-16LE code units; the name ends at the first null character
    pub fn read_unicode_name(&mut self, length: usize) -> Result<String, TcgError> {
        let byte_length = length.checked_mul(2)
            .ok_or_else(|| TcgError::Decode(format!("Unicode name length {} is too large", length)))?;
        let bytes: Vec<u8> = self.read_bytes(byte_length)?;
        let unicode_name: String = bytes.chunks_exact(2)
            .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
            .take_while(|&char_code| char_code != 0)
            .map(|char_code| std::char::from_u32(char_code as u32).unwrap_or('?'))
            .collect();
        Ok(unicode_name)
    }

    /// Read a UCS-2 (UTF-16LE) string up to the end of data or a null character
    pub fn read_ucs2_string(&mut self) -> Result<String, TcgError> {
        let mut unicode_str = String::new();

        while self.remaining() >= 2 {
            let code_unit = self.read_u16()?;
            if code_unit == 0 {
                break;
            }
            match std::char::from_u32(code_unit as u32) {
                Some(c) => unicode_str.push(c),
                None => unicode_str.push('\u{FFFD}'),
            }
        }

        Ok(unicode_str)
    }

    pub fn is_end(&self) -> bool {
        self.cursor.position() >= self.get_length()
    }

    /// Total data length
    pub fn get_length(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
        assert_eq!(reader.read_u32().unwrap(), 0x07060504);
        assert!(reader.is_end());
    }

    #[test]
    fn test_short_read_reports_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = ByteReader::new(&data);
        reader.read_u8().unwrap();
        let err = reader.read_bytes(4).unwrap_err();
        assert!(matches!(err, TcgError::Decode(ref msg) if msg.contains("offset 1")));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_guid_is_mixed_endian() {
        let data = [
            0x61, 0xdf, 0xe4, 0x8b, 0xca, 0x93, 0xd2, 0x11,
            0xaa, 0x0d, 0x00, 0xe0, 0x98, 0x03, 0x2b, 0x8c,
        ];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_guid().unwrap(), "8be4df61-93ca-11d2-aa0d-00e098032b8c");
    }

    #[test]
    fn test_ucs2_stops_at_null() {
        let data = [b'B', 0, b'o', 0, b'o', 0, b't', 0, 0, 0, b'x', 0];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_ucs2_string().unwrap(), "Boot");
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_unicode_name_consumes_declared_length() {
        let data = [b'P', 0, b'K', 0, 0, 0, 0xAA, 0xBB, 0x7F];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_unicode_name(4).unwrap(), "PK");
        assert_eq!(reader.read_bytes(1).unwrap(), vec![0x7F]);
        assert!(reader.is_end());

        let mut reader = ByteReader::new(&data);
        assert!(reader.read_unicode_name(5).is_err());
        assert!(reader.read_unicode_name(usize::MAX).is_err());
    }
}
