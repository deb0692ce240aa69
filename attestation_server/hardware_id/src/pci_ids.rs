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

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use mockall::automock;
use once_cell::sync::OnceCell;

use crate::error::HardwareIdError;

/// Well-known locations of the PCI ids database, searched in order
pub const PCI_IDS_PATHS: [&str; 3] = ["/usr/share/hwdata/pci.ids", "/usr/share/misc/pci.ids", "/tmp/pci.ids"];

const HEX_ID_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub vendor_id: String,
    pub id: String,
    pub name: String,
}

/// Read-only vendor and device name lookups keyed by 4 hex digit ids
#[automock]
pub trait HardwareIdLookup {
    fn find_vendor(&self, vendor_id: &str) -> Option<String>;

    fn find_device(&self, vendor_id: &str, device_id: &str) -> Option<String>;
}

#[derive(Debug, Default)]
struct PciIdsTables {
    source: Option<PathBuf>,
    vendors: HashMap<String, VendorRecord>,
    devices: HashMap<(String, String), DeviceRecord>,
    skipped_lines: usize,
}

#[derive(Debug)]
enum DatabaseState {
    Ready(PciIdsTables),
    Unavailable(HardwareIdError),
}

/// In-memory PCI vendor/device database.
///
/// An instance is either ready, holding the parsed tables, or unavailable. An unavailable
/// database answers every lookup with `None`, so callers keep their original values.
#[derive(Debug)]
pub struct PciIds {
    state: DatabaseState,
}

impl PciIds {
    /// Process-wide database loaded from [`PCI_IDS_PATHS`] on first use.
    ///
    /// Concurrent first callers trigger a single load; the outcome, ready or unavailable,
    /// is kept for the rest of the process lifetime and never retried.
    pub fn global() -> &'static PciIds {
        static INSTANCE: OnceCell<PciIds> = OnceCell::new();
        INSTANCE.get_or_init(|| PciIds::load_from_paths(&PCI_IDS_PATHS))
    }

    /// Loads the first existing file among `paths`
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> PciIds {
        let Some(path) = paths.iter().map(AsRef::<Path>::as_ref).find(|path| path.exists()) else {
            let searched: Vec<PathBuf> = paths.iter().map(|path| AsRef::<Path>::as_ref(path).to_path_buf()).collect();
            warn!("PCI ids database unavailable, hardware ids will not be translated. Searched: {:?}", searched);
            return PciIds::unavailable(HardwareIdError::DatabaseUnavailable { searched });
        };

        match PciIds::load(path) {
            Ok(database) => {
                info!(
                    "Loaded PCI ids database {:?}: {} vendors, {} devices",
                    path,
                    database.vendor_count(),
                    database.device_count()
                );
                database
            },
            Err(e) => {
                warn!("PCI ids database unavailable: {}", e);
                PciIds::unavailable(e)
            },
        }
    }

    pub fn load(path: &Path) -> Result<PciIds, HardwareIdError> {
        let io_error = |source| HardwareIdError::Io { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(io_error)?;
        let mut tables = parse_tables(BufReader::new(file)).map_err(io_error)?;
        tables.source = Some(path.to_path_buf());
        Ok(PciIds { state: DatabaseState::Ready(tables) })
    }

    /// Parses database text from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<PciIds> {
        Ok(PciIds { state: DatabaseState::Ready(parse_tables(reader)?) })
    }

    pub fn unavailable(reason: HardwareIdError) -> PciIds {
        PciIds { state: DatabaseState::Unavailable(reason) }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DatabaseState::Ready(_))
    }

    /// Why the database could not be loaded, `None` when ready
    pub fn unavailable_reason(&self) -> Option<&HardwareIdError> {
        match &self.state {
            DatabaseState::Unavailable(reason) => Some(reason),
            DatabaseState::Ready(_) => None,
        }
    }

    /// File the tables were read from, if loaded from disk
    pub fn source(&self) -> Option<&Path> {
        self.tables().and_then(|tables| tables.source.as_deref())
    }

    pub fn vendor_count(&self) -> usize {
        self.tables().map_or(0, |tables| tables.vendors.len())
    }

    pub fn device_count(&self) -> usize {
        self.tables().map_or(0, |tables| tables.devices.len())
    }

    /// Number of lines that matched no rule of the grammar
    pub fn skipped_lines(&self) -> usize {
        self.tables().map_or(0, |tables| tables.skipped_lines)
    }

    pub fn vendor(&self, vendor_id: &str) -> Option<&VendorRecord> {
        let tables = self.tables()?;
        tables.vendors.get(&normalize_id(vendor_id)?)
    }

    pub fn device(&self, vendor_id: &str, device_id: &str) -> Option<&DeviceRecord> {
        let tables = self.tables()?;
        let key = (normalize_id(vendor_id)?, normalize_id(device_id)?);
        tables.devices.get(&key)
    }

    fn tables(&self) -> Option<&PciIdsTables> {
        match &self.state {
            DatabaseState::Ready(tables) => Some(tables),
            DatabaseState::Unavailable(_) => None,
        }
    }
}

impl HardwareIdLookup for PciIds {
    fn find_vendor(&self, vendor_id: &str) -> Option<String> {
        self.vendor(vendor_id).map(|vendor| vendor.name.clone())
    }

    fn find_device(&self, vendor_id: &str, device_id: &str) -> Option<String> {
        self.device(vendor_id, device_id).map(|device| device.name.clone())
    }
}

/// Trimmed, lower-cased id, or `None` unless it is exactly 4 hex digits
pub(crate) fn normalize_id(id: &str) -> Option<String> {
    let id = id.trim();
    if id.len() == HEX_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(id.to_ascii_lowercase())
    } else {
        None
    }
}

/// Splits `"xxxx  name"` into its id and name
fn parse_entry(text: &str) -> Option<(String, String)> {
    let (id, name) = text.split_once(char::is_whitespace)?;
    let id = normalize_id(id)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((id, name.to_string()))
}

fn parse_tables<R: BufRead>(mut reader: R) -> std::io::Result<PciIdsTables> {
    let mut tables = PciIdsTables::default();
    let mut current_vendor: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        // device classes follow the vendor list
        if line.starts_with("C ") {
            break;
        }
        if line.starts_with("\t\t") {
            continue;
        }

        if let Some(device_line) = line.strip_prefix('\t') {
            match (current_vendor.as_ref(), parse_entry(device_line)) {
                (Some(vendor_id), Some((id, name))) => {
                    tables.devices.insert(
                        (vendor_id.clone(), id.clone()),
                        DeviceRecord { vendor_id: vendor_id.clone(), id, name },
                    );
                },
                _ => {
                    debug!("Skipping PCI ids device line: {:?}", line);
                    tables.skipped_lines += 1;
                },
            }
            continue;
        }

        match parse_entry(line) {
            Some((id, name)) => {
                current_vendor = Some(id.clone());
                tables.vendors.insert(id.clone(), VendorRecord { id, name });
            },
            None => {
                debug!("Skipping PCI ids line: {:?}", line);
                current_vendor = None;
                tables.skipped_lines += 1;
            },
        }
    }
    Ok(tables)
}
