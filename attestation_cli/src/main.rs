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

mod commands;
mod entities;

use crate::commands::Commands;
use crate::entities::{PcrReport, ToolConfig};
use anyhow::{Context, Result};
use clap::Parser;
use hardware_id::{ComponentIdentifier, ComponentTranslator, PciIds};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tpm_boot_verifier::{events_to_json_value, EventLogProcessor};
use tpm_common_verifier::{AlgorithmId, TcgError};

#[derive(Parser, Debug)]
#[clap(name = "rim_tool", author, version, about = "TCG event log and platform component tool", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    let logging = config.logging.clone().unwrap_or_else(|| common_log::LogConfig::console("warn"));
    common_log::init_with_config(logging).map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
    execute(&cli.command, &config)
}

fn execute(command: &Commands, config: &ToolConfig) -> Result<()> {
    match command {
        Commands::Pcrs { log, algorithm, base64, out } => {
            let algorithm = match algorithm {
                Some(algorithm) => Some(*algorithm),
                None => config.replay_algorithm()?,
            };
            let log_bytes = read_log(log, *base64)?;
            let report = pcr_report(&log_bytes, algorithm)
                .with_context(|| format!("Unreadable event log {}", log.display()))?;
            write_output(&serde_json::to_value(&report)?, out.as_deref())
        },
        Commands::Events { log, base64, out } => {
            let log_bytes = read_log(log, *base64)?;
            let events = EventLogProcessor::new(&log_bytes)
                .get_event_list()
                .into_result()
                .with_context(|| format!("Unreadable event log {}", log.display()))?;
            info!("Read {} events from {}", events.len(), log.display());
            write_output(&events_to_json_value(&events)?, out.as_deref())
        },
        Commands::Translate { components, pci_ids, out } => {
            let content = fs::read_to_string(components)
                .with_context(|| format!("Failed to read components file {}", components.display()))?;
            let parsed: Vec<ComponentIdentifier> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid components file {}", components.display()))?;

            let search_paths = pci_ids.as_ref().map(|path| vec![path.clone()]).or_else(|| config.hardware_id.search_paths.clone());
            let owned;
            let database: &PciIds = match search_paths {
                Some(paths) => {
                    owned = PciIds::load_from_paths(&paths);
                    &owned
                },
                None => PciIds::global(),
            };
            let translated = ComponentTranslator::new(database).translate(&parsed);
            write_output(&serde_json::to_value(&translated)?, out.as_deref())
        },
    }
}

fn read_log(path: &Path, base64: bool) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read event log {}", path.display()))?;
    if !base64 {
        return Ok(bytes);
    }
    let text = String::from_utf8(bytes).context("Base64 event log is not valid text")?;
    Ok(EventLogProcessor::decode_base64(&text)?)
}

fn pcr_report(log: &[u8], algorithm: Option<AlgorithmId>) -> Result<PcrReport, TcgError> {
    let result = EventLogProcessor::new(log).get_replay().into_result()?;
    let bank = match algorithm {
        Some(algorithm) => result.bank(algorithm).ok_or(TcgError::InactiveAlgorithm(algorithm))?,
        None => result.primary_bank()?,
    };
    debug!("Reporting {} bank of {} log", bank.algorithm(), result.format());
    Ok(PcrReport {
        format: result.format().to_string(),
        algorithm: bank.algorithm(),
        pcrs: bank.to_hex_values(),
        skipped_algorithms: result.skipped_algorithms().iter().map(|id| AlgorithmId::name_of(*id)).collect(),
    })
}

fn write_output(value: &Value, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, text + "\n").with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        },
    }
}
