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

pub mod config;
pub mod logger;

use std::{path::Path, sync::OnceLock};

pub use crate::config::{FileLogConfig, LogConfig, LoggerConfig};
// Re-export log macros for convenient use in other modules
pub use log::{debug, error, info, trace, warn};

static LOGGER: OnceLock<logger::Logger> = OnceLock::new();

/// Initialize logging system from a YAML file
///
/// # Example
/// ```no_run
/// common_log::init_with_yaml("logging.yaml").expect("Failed to initialize logger");
/// log::info!("Logger initialized");
/// ```
pub fn init_with_yaml(config_path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = LogConfig::from_yaml(config_path)?;
    init_with_config(config)
}

/// Initialize logging system with config
///
/// # Example
/// ```no_run
/// use common_log::{init_with_config, FileLogConfig, LogConfig};
///
/// let config = LogConfig {
///     file: Some(FileLogConfig { path: "logs/rim_tool.log".into(), max_file_size: 10480, max_archives: 6 }),
///     ..LogConfig::default()
/// };
/// init_with_config(config).expect("Failed to initialize logger");
/// log::info!("Logger initialized");
/// ```
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    if LOGGER.get().is_some() {
        return Err("Logger already initialized".into());
    }
    let logger = logger::Logger::new_from_config(&config)?;
    if LOGGER.set(logger).is_err() {
        return Err("Logger already initialized".into());
    }
    Ok(())
}

/// Console only logging, used when no configuration file is given
pub fn init_console(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_with_config(LogConfig::console(level))
}
