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

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_ARCHIVES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_console")]
    pub console: bool,
    #[serde(default)]
    pub file: Option<FileLogConfig>,
    /// Per-module level overrides, matched by module path prefix
    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
}

/// Size-rolled log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_max_archives")]
    pub max_archives: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub path_prefix: String,
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_console() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_archives() -> u32 {
    DEFAULT_MAX_ARCHIVES
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_level(), console: default_console(), file: None, loggers: Vec::new() }
    }
}

impl LogConfig {
    /// Console only logging at `level`
    pub fn console(level: &str) -> Self {
        Self { level: level.to_string(), ..Self::default() }
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: LogConfig = serde_yaml::from_str(config_str)?;
        Ok(config)
    }

    pub fn get_logger_config(&self, path_prefix: &str) -> Option<&LoggerConfig> {
        self.loggers.iter().find(|l| path_prefix.starts_with(&l.path_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = LogConfig::from_yaml_str("file:\n  path: logs/rim_tool.log\n").unwrap();
        assert_eq!(config.level, "info");
        assert!(config.console);
        let file = config.file.unwrap();
        assert_eq!(file.path, PathBuf::from("logs/rim_tool.log"));
        assert_eq!(file.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(file.max_archives, DEFAULT_MAX_ARCHIVES);
    }

    #[test]
    fn test_module_overrides() {
        let yaml = r#"
level: warn
console: false
loggers:
  - path_prefix: tpm_boot_verifier
    level: debug
"#;
        let config = LogConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.level, "warn");
        assert!(!config.console);
        assert!(config.file.is_none());
        assert_eq!(config.get_logger_config("tpm_boot_verifier::replay").unwrap().level, "debug");
        assert!(config.get_logger_config("hardware_id").is_none());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(LogConfig::from_yaml_str("level: [").is_err());
    }
}
