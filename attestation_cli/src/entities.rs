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

use anyhow::{Context, Result};
use common_log::LogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tpm_common_verifier::AlgorithmId;

/// Optional YAML configuration of the tool, every section may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub logging: Option<LogConfig>,
    pub hardware_id: HardwareIdConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HardwareIdConfig {
    /// Replaces the well-known database locations when set
    pub search_paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub algorithm: Option<String>,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Bank requested by the config file, if any
    pub fn replay_algorithm(&self) -> Result<Option<AlgorithmId>> {
        self.replay
            .algorithm
            .as_deref()
            .map(|name| name.parse::<AlgorithmId>().context("Invalid replay algorithm in config"))
            .transpose()
    }
}

/// Output of the `pcrs` command
#[derive(Debug, Serialize)]
pub struct PcrReport {
    pub format: String,
    pub algorithm: AlgorithmId,
    pub pcrs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_algorithms: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let yaml = r#"
logging:
  level: debug
  console: false
  file:
    path: logs/rim_tool.log
hardware_id:
  search_paths: ["/opt/hwdata/pci.ids"]
replay:
  algorithm: sha1
"#;
        let config: ToolConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging.as_ref().unwrap().level, "debug");
        assert_eq!(config.hardware_id.search_paths.as_ref().unwrap(), &vec![PathBuf::from("/opt/hwdata/pci.ids")]);
        assert_eq!(config.replay_algorithm().unwrap(), Some(AlgorithmId::Sha1));
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let config: ToolConfig = serde_yaml::from_str("replay: {}\n").unwrap();
        assert!(config.logging.is_none());
        assert!(config.hardware_id.search_paths.is_none());
        assert_eq!(config.replay_algorithm().unwrap(), None);
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let config: ToolConfig = serde_yaml::from_str("replay:\n  algorithm: md5\n").unwrap();
        assert!(config.replay_algorithm().is_err());
    }
}
