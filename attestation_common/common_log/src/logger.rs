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

use crate::config::{FileLogConfig, LogConfig};
use chrono::{DateTime, Local};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger as SizeBasedTriggerPolicy;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::{
    append::rolling_file::RollingFileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S:%3f)} {l} [{M}:{L}] - {m}{n}";
const CONSOLE_APPENDER: &str = "console";
const FILE_APPENDER: &str = "file";

pub struct Logger {
    _handle: Handle,
}

impl Logger {
    pub fn new_from_config(config: &LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let handle = log4rs::init_config(Self::build_config(config)?)?;
        Ok(Self { _handle: handle })
    }

    /// Translates the YAML shape into a log4rs configuration without installing it
    pub fn build_config(config: &LogConfig) -> Result<Config, Box<dyn std::error::Error>> {
        let mut builder = Config::builder();
        let mut appenders = Vec::new();

        if config.console {
            // stdout carries command output
            let console = ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build();
            builder = builder.appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
            appenders.push(CONSOLE_APPENDER);
        }

        if let Some(file_config) = &config.file {
            let appender = Self::create_file_appender(file_config)?;
            builder = builder.appender(Appender::builder().build(FILE_APPENDER, Box::new(appender)));
            appenders.push(FILE_APPENDER);
        }

        for logger_config in &config.loggers {
            let logger = log4rs::config::Logger::builder()
                .build(logger_config.path_prefix.clone(), parse_level(&logger_config.level));
            builder = builder.logger(logger);
        }

        let root = Root::builder().appenders(appenders).build(parse_level(&config.level));
        Ok(builder.build(root)?)
    }

    fn create_file_appender(config: &FileLogConfig) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
        if let Some(directory) = config.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(directory)?;
        }

        let now: DateTime<Local> = Local::now();
        let formatted_time = now.format("%Y%m%d%H%M%S%3f").to_string();
        let archived_log_pattern = format!("{}-{{}}-{}.gz", config.path.display(), formatted_time);

        let size_trigger = SizeBasedTriggerPolicy::new(config.max_file_size);
        let roller = FixedWindowRoller::builder().build(&archived_log_pattern, config.max_archives)?;
        let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

        let appender = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(&config.path, Box::new(compound_policy))?;
        Ok(appender)
    }
}

/// Unknown names fall back to `Info`
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
