// Copyright 2018 The Grin Developers
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging wrapper to be used throughout all crates in the workspace.
//! Every module logs through the plain `log` facade (`info!`, `warn!`, ...);
//! this module only wires up where those records end up.

use crate::types::{LogLevel, LoggingConfig};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use std::sync::Mutex;

lazy_static! {
	/// Observe whether logging was explicitly initialised, so `init_logger`
	/// called twice (e.g. once by a test harness, once by main) doesn't panic.
	static ref WAS_INIT: Mutex<bool> = Mutex::new(false);
}

const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

fn convert_log_level(level: &LogLevel) -> LevelFilter {
	match *level {
		LogLevel::Error => LevelFilter::Error,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
	}
}

/// Initialize the global logger with the given configuration. Safe to call
/// more than once; only the first call takes effect.
pub fn init_logger(config: Option<LoggingConfig>) {
	let mut was_init = WAS_INIT.lock().unwrap();
	if *was_init {
		return;
	}

	let config = config.unwrap_or_default();
	let mut root_builder = Root::builder();
	let mut config_builder = Config::builder();

	if config.log_to_stdout {
		let stdout = ConsoleAppender::builder()
			.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
			.build();
		config_builder = config_builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
		root_builder = root_builder.appender("stdout");
	}

	if config.log_to_file {
		match FileAppender::builder()
			.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
			.build(&config.log_file_path)
		{
			Ok(file) => {
				config_builder =
					config_builder.appender(Appender::builder().build("file", Box::new(file)));
				root_builder = root_builder.appender("file");
			}
			Err(e) => {
				eprintln!("failed to open log file {}: {}", config.log_file_path, e);
			}
		}
	}

	let level = convert_log_level(&config.stdout_log_level).max(convert_log_level(&config.file_log_level));
	let log_config = config_builder
		.build(root_builder.build(level))
		.expect("invalid logging configuration");

	log4rs::init_config(log_config).expect("failed to initialize logger");
	*was_init = true;
}

/// A minimal logger for tests, initialized at most once per process.
pub fn init_test_logger() {
	init_logger(Some(LoggingConfig {
		log_to_stdout: true,
		stdout_log_level: LogLevel::Debug,
		log_to_file: false,
		..LoggingConfig::default()
	}));
}
