// Copyright 2016 The Grin Developers
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

//! Pool server configuration, loaded once from a TOML file at startup.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use spool_util::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("could not read config file {path}: {source}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("could not parse config file {path}: {source}")]
	Parse {
		path: String,
		#[source]
		source: toml::de::Error,
	},
}

/// How to reach the coin daemon's RPC interface for `getblocktemplate` and
/// `submitblock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
	pub rpc_address: SocketAddr,
	pub rpc_user: String,
	pub rpc_password: String,
	/// How often to poll `getblocktemplate` absent a `blocknotify` push.
	pub poll_interval_secs: u64,
}

/// Coordinates used to find or register with other pool peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZookeeperConfig {
	pub hosts: Vec<String>,
	pub znode_path: String,
}

/// Payout split between the pool operator and the peer-to-peer share chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeesConfig {
	/// Fraction (0.0-1.0) of the coinbase value kept by the pool operator.
	pub pool_fee_fraction: f64,
	/// Fraction (0.0-1.0) of the coinbase value donated, independent of
	/// `pool_fee_fraction`.
	pub donation_fraction: f64,
}

impl Default for FeesConfig {
	fn default() -> FeesConfig {
		FeesConfig {
			pool_fee_fraction: 0.01,
			donation_fraction: 0.0,
		}
	}
}

/// Parameters that pin down the underlying coin's proof-of-work rules,
/// passed to `spool_core::configure_share` once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareChainConfig {
	/// Compact "bits" encoding of the loosest target any share may declare.
	pub max_target_bits: u32,
	/// Share version at and after which the segwit substructure is read;
	/// shares below it never carry one.
	pub segwit_activation_version: u32,
}

impl Default for ShareChainConfig {
	fn default() -> ShareChainConfig {
		ShareChainConfig {
			max_target_bits: 0x1d00ffff,
			segwit_activation_version: 17,
		}
	}
}

/// Top-level pool server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub address: SocketAddr,
	pub daemon: DaemonConfig,
	pub zookeeper: Option<ZookeeperConfig>,
	#[serde(default)]
	pub fees: FeesConfig,
	/// Address the block-notify listener binds, if the daemon is configured
	/// to push `blocknotify` rather than being polled.
	pub blocknotify_listener: Option<SocketAddr>,
	/// Hex-encoded 20-byte hash160 of the pool operator's payout pubkey.
	pub pool_payout_hash160: String,
	/// Short tag embedded in every coinbase this pool produces, and used as
	/// the share-chain `IDENTIFIER`.
	pub pool_identifier: String,
	#[serde(default)]
	pub share_chain: ShareChainConfig,
	#[serde(default)]
	pub logging: LoggingConfig,
}

impl Config {
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
		let path_str = path.as_ref().display().to_string();
		let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
			path: path_str.clone(),
			source,
		})?;
		toml::from_str(&contents).map_err(|source| ConfigError::Parse {
			path: path_str,
			source,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_minimal_toml_document() {
		let toml_str = r#"
            address = "0.0.0.0:9332"
            blocknotify_listener = "127.0.0.1:9111"
            pool_payout_hash160 = "0000000000000000000000000000000000000000"
            pool_identifier = "spool"

            [daemon]
            rpc_address = "127.0.0.1:8332"
            rpc_user = "pool"
            rpc_password = "hunter2"
            poll_interval_secs = 5
        "#;
		let cfg: Config = toml::from_str(toml_str).unwrap();
		assert_eq!(cfg.daemon.poll_interval_secs, 5);
		assert_eq!(cfg.fees.pool_fee_fraction, 0.01);
	}
}
