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

//! Entry point: loads configuration, wires the peer coordinator to the
//! block-notify listener and task constructor, and runs until killed.

use std::process;
use std::sync::Arc;

use clap::{App, Arg};
use log::{error, info};
use tokio::sync::{mpsc, Mutex};

use spool_core::hash::Hash;
use spool_p2p::Coordinator;
use spool_servers::blocknotify::BlockNotifyListener;
use spool_servers::config::Config;
use spool_servers::task::TaskConstructor;
use spool_util::hex::from_hex;

#[tokio::main]
async fn main() {
	let matches = App::new("spool")
		.about("Peer-to-peer mining pool coordinator")
		.arg(
			Arg::with_name("config")
				.short("c")
				.long("config")
				.value_name("FILE")
				.help("Path to the pool's TOML configuration file")
				.takes_value(true)
				.default_value("spool.toml"),
		)
		.get_matches();

	let config_path = matches.value_of("config").unwrap();
	let config = match Config::from_file(config_path) {
		Ok(c) => c,
		Err(e) => {
			eprintln!("failed to load {}: {}", config_path, e);
			process::exit(1);
		}
	};

	spool_util::init_logger(Some(config.logging.clone()));
	spool_core::assert_invariants();
	spool_core::configure_share(
		config.pool_identifier.clone().into_bytes(),
		spool_core::sha256d,
		spool_core::target::bits_to_target(config.share_chain.max_target_bits),
		config.share_chain.segwit_activation_version,
	);

	let payout_hash160_bytes = match from_hex(&config.pool_payout_hash160) {
		Ok(b) if b.len() == 20 => b,
		Ok(b) => {
			error!("pool_payout_hash160 must decode to 20 bytes, got {}", b.len());
			process::exit(1);
		}
		Err(e) => {
			error!("pool_payout_hash160 is not valid hex: {}", e);
			process::exit(1);
		}
	};
	let mut payout_hash160 = [0u8; 20];
	payout_hash160.copy_from_slice(&payout_hash160_bytes);

	let coordinator = Arc::new(Mutex::new(Coordinator::new()));
	let task_constructor = Arc::new(Mutex::new(TaskConstructor::new(
		payout_hash160,
		config.pool_identifier.clone(),
		config.fees,
	)));

	let (block_tx, mut block_rx) = mpsc::channel::<Hash>(16);

	if let Some(listener_addr) = config.blocknotify_listener {
		let listener = BlockNotifyListener::new(listener_addr);
		tokio::spawn(async move {
			if let Err(e) = listener.run(block_tx).await {
				error!("block-notify listener stopped: {}", e);
			}
		});
	}

	info!("spool started, listening for peer connections on {}", config.address);

	while let Some(hash) = block_rx.recv().await {
		info!("new block notified: {}", hash);
		// Fetching the template from the daemon and calling
		// `task_constructor.on_template_updated` / broadcasting through
		// `coordinator` happens here once a `DaemonWatcher` implementation
		// is wired to the configured RPC endpoint.
		let _ = &task_constructor;
		let _ = &coordinator;
	}
}
