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

//! A small TCP listener the coin daemon's `blocknotify` hook connects to:
//! one line, the new best block hash, one connection per notification. A
//! daemon configured with `blocknotify=curl http://127.0.0.1:PORT/%s` (or a
//! netcat equivalent) drives this directly.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use spool_core::hash::Hash;
use spool_util::hex::from_hex;

/// Listens for `blocknotify` connections and forwards newly-seen block
/// hashes on `sender`, deduplicating against the last hash seen so a
/// daemon that notifies twice for the same tip doesn't trigger two
/// redundant template fetches.
pub struct BlockNotifyListener {
	addr: SocketAddr,
	last_notified: Arc<Mutex<Option<Hash>>>,
}

impl BlockNotifyListener {
	pub fn new(addr: SocketAddr) -> BlockNotifyListener {
		BlockNotifyListener {
			addr,
			last_notified: Arc::new(Mutex::new(None)),
		}
	}

	/// Runs the accept loop until the socket errors out. Each connection is
	/// handled independently and never blocks another.
	pub async fn run(self, sender: mpsc::Sender<Hash>) -> std::io::Result<()> {
		let listener = TcpListener::bind(self.addr).await?;
		debug!("block-notify listener bound on {}", self.addr);
		loop {
			let (socket, peer_addr) = listener.accept().await?;
			let sender = sender.clone();
			let last_notified = self.last_notified.clone();
			tokio::spawn(async move {
				if let Err(e) = handle_connection(socket, peer_addr, last_notified, sender).await {
					warn!("block-notify connection from {} failed: {}", peer_addr, e);
				}
			});
		}
	}
}

async fn handle_connection(
	socket: tokio::net::TcpStream,
	peer_addr: SocketAddr,
	last_notified: Arc<Mutex<Option<Hash>>>,
	sender: mpsc::Sender<Hash>,
) -> std::io::Result<()> {
	let mut reader = BufReader::new(socket);
	let mut line = String::new();
	reader.read_line(&mut line).await?;
	let trimmed = line.trim();
	if trimmed.is_empty() {
		return Ok(());
	}

	let bytes = match from_hex(trimmed) {
		Ok(b) if b.len() == 32 => b,
		_ => {
			warn!("block-notify from {} sent a malformed hash: {:?}", peer_addr, trimmed);
			return Ok(());
		}
	};
	let hash = Hash::from_slice(&bytes);

	let mut guard = last_notified.lock().await;
	if *guard == Some(hash) {
		debug!("block-notify from {} repeats the last notified hash, dropping", peer_addr);
		return Ok(());
	}
	*guard = Some(hash);
	drop(guard);

	if sender.send(hash).await.is_err() {
		warn!("block-notify receiver dropped, discarding notification from {}", peer_addr);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::io::AsyncWriteExt;
	use tokio::net::TcpStream;

	#[tokio::test]
	async fn notifies_on_new_hash_and_dedups_repeats() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let server = BlockNotifyListener::new(addr);
		let (tx, mut rx) = mpsc::channel(4);
		tokio::spawn(server.run(tx));

		// give the accept loop a moment to bind
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;

		let hash_hex = "11".repeat(32);
		for _ in 0..2 {
			let mut stream = TcpStream::connect(addr).await.unwrap();
			stream.write_all(format!("{}\n", hash_hex).as_bytes()).await.unwrap();
		}

		let first = rx.recv().await.unwrap();
		assert_eq!(first, Hash::from_slice(&from_hex(&hash_hex).unwrap()));

		let second = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv()).await;
		assert!(second.is_err(), "duplicate notification should have been deduplicated");
	}
}
