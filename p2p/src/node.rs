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

//! A single remote peer's connection state: the write half of its socket,
//! an identifying tag, and the two transaction sets that track what this
//! peer already knows, so the coordinator never re-announces data it has
//! already sent or been told about.
//!
//! `Node` only owns its own `rememberedTxs`/`remoteTxHashs`; it has no
//! access to the coordinator's `knownTxs`/`miningTxs`, so the lookups that
//! `remember_tx` handling needs against those maps live on `Coordinator`
//! instead (see `p2p::coordinator`).

use std::collections::{HashMap, HashSet};

use log::trace;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;

use spool_core::ser::ser_vec;
use spool_core::tx::{TransactionTemplate, TxKey};

use crate::error::Error;
use crate::msg::Message;

/// State for one connected peer.
pub struct Node {
	/// Identifies this peer in logs and in coordinator lookups; usually the
	/// remote address, but kept as an opaque string so tests can substitute
	/// anything unique.
	pub tag: String,
	writer: OwnedWriteHalf,
	/// Transactions this peer has told us (via `remember_tx`) it already
	/// has, so we never send them back as part of a share.
	pub remembered_txs: HashMap<TxKey, TransactionTemplate>,
	/// Transactions we believe this peer already knows about, because we
	/// announced them via `have_tx` or it announced them to us. A later
	/// `miningTxs` addition only needs to carry the full transaction for
	/// whatever's missing from this set.
	pub remote_tx_keys: HashSet<TxKey>,
	/// Set once a `Version` message has been exchanged and validated in
	/// both directions. Drives the `versionVerified` handshake action in
	/// `Coordinator::on_version_verified`.
	pub version_verified: bool,
}

impl Node {
	pub fn new(tag: String, writer: OwnedWriteHalf) -> Node {
		Node {
			tag,
			writer,
			remembered_txs: HashMap::new(),
			remote_tx_keys: HashSet::new(),
			version_verified: false,
		}
	}

	/// Serializes and sends a message to this peer. Gossip is best-effort:
	/// callers log a failure and drop the peer rather than propagating the
	/// error up through a broadcast.
	pub async fn send(&mut self, msg: &Message) -> Result<(), Error> {
		let bytes = ser_vec(msg)?;
		self.writer.write_all(&bytes).await?;
		trace!("sent {:?} to {}", msg, self.tag);
		Ok(())
	}

	pub fn remembers(&self, key: &TxKey) -> bool {
		self.remembered_txs.contains_key(key)
	}

	/// Records that this peer now has `tx` remembered, because we just told
	/// it about `tx` (in a `remember_tx` we sent) or it told us (in one it
	/// sent). Either way the transaction is also now known to be in the
	/// peer's possession.
	pub fn remember(&mut self, key: TxKey, tx: TransactionTemplate) {
		self.remote_tx_keys.insert(key);
		self.remembered_txs.insert(key, tx);
	}

	pub fn forget(&mut self, key: &TxKey) {
		self.remembered_txs.remove(key);
	}

	/// Records that this peer now knows about `keys`, because we just sent
	/// it a `have_tx` naming them.
	pub fn mark_remote_known(&mut self, keys: &[TxKey]) {
		for key in keys {
			self.remote_tx_keys.insert(*key);
		}
	}

	pub fn knows_tx(&self, key: &TxKey) -> bool {
		self.remembered_txs.contains_key(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use spool_core::hash::Hash;

	fn key(b: u8) -> TxKey {
		(Hash([b; 32]), Hash([b; 32]))
	}

	#[test]
	fn remember_then_forget_clears_membership() {
		// Node::new needs a live socket half, so the bookkeeping is exercised
		// directly against bare maps here instead.
		let mut remembered: HashMap<TxKey, TransactionTemplate> = HashMap::new();
		let a = key(1);
		let b = key(2);
		remembered.insert(a, TransactionTemplate::new(a.0, a.1, vec![]));
		remembered.insert(b, TransactionTemplate::new(b.0, b.1, vec![]));
		remembered.remove(&a);
		assert!(!remembered.contains_key(&a));
		assert!(remembered.contains_key(&b));
	}
}
