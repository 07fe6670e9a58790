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

//! Coordinates gossip across every connected peer: tracks the set of
//! transactions this node knows about (`known_txs`) and the subset actually
//! referenced by the current mining task (`mining_txs`), and turns changes
//! to either set into outbound `HaveTx`/`LosingTx`/`RememberTx`/`ForgetTx`
//! broadcasts.
//!
//! Both sets are plain maps reassigned wholesale on update, the way a block
//! template arrives wholesale from the daemon; there is no reactive
//! observable layer underneath, just an explicit diff taken at the point of
//! assignment. Both are keyed by `TxKey` (`txid` paired with `hash`), not by
//! `txid` alone, matching `updateGbt`'s keying.

use std::collections::{HashMap, HashSet, VecDeque};

use log::warn;

use spool_core::tx::{BlockTemplate, TransactionTemplate, TxKey};

use crate::error::Error;
use crate::msg::Message;
use crate::node::Node;

/// How many past "forgotten" snapshots (one per `known_txs` update that
/// dropped transactions) are kept, so a just-forgotten entry can still be
/// resolved for a short while without scanning the whole share chain.
const FORGOTTEN_CACHE_SIZE: usize = 10;

pub struct Coordinator {
	peers: HashMap<String, Node>,
	known_txs: HashMap<TxKey, TransactionTemplate>,
	mining_txs: HashMap<TxKey, TransactionTemplate>,
	forgotten_cache: VecDeque<HashMap<TxKey, TransactionTemplate>>,
}

impl Coordinator {
	pub fn new() -> Coordinator {
		Coordinator {
			peers: HashMap::new(),
			known_txs: HashMap::new(),
			mining_txs: HashMap::new(),
			forgotten_cache: VecDeque::with_capacity(FORGOTTEN_CACHE_SIZE),
		}
	}

	pub fn add_peer(&mut self, node: Node) {
		self.peers.insert(node.tag.clone(), node);
	}

	pub fn remove_peer(&mut self, tag: &str) -> Option<Node> {
		self.peers.remove(tag)
	}

	pub fn peer_count(&self) -> usize {
		self.peers.len()
	}

	/// `knownTxs` entry for `key`, falling back to the forgotten-tx cache
	/// (most recent snapshot first) the way `on remember_tx` is required to.
	fn resolve(&self, key: &TxKey) -> Option<TransactionTemplate> {
		if let Some(tx) = self.known_txs.get(key) {
			return Some(tx.clone());
		}
		self.forgotten_cache
			.iter()
			.rev()
			.find_map(|snapshot| snapshot.get(key).cloned())
	}

	/// Applies a `versionVerified` handshake: sends `have_tx(keys(knownTxs))`
	/// followed by `remember_tx([], values(miningTxs))` to the one peer that
	/// was just verified.
	pub async fn on_version_verified(&mut self, tag: &str) -> Result<(), Error> {
		let known_keys: Vec<TxKey> = self.known_txs.keys().cloned().collect();
		let mining_vals: Vec<TransactionTemplate> = self.mining_txs.values().cloned().collect();

		let peer = self
			.peers
			.get_mut(tag)
			.ok_or_else(|| Error::UnknownPeer(tag.to_string()))?;
		peer.version_verified = true;
		peer.send(&Message::HaveTx {
			keys: known_keys.clone(),
		})
		.await?;
		peer.mark_remote_known(&known_keys);
		peer.send(&Message::RememberTx {
			keys: vec![],
			txs: mining_vals.clone(),
		})
		.await?;
		for tx in &mining_vals {
			peer.remember(tx.identity(), tx.clone());
		}
		Ok(())
	}

	/// Applies a `RememberTx` from `tag`. For each bare `key`, resolves it
	/// against `knownTxs`/the forgotten cache and disconnects the peer if it
	/// references something already remembered or nothing we recognize at
	/// all. For each full `tx`, disconnects on a double reference, otherwise
	/// adopts it into the peer's memory and a working copy of `knownTxs`
	/// that gets committed (and diffed) at the end.
	pub async fn on_remember_tx(
		&mut self,
		tag: &str,
		keys: &[TxKey],
		txs: Vec<TransactionTemplate>,
	) -> Result<(), Error> {
		let mut resolved: Vec<(TxKey, TransactionTemplate)> = Vec::with_capacity(keys.len());
		{
			let peer = self
				.peers
				.get(tag)
				.ok_or_else(|| Error::UnknownPeer(tag.to_string()))?;

			for key in keys {
				if peer.remembers(key) {
					return Err(Error::ProtocolViolation(format!(
						"tx {:?} referenced twice in remember_tx from {}",
						key, tag
					)));
				}
				let tx = self.resolve(key).ok_or_else(|| {
					Error::ProtocolViolation(format!(
						"remember_tx from {} referenced unknown tx {:?}",
						tag, key
					))
				})?;
				resolved.push((*key, tx));
			}

			let mut seen: HashSet<TxKey> = HashSet::with_capacity(txs.len());
			for tx in &txs {
				let key = tx.identity();
				if peer.remembers(&key) || !seen.insert(key) {
					return Err(Error::ProtocolViolation(format!(
						"tx {:?} referenced twice in remember_tx from {}",
						key, tag
					)));
				}
			}
		}

		let mut working_known = self.known_txs.clone();
		let peer = self.peers.get_mut(tag).expect("peer presence checked above");
		for (key, tx) in resolved {
			peer.remember(key, tx);
		}
		for tx in txs {
			let key = tx.identity();
			peer.remember(key, tx.clone());
			working_known.insert(key, tx);
		}

		self.on_known_txs_changed(working_known).await;
		Ok(())
	}

	/// Applies a `ForgetTx` from `tag`: evicts `keys` from that peer's
	/// remembered set.
	pub fn on_forget_tx(&mut self, tag: &str, keys: &[TxKey]) -> Result<(), Error> {
		let peer = self
			.peers
			.get_mut(tag)
			.ok_or_else(|| Error::UnknownPeer(tag.to_string()))?;
		for key in keys {
			peer.forget(key);
		}
		Ok(())
	}

	/// Replaces `known_txs` and broadcasts `HaveTx` for newly present
	/// entries; entries that dropped out are snapshotted into the
	/// forgotten-tx cache so a subsequent `remember_tx` can still resolve
	/// them for a short while.
	pub async fn on_known_txs_changed(&mut self, new_known: HashMap<TxKey, TransactionTemplate>) {
		let added: Vec<TxKey> = new_known
			.keys()
			.filter(|k| !self.known_txs.contains_key(k))
			.cloned()
			.collect();
		let removed: HashMap<TxKey, TransactionTemplate> = self
			.known_txs
			.iter()
			.filter(|(k, _)| !new_known.contains_key(k))
			.map(|(k, v)| (*k, v.clone()))
			.collect();

		self.known_txs = new_known;

		if !added.is_empty() {
			self.broadcast(Message::HaveTx { keys: added.clone() }).await;
			for peer in self.peers.values_mut() {
				peer.mark_remote_known(&added);
			}
		}

		if !removed.is_empty() {
			if self.forgotten_cache.len() == FORGOTTEN_CACHE_SIZE {
				self.forgotten_cache.pop_front();
			}
			self.forgotten_cache.push_back(removed);
		}
	}

	/// Replaces `mining_txs` and tells every peer what changed: newly
	/// referenced transactions via `remember_tx` (as a bare key if the peer
	/// is already known to have the data, or the full transaction
	/// otherwise), and dropped ones via `forget_tx` with their combined
	/// byte size.
	pub async fn on_mining_txs_changed(&mut self, new_mining: HashMap<TxKey, TransactionTemplate>) {
		let added: Vec<TransactionTemplate> = new_mining
			.iter()
			.filter(|(k, _)| !self.mining_txs.contains_key(k))
			.map(|(_, v)| v.clone())
			.collect();
		let removed: Vec<TransactionTemplate> = self
			.mining_txs
			.iter()
			.filter(|(k, _)| !new_mining.contains_key(k))
			.map(|(_, v)| v.clone())
			.collect();

		self.mining_txs = new_mining;

		if !added.is_empty() {
			let tags: Vec<String> = self.peers.keys().cloned().collect();
			for tag in tags {
				let peer = self.peers.get_mut(&tag).expect("tag came from self.peers");
				let (known_keys, unknown_txs): (Vec<TxKey>, Vec<TransactionTemplate>) = {
					let mut known_keys = Vec::new();
					let mut unknown_txs = Vec::new();
					for tx in &added {
						let key = tx.identity();
						if peer.remote_tx_keys.contains(&key) {
							known_keys.push(key);
						} else {
							unknown_txs.push(tx.clone());
						}
					}
					(known_keys, unknown_txs)
				};
				let msg = Message::RememberTx {
					keys: known_keys,
					txs: unknown_txs,
				};
				if let Err(e) = peer.send(&msg).await {
					warn!("failed to send {:?} to {}: {}", msg, tag, e);
					continue;
				}
				for tx in &added {
					peer.remember(tx.identity(), tx.clone());
				}
			}
		}

		if !removed.is_empty() {
			let total_size: u64 = removed.iter().map(|t| t.byte_size() as u64).sum();
			let keys: Vec<TxKey> = removed.iter().map(|t| t.identity()).collect();
			self.broadcast(Message::ForgetTx { keys, total_size }).await;
		}
	}

	/// Entry point from task construction: a new block template arrived
	/// from the daemon. Rebuilds `mining_txs` from its transaction list
	/// (keyed by `txid || hash`), merges those transactions into
	/// `known_txs`, and diffs both against their previous contents.
	pub async fn update_gbt(&mut self, template: &BlockTemplate) {
		let new_mining: HashMap<TxKey, TransactionTemplate> = template
			.transactions
			.iter()
			.map(|t| (t.identity(), t.clone()))
			.collect();

		let mut new_known = self.known_txs.clone();
		for (key, tx) in &new_mining {
			new_known.insert(*key, tx.clone());
		}

		self.on_known_txs_changed(new_known).await;
		self.on_mining_txs_changed(new_mining).await;
	}

	/// True if `key` appears in any of the last [`FORGOTTEN_CACHE_SIZE`]
	/// dropped-transaction snapshots.
	pub fn recently_forgotten(&self, key: &TxKey) -> bool {
		self.forgotten_cache.iter().any(|snapshot| snapshot.contains_key(key))
	}

	async fn broadcast(&mut self, msg: Message) {
		for (tag, peer) in self.peers.iter_mut() {
			if let Err(e) = peer.send(&msg).await {
				warn!("failed to send {:?} to {}: {}", msg, tag, e);
			}
		}
	}
}

impl Default for Coordinator {
	fn default() -> Coordinator {
		Coordinator::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use spool_core::hash::Hash;

	fn h(b: u8) -> Hash {
		Hash([b; 32])
	}

	fn tx(b: u8) -> TransactionTemplate {
		TransactionTemplate::new(h(b), h(b), vec![])
	}

	fn key(b: u8) -> TxKey {
		(h(b), h(b))
	}

	#[tokio::test]
	async fn known_txs_diff_with_no_peers_is_a_no_op() {
		let mut coord = Coordinator::new();
		let mut known = HashMap::new();
		known.insert(key(1), tx(1));
		coord.on_known_txs_changed(known).await;
		assert_eq!(coord.known_txs.len(), 1);
	}

	#[tokio::test]
	async fn mining_txs_removal_populates_forgotten_cache() {
		let mut coord = Coordinator::new();
		let mut first = HashMap::new();
		first.insert(key(1), tx(1));
		first.insert(key(2), tx(2));
		coord.on_known_txs_changed(first.clone()).await;
		coord.on_mining_txs_changed(first).await;

		let mut second = HashMap::new();
		second.insert(key(1), tx(1));
		coord.on_known_txs_changed(second.clone()).await;
		coord.on_mining_txs_changed(second).await;

		assert!(coord.recently_forgotten(&key(2)));
		assert!(!coord.recently_forgotten(&key(1)));
	}

	#[tokio::test]
	async fn forgotten_cache_is_bounded() {
		let mut coord = Coordinator::new();
		coord.on_known_txs_changed(HashMap::from([(key(0), tx(0))])).await;
		for i in 1..=(FORGOTTEN_CACHE_SIZE as u8 + 3) {
			let next = HashMap::from([(key(i), tx(i))]);
			coord.on_known_txs_changed(next).await;
		}
		assert!(coord.forgotten_cache.len() <= FORGOTTEN_CACHE_SIZE);
	}

	#[tokio::test]
	async fn update_gbt_merges_template_transactions_into_known_txs() {
		let mut coord = Coordinator::new();
		let template = BlockTemplate {
			height: 1,
			previous_block_hash: h(0),
			bits: 0x1d00ffff,
			curtime: 0,
			version: 1,
			coinbase_value: 0,
			transactions: vec![tx(5), tx(6)],
			aux_chains: vec![],
		};
		coord.update_gbt(&template).await;
		assert!(coord.known_txs.contains_key(&key(5)));
		assert!(coord.known_txs.contains_key(&key(6)));
		assert!(coord.mining_txs.contains_key(&key(5)));
	}

	#[tokio::test]
	async fn remember_tx_rejects_unknown_peer() {
		let mut coord = Coordinator::new();
		let err = coord
			.on_remember_tx("unknown-peer", &[key(1)], vec![])
			.await
			.unwrap_err();
		assert!(matches!(err, Error::UnknownPeer(_)));
	}
}
