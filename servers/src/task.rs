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

//! Turns a daemon block template into a stratum-compatible mining task: a
//! coinbase split in two around the miner-supplied extranonce, an aux-chain
//! Merkle root, and the Merkle link folding the (not yet known) coinbase
//! txid up to the block's transaction Merkle root.

use async_trait::async_trait;
use log::info;
use thiserror::Error;

use spool_core::hash::{hash160_to_script, sha256d, Hash};
use spool_core::merkle::build_merkle_tree;
use spool_core::tx::BlockTemplate;

use crate::config::FeesConfig;

#[derive(Debug, Error)]
pub enum TaskError {
	#[error("block template height {0} exceeds the BIP-34 safety ceiling")]
	HeightTooLarge(u64),
	#[error("pool payout pubkey hash must be 20 bytes, got {0}")]
	InvalidPayoutHash(usize),
	#[error("daemon watcher error: {0}")]
	Daemon(String),
	#[error("publish error: {0}")]
	Publish(String),
}

/// Safety ceiling mirroring the one real pools apply to BIP-34 height
/// encoding; heights beyond this are almost certainly a misconfigured
/// daemon rather than real chain data.
const MAX_HEIGHT: u64 = 10_000_000;

/// Encodes a block height per BIP-34: minimal little-endian bytes, with a
/// trailing zero byte added if the top bit would otherwise be set (so the
/// value reads as positive when interpreted as a script push).
pub fn encode_bip34_height(height: u64) -> Result<Vec<u8>, TaskError> {
	if height > MAX_HEIGHT {
		return Err(TaskError::HeightTooLarge(height));
	}
	if height == 0 {
		return Ok(vec![0]);
	}
	let mut bytes = Vec::new();
	let mut n = height;
	while n > 0 {
		bytes.push((n & 0xff) as u8);
		n >>= 8;
	}
	if *bytes.last().unwrap() & 0x80 != 0 {
		bytes.push(0);
	}
	Ok(bytes)
}

fn push_data(out: &mut Vec<u8>, data: &[u8]) {
	// Scripts here never push more than a couple dozen bytes at a time
	// (heights, pool tags, extranonce placeholders), so the single-byte
	// direct-push encoding is always sufficient.
	out.push(data.len() as u8);
	out.extend_from_slice(data);
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
	if n < 0xfd {
		out.push(n as u8);
	} else if n <= 0xffff {
		out.push(0xfd);
		out.extend_from_slice(&(n as u16).to_le_bytes());
	} else if n <= 0xffff_ffff {
		out.push(0xfe);
		out.extend_from_slice(&(n as u32).to_le_bytes());
	} else {
		out.push(0xff);
		out.extend_from_slice(&n.to_le_bytes());
	}
}

/// The two coinbase halves a stratum job splits around the miner-supplied
/// extranonce, and everything else needed to assemble a mining job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskMessage {
	pub job_id: String,
	pub previous_block_hash: Hash,
	pub coinbase_part1: Vec<u8>,
	pub coinbase_part2: Vec<u8>,
	pub merkle_link: Vec<Hash>,
	pub version: u32,
	pub bits: u32,
	pub curtime: u32,
	pub height: u64,
	pub aux_merkle_root: Hash,
	pub clean_jobs: bool,
}

/// Delivers a constructed task to whatever transport publishes it to
/// connected miners (a stratum session broker, typically).
#[async_trait]
pub trait Publisher: Send + Sync {
	async fn publish(&self, task: &TaskMessage) -> Result<(), TaskError>;
}

/// Supplies fresh block templates, whether by polling the daemon or by
/// being woken by the block-notify listener.
#[async_trait]
pub trait DaemonWatcher: Send + Sync {
	async fn fetch_template(&self) -> Result<BlockTemplate, TaskError>;
}

/// Builds tasks from block templates for a single pool payout address.
pub struct TaskConstructor {
	pool_payout_hash160: [u8; 20],
	pool_identifier: Vec<u8>,
	fees: FeesConfig,
	job_counter: u64,
	last_previous_hash: Option<Hash>,
}

impl TaskConstructor {
	pub fn new(pool_payout_hash160: [u8; 20], pool_identifier: String, fees: FeesConfig) -> TaskConstructor {
		TaskConstructor {
			pool_payout_hash160,
			pool_identifier: pool_identifier.into_bytes(),
			fees,
			job_counter: 0,
			last_previous_hash: None,
		}
	}

	/// Computes the aux-chain Merkle root over every merge-mined chain tip
	/// in the template, in the order the daemon reported them.
	fn aux_merkle_root(template: &BlockTemplate) -> Hash {
		let roots: Vec<Hash> = template.aux_chains.iter().map(|c| c.merkle_root).collect();
		build_merkle_tree(&roots).root
	}

	/// Splits a coinbase around the extranonce placeholder and builds the
	/// Merkle link to fold the (still-unknown) coinbase txid up to the
	/// block's transaction Merkle root. Bumps the job counter and marks
	/// `clean_jobs` whenever the previous block hash has changed, per the
	/// stratum convention of forcing miners to discard in-flight work on a
	/// new tip.
	pub fn on_template_updated(&mut self, template: BlockTemplate) -> Result<TaskMessage, TaskError> {
		if self.pool_payout_hash160.len() != 20 {
			return Err(TaskError::InvalidPayoutHash(self.pool_payout_hash160.len()));
		}

		let height_bytes = encode_bip34_height(template.height)?;

		let mut script_sig = Vec::new();
		push_data(&mut script_sig, &height_bytes);
		push_data(&mut script_sig, &self.pool_identifier);
		let part1_script_prefix_len = script_sig.len();

		// Coinbase part 1: version, single null input, script_sig length
		// prefix (covering height + pool tag + extranonce placeholder) and
		// the script_sig bytes built so far. The miner appends its own
		// extranonce bytes directly after this.
		let extranonce_placeholder_len = 8; // extranonce1 (4) + extranonce2 (4), stratum convention
		let total_script_sig_len = part1_script_prefix_len + extranonce_placeholder_len;

		let mut part1 = Vec::new();
		part1.extend_from_slice(&1u32.to_le_bytes()); // tx version
		write_varint(&mut part1, 1); // one input
		part1.extend_from_slice(&[0u8; 32]); // null previous txid
		part1.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // null previous index
		write_varint(&mut part1, total_script_sig_len as u64);
		part1.extend_from_slice(&script_sig);

		// Coinbase part 2: sequence, outputs (pool payout + fee donation,
		// if configured) and locktime.
		let mut part2 = Vec::new();
		part2.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // sequence

		let donation_value = (template.coinbase_value as f64 * self.fees.donation_fraction) as u64;
		let payout_value = template.coinbase_value.saturating_sub(donation_value);

		let outputs = if donation_value > 0 { 2u64 } else { 1u64 };
		write_varint(&mut part2, outputs);

		part2.extend_from_slice(&payout_value.to_le_bytes());
		let payout_script = hash160_to_script(&self.pool_payout_hash160);
		write_varint(&mut part2, payout_script.len() as u64);
		part2.extend_from_slice(&payout_script);

		if donation_value > 0 {
			part2.extend_from_slice(&donation_value.to_le_bytes());
			let donation_script = hash160_to_script(&self.pool_payout_hash160);
			write_varint(&mut part2, donation_script.len() as u64);
			part2.extend_from_slice(&donation_script);
		}

		part2.extend_from_slice(&0u32.to_le_bytes()); // locktime

		let merkle_link = template.merkle_link();
		let aux_merkle_root = Self::aux_merkle_root(&template);

		let clean_jobs = self.last_previous_hash != Some(template.previous_block_hash);
		self.last_previous_hash = Some(template.previous_block_hash);
		self.job_counter += 1;

		let task = TaskMessage {
			job_id: format!("{:x}", self.job_counter),
			previous_block_hash: template.previous_block_hash,
			coinbase_part1: part1,
			coinbase_part2: part2,
			merkle_link,
			version: template.version,
			bits: template.bits,
			curtime: template.curtime,
			height: template.height,
			aux_merkle_root,
			clean_jobs,
		};

		info!(
			"built task {} at height {} (clean_jobs={})",
			task.job_id, task.height, task.clean_jobs
		);
		Ok(task)
	}
}

/// Reassembles the full coinbase transaction for a chosen extranonce, e.g.
/// to recompute its txid when validating a submitted share.
pub fn assemble_coinbase(task: &TaskMessage, extranonce: &[u8]) -> Vec<u8> {
	let mut tx = Vec::with_capacity(task.coinbase_part1.len() + extranonce.len() + task.coinbase_part2.len());
	tx.extend_from_slice(&task.coinbase_part1);
	tx.extend_from_slice(extranonce);
	tx.extend_from_slice(&task.coinbase_part2);
	tx
}

pub fn coinbase_txid(task: &TaskMessage, extranonce: &[u8]) -> Hash {
	sha256d(&assemble_coinbase(task, extranonce))
}

#[cfg(test)]
mod tests {
	use super::*;
	use spool_core::tx::{AuxChainTip, TransactionTemplate};

	fn sample_template() -> BlockTemplate {
		BlockTemplate {
			height: 500_000,
			previous_block_hash: Hash([7u8; 32]),
			bits: 0x1d00ffff,
			curtime: 1_700_000_000,
			version: 0x2000_0000,
			coinbase_value: 5_000_000_000,
			transactions: vec![TransactionTemplate::new(Hash([1u8; 32]), Hash([1u8; 32]), vec![])],
			aux_chains: vec![AuxChainTip {
				chain_id: 1,
				merkle_root: Hash([9u8; 32]),
			}],
		}
	}

	#[test]
	fn bip34_height_encoding_matches_known_shape() {
		assert_eq!(encode_bip34_height(0).unwrap(), vec![0]);
		assert_eq!(encode_bip34_height(1).unwrap(), vec![1]);
		assert_eq!(encode_bip34_height(255).unwrap(), vec![0xff, 0x00]);
		assert_eq!(encode_bip34_height(256).unwrap(), vec![0x00, 0x01]);
		assert!(encode_bip34_height(MAX_HEIGHT + 1).is_err());
	}

	#[test]
	fn task_construction_splits_around_extranonce() {
		let mut constructor = TaskConstructor::new([0x42u8; 20], "spool".to_string(), FeesConfig::default());
		let task = constructor.on_template_updated(sample_template()).unwrap();

		assert!(task.coinbase_part1.len() > 40);
		assert!(task.coinbase_part2.len() > 8);
		assert_eq!(task.height, 500_000);
		assert!(task.clean_jobs);
	}

	#[test]
	fn second_template_with_same_tip_is_not_a_clean_job() {
		let mut constructor = TaskConstructor::new([0x42u8; 20], "spool".to_string(), FeesConfig::default());
		let first = constructor.on_template_updated(sample_template()).unwrap();
		let second = constructor.on_template_updated(sample_template()).unwrap();
		assert!(first.clean_jobs);
		assert!(!second.clean_jobs);
	}

	#[test]
	fn assembled_coinbase_round_trips_through_extranonce() {
		let mut constructor = TaskConstructor::new([0x42u8; 20], "spool".to_string(), FeesConfig::default());
		let task = constructor.on_template_updated(sample_template()).unwrap();
		let extranonce = [0xaa, 0xbb, 0xcc, 0xdd, 0x11, 0x22, 0x33, 0x44];
		let tx_bytes = assemble_coinbase(&task, &extranonce);
		assert_eq!(
			tx_bytes.len(),
			task.coinbase_part1.len() + extranonce.len() + task.coinbase_part2.len()
		);
		let txid = coinbase_txid(&task, &extranonce);
		assert_eq!(txid, sha256d(&tx_bytes));
	}
}
