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

//! Transaction templates and the block template a share is built around.

use crate::hash::Hash;
use crate::ser::{Error as SerError, Readable, Reader, Writeable, Writer};

/// A transaction as carried in a peer's mempool gossip and in a block
/// template: its identity (`txid`, `hash` — the witness-inclusive hash on
/// chains that distinguish the two) and its raw serialized form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionTemplate {
	pub txid: Hash,
	pub hash: Hash,
	pub data: Vec<u8>,
}

/// The key a transaction is known and deduplicated by in the peer
/// coordinator's `knownTxs`/`miningTxs` maps: `txid` paired with `hash`,
/// since a single txid can have more than one valid witness hash.
pub type TxKey = (Hash, Hash);

impl TransactionTemplate {
	pub fn new(txid: Hash, hash: Hash, data: Vec<u8>) -> TransactionTemplate {
		TransactionTemplate { txid, hash, data }
	}

	pub fn identity(&self) -> TxKey {
		(self.txid, self.hash)
	}

	pub fn byte_size(&self) -> usize {
		self.data.len()
	}
}

impl Writeable for TransactionTemplate {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		writer.write_fixed_bytes(self.txid.as_bytes())?;
		writer.write_fixed_bytes(self.hash.as_bytes())?;
		writer.write_var_bytes(&self.data)
	}
}

impl Readable for TransactionTemplate {
	fn read<R: Reader>(reader: &mut R) -> Result<TransactionTemplate, SerError> {
		let txid = reader.read_hash()?;
		let hash = reader.read_hash()?;
		let data = reader.read_var_bytes()?;
		Ok(TransactionTemplate { txid, hash, data })
	}
}

/// An auxiliary proof-of-work chain's tip, merge-mined alongside this
/// share chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxChainTip {
	pub chain_id: u32,
	pub merkle_root: Hash,
}

/// The daemon-supplied block template a task is built from: everything
/// needed to assemble a coinbase, pick transactions and fill in a header
/// except the parts only the pool itself can supply (the payout split and
/// the extranonce).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockTemplate {
	pub height: u64,
	pub previous_block_hash: Hash,
	pub bits: u32,
	pub curtime: u32,
	pub version: u32,
	pub coinbase_value: u64,
	pub transactions: Vec<TransactionTemplate>,
	pub aux_chains: Vec<AuxChainTip>,
}

impl BlockTemplate {
	/// Merkle tree branch needed to fold the coinbase txid into this
	/// template's transaction set, i.e. the sibling path for leaf 0.
	pub fn merkle_link(&self) -> Vec<Hash> {
		let mut hashes = vec![Hash::from_slice(&[0u8; 32])]; // placeholder coinbase slot
		hashes.extend(self.transactions.iter().map(|t| t.txid));
		crate::merkle::merkle_link(&hashes, 0)
	}

	pub fn transaction_fees(&self, total_subsidy: u64) -> u64 {
		self.coinbase_value.saturating_sub(total_subsidy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn h(b: u8) -> Hash {
		Hash([b; 32])
	}

	#[test]
	fn identity_pairs_txid_and_hash() {
		let tx = TransactionTemplate::new(h(1), h(2), vec![0xde, 0xad]);
		assert_eq!(tx.identity(), (h(1), h(2)));
		assert_eq!(tx.byte_size(), 2);
	}

	#[test]
	fn transaction_template_round_trips() {
		let tx = TransactionTemplate::new(h(3), h(4), vec![1, 2, 3, 4, 5]);
		let bytes = crate::ser::ser_vec(&tx).unwrap();
		let mut cursor = &bytes[..];
		let parsed: TransactionTemplate = crate::ser::deserialize(&mut cursor).unwrap();
		assert_eq!(parsed, tx);
	}

	#[test]
	fn merkle_link_includes_every_other_transaction() {
		let template = BlockTemplate {
			height: 100,
			previous_block_hash: h(9),
			bits: 0x1d00ffff,
			curtime: 1_600_000_000,
			version: 2,
			coinbase_value: 5_000_000_000,
			transactions: vec![
				TransactionTemplate::new(h(1), h(1), vec![]),
				TransactionTemplate::new(h(2), h(2), vec![]),
			],
			aux_chains: vec![],
		};
		assert_eq!(template.merkle_link().len(), 2);
	}
}
