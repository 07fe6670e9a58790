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

//! The gossip wire protocol: a handshake, announcements of transactions a
//! peer now has ("have_tx"), and the tx-awareness bookkeeping messages
//! ("remember_tx" / "forget_tx") that keep both ends' mempool views from
//! re-sending data the other side has already seen.
//!
//! Transactions are identified on the wire by their `TxKey`, the
//! `(txid, hash)` pair `knownTxs`/`miningTxs` are keyed by — not by `txid`
//! alone, since a single txid can carry more than one valid witness hash.

use spool_core::ser::{Error as SerError, Readable, Reader, Writeable, Writer};
use spool_core::tx::{TransactionTemplate, TxKey};

pub const PROTOCOL_VERSION: u32 = 1;

/// A single gossip message. Each variant is prefixed on the wire by a
/// one-byte command id, mirroring the share-chain's own tagged-union
/// encoding convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
	/// Sent once right after connecting: protocol version and a free-form
	/// tag identifying this node to its peer.
	Version { version: u32, tag: String },
	/// Announces that the sender now has full data for these transactions.
	HaveTx { keys: Vec<TxKey> },
	/// Announces transactions the sender is evicting from its mempool view,
	/// usually because they were included in a share or block.
	LosingTx { keys: Vec<TxKey> },
	/// Tells the peer "you may omit these transactions from future shares
	/// you send me; I already have them remembered". `keys` names
	/// transactions the peer can look up itself (in its own known-tx set or
	/// forgotten cache); `txs` carries full transactions the peer has never
	/// seen and must store verbatim.
	RememberTx { keys: Vec<TxKey>, txs: Vec<TransactionTemplate> },
	/// The inverse of `RememberTx`: asks the peer to stop omitting these
	/// transactions, because the sender has forgotten them (its
	/// short-term cache evicted them). `total_size` is the sum of their
	/// serialized byte lengths, for the peer's own bookkeeping.
	ForgetTx { keys: Vec<TxKey>, total_size: u64 },
}

const CMD_VERSION: u8 = 0;
const CMD_HAVE_TX: u8 = 1;
const CMD_LOSING_TX: u8 = 2;
const CMD_REMEMBER_TX: u8 = 3;
const CMD_FORGET_TX: u8 = 4;

fn write_tx_keys<W: Writer>(writer: &mut W, keys: &[TxKey]) -> Result<(), SerError> {
	writer.write_varint(keys.len() as u64)?;
	for (txid, hash) in keys {
		writer.write_fixed_bytes(txid.as_bytes())?;
		writer.write_fixed_bytes(hash.as_bytes())?;
	}
	Ok(())
}

fn read_tx_keys<R: Reader>(reader: &mut R) -> Result<Vec<TxKey>, SerError> {
	let count = reader.read_varint()?;
	let mut keys = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let txid = reader.read_hash()?;
		let hash = reader.read_hash()?;
		keys.push((txid, hash));
	}
	Ok(keys)
}

impl Writeable for Message {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		match self {
			Message::Version { version, tag } => {
				writer.write_u8(CMD_VERSION)?;
				writer.write_u32(*version)?;
				writer.write_var_bytes(tag.as_bytes())
			}
			Message::HaveTx { keys } => {
				writer.write_u8(CMD_HAVE_TX)?;
				write_tx_keys(writer, keys)
			}
			Message::LosingTx { keys } => {
				writer.write_u8(CMD_LOSING_TX)?;
				write_tx_keys(writer, keys)
			}
			Message::RememberTx { keys, txs } => {
				writer.write_u8(CMD_REMEMBER_TX)?;
				write_tx_keys(writer, keys)?;
				writer.write_varint(txs.len() as u64)?;
				for tx in txs {
					tx.write(writer)?;
				}
				Ok(())
			}
			Message::ForgetTx { keys, total_size } => {
				writer.write_u8(CMD_FORGET_TX)?;
				write_tx_keys(writer, keys)?;
				writer.write_u64(*total_size)
			}
		}
	}
}

impl Readable for Message {
	fn read<R: Reader>(reader: &mut R) -> Result<Message, SerError> {
		let cmd = reader.read_u8()?;
		match cmd {
			CMD_VERSION => {
				let version = reader.read_u32()?;
				let tag_bytes = reader.read_var_bytes()?;
				let tag = String::from_utf8(tag_bytes)
					.map_err(|e| SerError::Corrupted(format!("non-utf8 peer tag: {}", e)))?;
				Ok(Message::Version { version, tag })
			}
			CMD_HAVE_TX => Ok(Message::HaveTx {
				keys: read_tx_keys(reader)?,
			}),
			CMD_LOSING_TX => Ok(Message::LosingTx {
				keys: read_tx_keys(reader)?,
			}),
			CMD_REMEMBER_TX => {
				let keys = read_tx_keys(reader)?;
				let count = reader.read_varint()?;
				let mut txs = Vec::with_capacity(count as usize);
				for _ in 0..count {
					txs.push(TransactionTemplate::read(reader)?);
				}
				Ok(Message::RememberTx { keys, txs })
			}
			CMD_FORGET_TX => {
				let keys = read_tx_keys(reader)?;
				let total_size = reader.read_u64()?;
				Ok(Message::ForgetTx { keys, total_size })
			}
			other => Err(SerError::Corrupted(format!("unknown gossip command {}", other))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use spool_core::hash::Hash;
	use spool_core::ser::{deserialize, ser_vec};

	fn h(b: u8) -> Hash {
		Hash([b; 32])
	}

	fn key(b: u8) -> TxKey {
		(h(b), h(b))
	}

	#[test]
	fn version_round_trips() {
		let msg = Message::Version {
			version: PROTOCOL_VERSION,
			tag: "peer-a".to_string(),
		};
		let bytes = ser_vec(&msg).unwrap();
		let mut cursor = &bytes[..];
		let parsed: Message = deserialize(&mut cursor).unwrap();
		assert_eq!(parsed, msg);
	}

	#[test]
	fn have_tx_round_trips() {
		let msg = Message::HaveTx {
			keys: vec![key(1), key(2), key(3)],
		};
		let bytes = ser_vec(&msg).unwrap();
		let mut cursor = &bytes[..];
		let parsed: Message = deserialize(&mut cursor).unwrap();
		assert_eq!(parsed, msg);
	}

	#[test]
	fn remember_tx_round_trips_with_mixed_keys_and_full_txs() {
		let msg = Message::RememberTx {
			keys: vec![key(1)],
			txs: vec![TransactionTemplate::new(h(2), h(2), vec![0xde, 0xad, 0xbe, 0xef])],
		};
		let bytes = ser_vec(&msg).unwrap();
		let mut cursor = &bytes[..];
		let parsed: Message = deserialize(&mut cursor).unwrap();
		assert_eq!(parsed, msg);
	}

	#[test]
	fn forget_tx_round_trips_with_total_size() {
		let msg = Message::ForgetTx {
			keys: vec![key(3), key(4)],
			total_size: 512,
		};
		let bytes = ser_vec(&msg).unwrap();
		let mut cursor = &bytes[..];
		let parsed: Message = deserialize(&mut cursor).unwrap();
		assert_eq!(parsed, msg);
	}

	#[test]
	fn unknown_command_is_rejected() {
		let bytes = vec![0xffu8];
		let mut cursor = &bytes[..];
		let result: Result<Message, SerError> = deserialize(&mut cursor);
		assert!(result.is_err());
	}
}
