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

//! The share record: a block-header-like object that doubles as proof of
//! work against the share chain's own (loose) target and, when it happens
//! to also beat the real network target, as a full block.
//!
//! A share's generation transaction is built once as a byte template; every
//! share sharing that template reuses a [`HashLink`] midstate rather than
//! re-hashing the whole coinbase, which is the entire reason `HashLink`
//! exists in this chain's wire format.

use std::sync::OnceLock;

use num_bigint::BigUint;
use thiserror::Error;

use crate::hash::{hash160_to_script, sha256d, Hash};
use crate::hashlink::HashLink;
use crate::merkle::aggregate;
use crate::ser::{Error as SerError, Reader, Readable, Writeable, Writer};
use crate::target::Target;

/// The serialized prefix common to every generation transaction this chain
/// produces, up to (but not including) the reference-hash placeholder that
/// each share fills in individually: a pushed donation-script output, an
/// 8-byte zero value, and the first 3 bytes of a var-string-wrapped
/// OP_RETURN header. Its length must be exactly 79 bytes: this is asserted
/// at startup because [`HashLink::check`] silently produces garbage if the
/// real prefix and this constant disagree on length.
pub const GENTX_BEFORE_REFHASH: &[u8] = &[
	0x43, 0x41, 0x04, 0xff, 0xd0, 0x3d, 0xe4, 0x4a, 0x6e, 0x11, 0xb9, 0x91, 0x7f, 0x3a, 0x29, 0xf9,
	0x44, 0x32, 0x83, 0xd9, 0x87, 0x1c, 0x9d, 0x74, 0x3e, 0xf3, 0x0d, 0x5e, 0xdd, 0xcd, 0x37, 0x09,
	0x4b, 0x64, 0xd1, 0xb3, 0xd8, 0x09, 0x04, 0x96, 0xb5, 0x32, 0x56, 0x78, 0x6b, 0xf5, 0xc8, 0x29,
	0x32, 0xec, 0x23, 0xc3, 0xb7, 0x4d, 0x9f, 0x05, 0xa6, 0xf9, 0x5a, 0x8b, 0x55, 0x29, 0x35, 0x26,
	0x56, 0x66, 0x4b, 0xac, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2a, 0x6a, 0x28,
];

/// Asserts the invariant [`GENTX_BEFORE_REFHASH`] depends on. Called once
/// from process startup.
pub fn assert_gentx_prefix_length() {
	assert_eq!(
		GENTX_BEFORE_REFHASH.len(),
		79,
		"GENTX_BEFORE_REFHASH must be exactly 79 bytes"
	);
}

/// Network magic prepended to a share's serialized `ShareInfo` before it is
/// hashed into the generation-transaction reference hash. Overridden once at
/// startup via [`configure`]; this default exists only so tests and
/// single-chain deployments that never call `configure` still get
/// deterministic behavior.
const DEFAULT_IDENTIFIER: &[u8] = b"spool/share-chain";

/// The proof-of-work function applied to a share's full header to decide
/// whether it also qualifies as a real block, as distinct from the share's
/// own identity hash (always [`sha256d`]). Swapped in at startup for
/// whatever hash function the coin actually mines with (scrypt, X11, ...).
pub type PowFunc = fn(&[u8]) -> Hash;

static IDENTIFIER: OnceLock<Vec<u8>> = OnceLock::new();
static POW_FUNC: OnceLock<PowFunc> = OnceLock::new();
static MAX_TARGET: OnceLock<BigUint> = OnceLock::new();
static SEGWIT_ACTIVATION_VERSION: OnceLock<u32> = OnceLock::new();

/// Sets the process-wide share configuration. Must be called at most once,
/// before any share is parsed or validated; later calls are silently
/// ignored (first writer wins), matching the "set once at startup" contract
/// every one of these values carries.
pub fn configure(identifier: Vec<u8>, pow_func: PowFunc, max_target: BigUint, segwit_activation_version: u32) {
	let _ = IDENTIFIER.set(identifier);
	let _ = POW_FUNC.set(pow_func);
	let _ = MAX_TARGET.set(max_target);
	let _ = SEGWIT_ACTIVATION_VERSION.set(segwit_activation_version);
}

fn identifier() -> &'static [u8] {
	IDENTIFIER.get_or_init(|| DEFAULT_IDENTIFIER.to_vec())
}

fn pow_func() -> PowFunc {
	*POW_FUNC.get_or_init(|| sha256d)
}

fn configured_max_target() -> BigUint {
	MAX_TARGET.get_or_init(|| crate::target::bits_to_target(0x1d00ffff)).clone()
}

fn segwit_activation_version() -> u32 {
	*SEGWIT_ACTIVATION_VERSION.get_or_init(|| 17)
}

#[derive(Debug, Error)]
pub enum ShareError {
	#[error("serialization error: {0}")]
	Ser(#[from] SerError),
	#[error("hash link check failed: {0}")]
	HashLink(#[from] crate::hashlink::HashLinkError),
	#[error("duplicate transaction hash reference at index {0}")]
	DuplicateTxRef(usize),
	#[error("transaction hash reference at index {0} has shareCount >= 110")]
	RefShareCountTooLarge(usize),
	#[error("{refs} deduplicated own-share tx refs but {new_tx_hashes} new transaction hashes")]
	TxRefCountMismatch { refs: usize, new_tx_hashes: usize },
	#[error("share introduces {0} new transactions, more than this version allows")]
	TooManyNewTransactions(usize),
	#[error("share hash does not beat its own declared target")]
	TargetNotMet,
	#[error("share declares a target looser than the configured maximum")]
	TargetTooLoose,
	#[error("unsupported share version {0}")]
	UnsupportedVersion(u32),
}

/// The block-header-shaped fields every share version carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmallBlockHeader {
	pub version: u32,
	pub previous_block: Hash,
	pub timestamp: u32,
	pub bits: u32,
	pub nonce: u32,
}

impl Writeable for SmallBlockHeader {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		writer.write_u32(self.version)?;
		writer.write_fixed_bytes(self.previous_block.as_bytes())?;
		writer.write_u32(self.timestamp)?;
		writer.write_u32(self.bits)?;
		writer.write_u32(self.nonce)
	}
}

impl Readable for SmallBlockHeader {
	fn read<R: Reader>(reader: &mut R) -> Result<SmallBlockHeader, SerError> {
		Ok(SmallBlockHeader {
			version: reader.read_u32()?,
			previous_block: reader.read_hash()?,
			timestamp: reader.read_u32()?,
			bits: reader.read_u32()?,
			nonce: reader.read_u32()?,
		})
	}
}

/// The segwit sub-structure appended to `ShareInfo` once a version activates
/// it: the Merkle link from the segwit-aware transaction-id Merkle tree,
/// plus the coinbase's witness-reserved value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegwitInfo {
	pub txid_merkle_link: Vec<Hash>,
	pub txid_merkle_link_index: u32,
	pub witness_reserved_value: [u8; 32],
}

/// The payout-bearing payload of a share. Field order here is the wire
/// order and must not be reshuffled: `previousShareHash`, `coinbase`,
/// `nonce`, `pubkeyHash`, `subsidy`, `donation`, `staleInfo`,
/// `desiredVersion`, `transactionHashRefs`, `newTransactionHashes`,
/// `farShareHash`, `bits`, `timestamp`, `absheight`, `abswork`, and
/// (version-gated) the segwit sub-structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareInfo {
	pub previous_share_hash: Hash,
	pub coinbase: Vec<u8>,
	pub nonce: u32,
	pub pubkey_hash: [u8; 20],
	pub subsidy: u64,
	pub donation: u16,
	pub stale_info: u8,
	pub desired_version: u64,
	/// `(shareCount, txCount)` pairs: `shareCount == 0` means `txCount`
	/// indexes this share's own `new_transaction_hashes`; `shareCount > 0`
	/// reaches back that many shares for a transaction it introduced.
	pub transaction_hash_refs: Vec<(u64, u64)>,
	pub new_transaction_hashes: Vec<Hash>,
	pub far_share_hash: Option<Hash>,
	pub bits: u32,
	pub timestamp: u32,
	pub absheight: u32,
	pub abswork: u128,
	pub segwit: Option<SegwitInfo>,
}

impl Writeable for ShareInfo {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		writer.write_fixed_bytes(self.previous_share_hash.as_bytes())?;
		writer.write_var_bytes(&self.coinbase)?;
		writer.write_u32(self.nonce)?;
		writer.write_fixed_bytes(&self.pubkey_hash)?;
		writer.write_u64(self.subsidy)?;
		writer.write_u16(self.donation)?;
		writer.write_u8(self.stale_info)?;
		writer.write_varint(self.desired_version)?;
		writer.write_varint(self.transaction_hash_refs.len() as u64)?;
		for (share_count, tx_count) in &self.transaction_hash_refs {
			writer.write_varint(*share_count)?;
			writer.write_varint(*tx_count)?;
		}
		writer.write_hash_list(&self.new_transaction_hashes)?;
		match self.far_share_hash {
			Some(h) => {
				writer.write_u8(1)?;
				writer.write_fixed_bytes(h.as_bytes())?;
			}
			None => writer.write_u8(0)?,
		}
		writer.write_u32(self.bits)?;
		writer.write_u32(self.timestamp)?;
		writer.write_u32(self.absheight)?;
		writer.write_fixed_bytes(&self.abswork.to_le_bytes())?;
		if let Some(segwit) = &self.segwit {
			writer.write_hash_list(&segwit.txid_merkle_link)?;
			writer.write_u32(segwit.txid_merkle_link_index)?;
			writer.write_fixed_bytes(&segwit.witness_reserved_value)?;
		}
		Ok(())
	}
}

impl ShareInfo {
	/// Reads a `ShareInfo`. `segwit_active` is the caller's
	/// `share_version >= SEGWIT_ACTIVATION_VERSION` decision: the segwit
	/// sub-structure's presence on the wire is determined by the enclosing
	/// share's version, not by a flag carried inside `ShareInfo` itself.
	pub fn read<R: Reader>(reader: &mut R, segwit_active: bool) -> Result<ShareInfo, SerError> {
		let previous_share_hash = reader.read_hash()?;
		let coinbase = reader.read_var_bytes()?;
		let nonce = reader.read_u32()?;
		let pubkey_hash_bytes = reader.read_fixed_bytes(20)?;
		let mut pubkey_hash = [0u8; 20];
		pubkey_hash.copy_from_slice(&pubkey_hash_bytes);
		let subsidy = reader.read_u64()?;
		let donation = reader.read_u16()?;
		let stale_info = reader.read_u8()?;
		let desired_version = reader.read_varint()?;

		let ref_count = reader.read_varint()?;
		let mut transaction_hash_refs = Vec::with_capacity(ref_count as usize);
		for _ in 0..ref_count {
			let share_count = reader.read_varint()?;
			let tx_count = reader.read_varint()?;
			transaction_hash_refs.push((share_count, tx_count));
		}

		let new_transaction_hashes = reader.read_hash_list()?;
		let far_share_hash = match reader.read_u8()? {
			0 => None,
			_ => Some(reader.read_hash()?),
		};
		let bits = reader.read_u32()?;
		let timestamp = reader.read_u32()?;
		let absheight = reader.read_u32()?;
		let abswork_bytes = reader.read_fixed_bytes(16)?;
		let mut abswork_arr = [0u8; 16];
		abswork_arr.copy_from_slice(&abswork_bytes);

		let segwit = if segwit_active {
			let txid_merkle_link = reader.read_hash_list()?;
			let txid_merkle_link_index = reader.read_u32()?;
			let witness_reserved_bytes = reader.read_fixed_bytes(32)?;
			let mut witness_reserved_value = [0u8; 32];
			witness_reserved_value.copy_from_slice(&witness_reserved_bytes);
			Some(SegwitInfo {
				txid_merkle_link,
				txid_merkle_link_index,
				witness_reserved_value,
			})
		} else {
			None
		};

		Ok(ShareInfo {
			previous_share_hash,
			coinbase,
			nonce,
			pubkey_hash,
			subsidy,
			donation,
			stale_info,
			desired_version,
			transaction_hash_refs,
			new_transaction_hashes,
			far_share_hash,
			bits,
			timestamp,
			absheight,
			abswork: u128::from_le_bytes(abswork_arr),
			segwit,
		})
	}
}

/// A fully decoded share: the header-shaped fields, the payout-bearing
/// `ShareInfo`, the reference-Merkle-link and `lastTxoutNonce` that
/// reconstruct the generation-transaction reference hash, the resumable
/// `HashLink` over the shared coinbase prefix, and the Merkle link folding
/// the generation-tx hash up to the share's own Merkle root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
	/// The wire version this share was parsed under. Read by the caller
	/// from the enclosing message before any of the bytes below; not part
	/// of this struct's own serialized form.
	pub share_version: u32,
	pub min_header: SmallBlockHeader,
	pub share_info: ShareInfo,
	pub ref_merkle_link: Vec<Hash>,
	pub last_txout_nonce: u64,
	pub hash_link: HashLink,
	pub merkle_link: Vec<Hash>,
}

impl Writeable for Share {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		self.min_header.write(writer)?;
		self.share_info.write(writer)?;
		writer.write_hash_list(&self.ref_merkle_link)?;
		writer.write_u64(self.last_txout_nonce)?;
		self.hash_link.write(writer)?;
		writer.write_hash_list(&self.merkle_link)
	}
}

/// One entry in the share version registry: the wire version number paired
/// with the expected length of the common generation-transaction prefix and
/// the largest number of new transactions a share of this version may
/// introduce. Every version shares the same parse/serialize/validate
/// routine; only these constants vary between them.
pub struct ShareVersion {
	pub version: u32,
	pub gentx_prefix_len: usize,
	pub max_new_txs_size: usize,
}

pub const SHARE_VERSIONS: &[ShareVersion] = &[
	ShareVersion {
		version: 16,
		gentx_prefix_len: GENTX_BEFORE_REFHASH.len(),
		max_new_txs_size: 50_000,
	},
	ShareVersion {
		version: 17,
		gentx_prefix_len: GENTX_BEFORE_REFHASH.len(),
		max_new_txs_size: 100_000,
	},
];

fn version_info(version: u32) -> Result<&'static ShareVersion, ShareError> {
	SHARE_VERSIONS
		.iter()
		.find(|v| v.version == version)
		.ok_or(ShareError::UnsupportedVersion(version))
}

impl Share {
	/// Parses a share's own bytes (everything from `SmallBlockHeader`
	/// onward in the wire format) given the wire version already read by
	/// the caller from the enclosing message.
	pub fn parse<R: Reader>(reader: &mut R, share_version: u32) -> Result<Share, ShareError> {
		version_info(share_version)?;
		let min_header = SmallBlockHeader::read(reader)?;
		let segwit_active = share_version >= segwit_activation_version();
		let share_info = ShareInfo::read(reader, segwit_active)?;
		let ref_merkle_link = reader.read_hash_list()?;
		let last_txout_nonce = reader.read_u64()?;
		let hash_link = HashLink::read(reader)?;
		let merkle_link = reader.read_hash_list()?;
		Ok(Share {
			share_version,
			min_header,
			share_info,
			ref_merkle_link,
			last_txout_nonce,
			hash_link,
			merkle_link,
		})
	}

	/// The output script paying this share's declared pubkey hash: part of
	/// the generation transaction this share's `HashLink` commits to.
	pub fn new_script(&self) -> Vec<u8> {
		hash160_to_script(&self.share_info.pubkey_hash)
	}

	fn validate_refs(&self, info: &ShareVersion) -> Result<(), ShareError> {
		if self.share_info.new_transaction_hashes.len() > info.max_new_txs_size {
			return Err(ShareError::TooManyNewTransactions(
				self.share_info.new_transaction_hashes.len(),
			));
		}

		let mut zero_tx_counts = std::collections::HashSet::new();
		for (i, (share_count, tx_count)) in self.share_info.transaction_hash_refs.iter().enumerate() {
			if *share_count >= 110 {
				return Err(ShareError::RefShareCountTooLarge(i));
			}
			if *share_count == 0 && !zero_tx_counts.insert(*tx_count) {
				return Err(ShareError::DuplicateTxRef(i));
			}
		}
		if zero_tx_counts.len() != self.share_info.new_transaction_hashes.len() {
			return Err(ShareError::TxRefCountMismatch {
				refs: zero_tx_counts.len(),
				new_tx_hashes: self.share_info.new_transaction_hashes.len(),
			});
		}
		Ok(())
	}

	/// Runs the full validation pipeline for a decoded share:
	///
	/// 1. look up this share's version in the registry, and reject a
	///    malformed `transactionHashRefs`/`newTransactionHashes` pairing;
	/// 2. derive the payout script and this share's declared target;
	/// 3. resume the generation-transaction reference hash through
	///    `refMerkleLink`, then resume the generation-tx hash itself from
	///    `hashLink`;
	/// 4. pick the segwit or plain transaction Merkle link;
	/// 5. fold that hash up to the block Merkle root;
	/// 6. hash the resulting block header;
	/// 7. check the declared target is no looser than the configured
	///    maximum;
	/// 8. check the configured proof-of-work function applied to the
	///    header beats that target.
	pub fn validate(&self) -> Result<Hash, ShareError> {
		let info = version_info(self.share_version)?;
		self.validate_refs(info)?;

		// Step 2: the payout script is computed because it is part of what
		// this share commits to via the gentx hash below; it has no
		// further check of its own here.
		let _ = self.new_script();

		let share_info_bytes = crate::ser::ser_vec(&self.share_info)?;
		let mut leaf_preimage = identifier().to_vec();
		leaf_preimage.extend_from_slice(&share_info_bytes);
		let leaf = sha256d(&leaf_preimage);
		let ref_hash = aggregate(leaf, &self.ref_merkle_link, |c, n| pair_hash(&c, &n));

		let mut gentx_suffix = Vec::with_capacity(44);
		gentx_suffix.extend_from_slice(ref_hash.as_bytes());
		gentx_suffix.extend_from_slice(&self.last_txout_nonce.to_le_bytes());
		gentx_suffix.extend_from_slice(&[0u8; 4]);
		let gentx_hash = self.hash_link.check(&gentx_suffix, info.gentx_prefix_len)?;

		let segwit_active = self.share_version >= segwit_activation_version();
		let chosen_link: &[Hash] = match &self.share_info.segwit {
			Some(segwit) if segwit_active && !segwit.txid_merkle_link.is_empty() => &segwit.txid_merkle_link,
			_ => &self.merkle_link,
		};
		let merkle_root = aggregate(gentx_hash, chosen_link, |c, n| pair_hash(&c, &n));

		let header_hash = self.header_hash(&merkle_root);

		let target = Target::from_bits(self.share_info.bits);
		if target.0 > configured_max_target() {
			return Err(ShareError::TargetTooLoose);
		}

		let pow_hash = pow_func()(&self.header_bytes(&merkle_root));
		if !target.is_met_by(&pow_hash) {
			return Err(ShareError::TargetNotMet);
		}

		Ok(header_hash)
	}

	fn header_bytes(&self, merkle_root: &Hash) -> Vec<u8> {
		let mut buf = crate::ser::ser_vec(&self.min_header).expect("header serialization cannot fail");
		buf.extend_from_slice(merkle_root.as_bytes());
		buf
	}

	/// The share's own identity hash: always `sha256d`, independent of
	/// whichever `PowFunc` this chain actually mines with.
	fn header_hash(&self, merkle_root: &Hash) -> Hash {
		sha256d(&self.header_bytes(merkle_root))
	}
}

fn pair_hash(left: &Hash, right: &Hash) -> Hash {
	let mut buf = Vec::with_capacity(64);
	buf.extend_from_slice(left.as_bytes());
	buf.extend_from_slice(right.as_bytes());
	sha256d(&buf)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn h(b: u8) -> Hash {
		Hash([b; 32])
	}

	fn sample_share_info(bits: u32) -> ShareInfo {
		ShareInfo {
			previous_share_hash: h(0),
			coinbase: vec![],
			nonce: 0,
			pubkey_hash: [0x42u8; 20],
			subsidy: 5_000_000_000,
			donation: 0,
			stale_info: 0,
			desired_version: 17,
			transaction_hash_refs: vec![],
			new_transaction_hashes: vec![],
			far_share_hash: None,
			bits,
			timestamp: 1_600_000_000,
			absheight: 1,
			abswork: 0,
			segwit: None,
		}
	}

	fn sample_share(bits: u32) -> Share {
		let hash_link = HashLink::from_prefix(GENTX_BEFORE_REFHASH);
		Share {
			share_version: 16,
			min_header: SmallBlockHeader {
				version: 1,
				previous_block: h(0),
				timestamp: 1_600_000_000,
				bits,
				nonce: 0,
			},
			share_info: sample_share_info(bits),
			ref_merkle_link: vec![],
			last_txout_nonce: 0,
			hash_link,
			merkle_link: vec![],
		}
	}

	#[test]
	fn gentx_prefix_length_invariant_holds() {
		assert_gentx_prefix_length();
	}

	#[test]
	fn gentx_before_refhash_matches_the_required_literal() {
		let literal = "434104ffd03de44a6e11b9917f3a29f9443283d9871c9d743ef30d5eddcd37094b64d1b3d8090496b53256786bf5c82932ec23c3b74d9f05a6f95a8b5529352656664bac00000000000000002a6a28";
		let bytes: Vec<u8> = (0..literal.len())
			.step_by(2)
			.map(|i| u8::from_str_radix(&literal[i..i + 2], 16).unwrap())
			.collect();
		assert_eq!(GENTX_BEFORE_REFHASH, bytes.as_slice());
	}

	#[test]
	fn duplicate_zero_share_count_refs_are_rejected() {
		let mut share = sample_share(0x1d00ffff);
		share.share_info.transaction_hash_refs = vec![(0, 3), (0, 3)];
		let err = share.validate().unwrap_err();
		assert!(matches!(err, ShareError::DuplicateTxRef(1)));
	}

	#[test]
	fn share_count_ceiling_is_enforced() {
		let mut share = sample_share(0x1d00ffff);
		share.share_info.transaction_hash_refs = vec![(110, 0)];
		let err = share.validate().unwrap_err();
		assert!(matches!(err, ShareError::RefShareCountTooLarge(0)));
	}

	#[test]
	fn ref_count_must_match_new_transaction_hashes() {
		let mut share = sample_share(0x1d00ffff);
		share.share_info.new_transaction_hashes = vec![h(9)];
		// No (0, *) ref at all, so the dedup set is empty: 0 != 1.
		let err = share.validate().unwrap_err();
		assert!(matches!(err, ShareError::TxRefCountMismatch { refs: 0, new_tx_hashes: 1 }));
	}

	#[test]
	fn target_looser_than_configured_maximum_is_rejected() {
		// 0x207fffff decodes to a far larger (looser) target than the
		// default 0x1d00ffff maximum; rejected at step 7 regardless of the
		// hash link or merkle content.
		let share = sample_share(0x207fffff);
		let err = share.validate().unwrap_err();
		assert!(matches!(err, ShareError::TargetTooLoose));
	}

	#[test]
	fn unsupported_version_is_rejected() {
		let mut share = sample_share(0x1d00ffff);
		share.share_version = 99;
		let err = share.validate().unwrap_err();
		assert!(matches!(err, ShareError::UnsupportedVersion(99)));
	}

	#[test]
	fn serialize_then_parse_round_trips() {
		let share = sample_share(0x1d00ffff);
		let bytes = crate::ser::ser_vec(&share).unwrap();
		let mut cursor = &bytes[..];
		let parsed = Share::parse(&mut cursor, share.share_version).unwrap();
		assert_eq!(parsed, share);
		assert_eq!(crate::ser::ser_vec(&parsed).unwrap(), bytes);
	}

	#[test]
	fn segwit_substructure_round_trips_when_activated() {
		let mut share = sample_share(0x1d00ffff);
		share.share_version = 17; // >= default SEGWIT_ACTIVATION_VERSION
		share.share_info.segwit = Some(SegwitInfo {
			txid_merkle_link: vec![h(5), h(6)],
			txid_merkle_link_index: 0,
			witness_reserved_value: [0x11u8; 32],
		});
		let bytes = crate::ser::ser_vec(&share).unwrap();
		let mut cursor = &bytes[..];
		let parsed = Share::parse(&mut cursor, share.share_version).unwrap();
		assert_eq!(parsed, share);
	}
}
