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

//! Hash primitives used pervasively for shares, transactions and blocks.
//!
//! A `Hash` is stored little-endian ("internal" form, as it appears on the
//! wire) and is printed big-endian ("display" form, i.e. byte-reversed hex),
//! matching the two conventions described for share and block hashes.

use std::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use spool_util::hex::to_hex_reversed;

/// A 32-byte hash, stored in little-endian wire order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

/// The all-zero hash, used as the aux Merkle root of an empty aux chain set
/// and as the Merkle root of an empty Merkle tree.
pub const ZERO_HASH: Hash = Hash([0u8; 32]);

impl Hash {
	pub fn from_slice(bytes: &[u8]) -> Hash {
		let mut a = [0u8; 32];
		let n = bytes.len().min(32);
		a[..n].copy_from_slice(&bytes[..n]);
		Hash(a)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn to_vec(&self) -> Vec<u8> {
		self.0.to_vec()
	}

	/// Hex encoding in "display" (big-endian) convention.
	pub fn to_hex(&self) -> String {
		to_hex_reversed(&self.0)
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hash({})", self.to_hex())
	}
}

/// Double SHA-256, the hash function used for shares, block headers and
/// generation transactions.
pub fn sha256d(data: &[u8]) -> Hash {
	let first = Sha256::digest(data);
	let second = Sha256::digest(&first);
	Hash::from_slice(&second)
}

/// hash160: RIPEMD160(SHA256(data)), used for the payout pubkey hash.
pub fn hash160(data: &[u8]) -> [u8; 20] {
	let sha = Sha256::digest(data);
	let ripe = Ripemd160::digest(&sha);
	let mut out = [0u8; 20];
	out.copy_from_slice(&ripe);
	out
}

/// OP_DUP OP_HASH160 <push 20> <h20> OP_EQUALVERIFY OP_CHECKSIG, the
/// standard P2PKH output script for a given pubkey hash.
pub fn hash160_to_script(h20: &[u8; 20]) -> Vec<u8> {
	let mut script = Vec::with_capacity(25);
	script.push(0x76); // OP_DUP
	script.push(0xa9); // OP_HASH160
	script.push(0x14); // push 20 bytes
	script.extend_from_slice(h20);
	script.push(0x88); // OP_EQUALVERIFY
	script.push(0xac); // OP_CHECKSIG
	script
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sha256d_matches_known_vector() {
		// sha256d("") per Bitcoin's genesis coinbase double-hash convention.
		let h = sha256d(b"");
		let single = Sha256::digest(Sha256::digest(b"").as_slice());
		assert_eq!(h.0, single.as_slice());
	}

	#[test]
	fn display_is_byte_reversed() {
		let mut raw = [0u8; 32];
		raw[0] = 0xaa;
		raw[31] = 0xbb;
		let h = Hash(raw);
		let displayed = h.to_hex();
		assert!(displayed.starts_with("bb"));
		assert!(displayed.ends_with("aa"));
	}

	#[test]
	fn p2pkh_script_shape() {
		let h20 = [0x42u8; 20];
		let script = hash160_to_script(&h20);
		assert_eq!(script.len(), 25);
		assert_eq!(script[0], 0x76);
		assert_eq!(script[1], 0xa9);
		assert_eq!(script[2], 0x14);
		assert_eq!(&script[3..23], &h20[..]);
		assert_eq!(script[23], 0x88);
		assert_eq!(script[24], 0xac);
	}
}
