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

//! A persisted SHA-256 midstate, so a share does not have to re-hash the
//! coinbase prefix it shares with every other share built on the same
//! generation transaction skeleton. The prefix is hashed once up front; only
//! the resulting midstate travels with the share.

use sha2::digest::generic_array::GenericArray;
use sha2::{compress256, Digest, Sha256};
use thiserror::Error;

use crate::hash::Hash;
use crate::ser::{Error as SerError, Reader, Writeable, Writer};

/// SHA-256's standard initial hash values.
const IV: [u32; 8] = [
	0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashLinkError {
	#[error("hash link length does not align with the expected prefix length")]
	PrefixLengthMismatch,
}

/// A SHA-256 midstate: the 32-byte compression state after hashing some
/// whole number of 64-byte blocks, an 8-byte counter of how many bytes that
/// represents, and the unhashed remainder (< 64 bytes) that did not
/// complete a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashLink {
	pub state: [u32; 8],
	pub length: u64,
	pub tail: Vec<u8>,
}

impl HashLink {
	/// The empty link: no bytes hashed yet.
	pub fn new() -> HashLink {
		HashLink {
			state: IV,
			length: 0,
			tail: Vec::new(),
		}
	}

	/// Builds a link representing the state of hashing `prefix`, compressing
	/// every whole 64-byte block and keeping the remainder as `tail`.
	pub fn from_prefix(prefix: &[u8]) -> HashLink {
		let mut state = IV;
		let mut offset = 0usize;
		while prefix.len() - offset >= 64 {
			let block = GenericArray::clone_from_slice(&prefix[offset..offset + 64]);
			compress256(&mut state, &[block]);
			offset += 64;
		}
		HashLink {
			state,
			length: offset as u64,
			tail: prefix[offset..].to_vec(),
		}
	}

	/// Verifies that this link was produced by hashing a prefix of length
	/// `expected_prefix_len`, then resumes hashing `suffix` and returns
	/// `sha256d(expected_prefix || suffix)`.
	pub fn check(&self, suffix: &[u8], expected_prefix_len: usize) -> Result<Hash, HashLinkError> {
		let lhs = self.length as i128 - self.tail.len() as i128 + expected_prefix_len as i128;
		if lhs.rem_euclid(64) != 0 {
			return Err(HashLinkError::PrefixLengthMismatch);
		}

		let mut state = self.state;
		let mut message = self.tail.clone();
		message.extend_from_slice(suffix);
		let total_len_bits = (self.length + message.len() as u64) * 8;

		message.push(0x80);
		while message.len() % 64 != 56 {
			message.push(0);
		}
		message.extend_from_slice(&total_len_bits.to_be_bytes());

		for chunk in message.chunks(64) {
			let block = GenericArray::clone_from_slice(chunk);
			compress256(&mut state, &[block]);
		}

		let mut first = [0u8; 32];
		for (i, word) in state.iter().enumerate() {
			first[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
		}
		let second = Sha256::digest(&first);
		Ok(Hash::from_slice(&second))
	}
}

impl Default for HashLink {
	fn default() -> HashLink {
		HashLink::new()
	}
}

impl Writeable for HashLink {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), SerError> {
		for word in &self.state {
			writer.write_fixed_bytes(&word.to_be_bytes())?;
		}
		writer.write_u64(self.length)?;
		writer.write_var_bytes(&self.tail)
	}
}

impl HashLink {
	pub fn read<R: Reader>(reader: &mut R) -> Result<HashLink, SerError> {
		let mut state = [0u32; 8];
		for word in state.iter_mut() {
			let bytes = reader.read_fixed_bytes(4)?;
			*word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
		}
		let length = reader.read_u64()?;
		let tail = reader.read_var_bytes()?;
		Ok(HashLink { state, length, tail })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resumed_hash_matches_direct_sha256d() {
		let prefix = b"the quick brown fox jumps over the lazy dog, repeated a few times to cross a block boundary nicely";
		let suffix = b" -- and the suffix";

		let link = HashLink::from_prefix(prefix);
		let resumed = link.check(suffix, prefix.len()).unwrap();

		let mut full = prefix.to_vec();
		full.extend_from_slice(suffix);
		let direct = crate::hash::sha256d(&full);

		assert_eq!(resumed, direct);
	}

	#[test]
	fn mismatched_prefix_length_fails() {
		let prefix = b"short prefix";
		let link = HashLink::from_prefix(prefix);
		// Off by a handful of bytes from the real prefix length: the modular
		// check should reject it before any hashing is attempted.
		let err = link.check(b"suffix", prefix.len() + 3).unwrap_err();
		assert_eq!(err, HashLinkError::PrefixLengthMismatch);
	}

	#[test]
	fn empty_prefix_resumes_correctly() {
		let link = HashLink::new();
		let suffix = b"all of the data";
		let resumed = link.check(suffix, 0).unwrap();
		let direct = crate::hash::sha256d(suffix);
		assert_eq!(resumed, direct);
	}
}
