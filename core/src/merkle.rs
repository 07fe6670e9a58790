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

//! Bitcoin-style Merkle tree construction and proof ("link") extraction.

use crate::hash::{sha256d, Hash, ZERO_HASH};

/// A built Merkle tree: the root hash and every layer flattened into one
/// list, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
	pub root: Hash,
	pub data: Vec<Hash>,
}

fn pair_hash(left: &Hash, right: &Hash) -> Hash {
	let mut buf = Vec::with_capacity(64);
	buf.extend_from_slice(left.as_bytes());
	buf.extend_from_slice(right.as_bytes());
	sha256d(&buf)
}

/// Builds a Merkle tree from a list of leaf hashes.
///
/// An empty list yields a zero root with no layer data. A single-element
/// list yields that element as the root. Otherwise, pairs are double-SHA256
/// combined layer by layer; an odd trailing element is duplicated, the
/// standard Bitcoin rule.
pub fn build_merkle_tree(items: &[Hash]) -> MerkleTree {
	if items.is_empty() {
		return MerkleTree {
			root: ZERO_HASH,
			data: Vec::new(),
		};
	}
	if items.len() == 1 {
		return MerkleTree {
			root: items[0],
			data: items.to_vec(),
		};
	}

	let mut data = items.to_vec();
	let mut layer = items.to_vec();
	while layer.len() > 1 {
		if layer.len() % 2 == 1 {
			let last = *layer.last().unwrap();
			layer.push(last);
		}
		let mut next = Vec::with_capacity(layer.len() / 2);
		for pair in layer.chunks(2) {
			next.push(pair_hash(&pair[0], &pair[1]));
		}
		data.extend_from_slice(&next);
		layer = next;
	}

	MerkleTree {
		root: layer[0],
		data,
	}
}

/// Returns the sibling hashes along the path from `items[index]` to the
/// root. Replaying `aggregate(items[index], link, |c, n| sha256d(c||n))`
/// reproduces `build_merkle_tree(items).root`.
pub fn merkle_link(items: &[Hash], index: usize) -> Vec<Hash> {
	assert!(index < items.len(), "merkle_link index out of range");

	let mut link = Vec::new();
	let mut layer = items.to_vec();
	let mut idx = index;

	while layer.len() > 1 {
		if layer.len() % 2 == 1 {
			let last = *layer.last().unwrap();
			layer.push(last);
		}
		let sibling_idx = idx ^ 1;
		link.push(layer[sibling_idx]);

		let mut next = Vec::with_capacity(layer.len() / 2);
		for pair in layer.chunks(2) {
			next.push(pair_hash(&pair[0], &pair[1]));
		}
		layer = next;
		idx /= 2;
	}

	link
}

/// Replays a Merkle link starting from `leaf`, combining with each sibling
/// in turn via `combine`. The share-chain convention always places the
/// running hash on the left and the sibling on the right (the coinbase
/// transaction is always leaf index 0).
pub fn aggregate(leaf: Hash, link: &[Hash], combine: impl Fn(Hash, Hash) -> Hash) -> Hash {
	link.iter().fold(leaf, |current, sibling| combine(current, *sibling))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn h(b: u8) -> Hash {
		Hash([b; 32])
	}

	#[test]
	fn empty_input_is_zero_root() {
		let tree = build_merkle_tree(&[]);
		assert_eq!(tree.root, ZERO_HASH);
		assert!(tree.data.is_empty());
	}

	#[test]
	fn single_input_is_identity() {
		let leaf = h(7);
		let tree = build_merkle_tree(&[leaf]);
		assert_eq!(tree.root, leaf);
	}

	#[test]
	fn link_reconstructs_root() {
		let items = vec![h(1), h(2), h(3)];
		let tree = build_merkle_tree(&items);
		for (i, leaf) in items.iter().enumerate() {
			let link = merkle_link(&items, i);
			let root = aggregate(*leaf, &link, |c, n| pair_hash(&c, &n));
			assert_eq!(root, tree.root);
		}
	}

	#[test]
	fn odd_count_duplicates_last() {
		let items = vec![h(1), h(2), h(3)];
		let tree = build_merkle_tree(&items);
		let manual_top = pair_hash(&pair_hash(&h(1), &h(2)), &pair_hash(&h(3), &h(3)));
		assert_eq!(tree.root, manual_top);
	}
}
