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

//! Share-chain primitives shared by the peer coordinator and the task
//! constructor: hashing and binary codec, Merkle trees, the resumable
//! `HashLink` midstate, proof-of-work targets, transaction templates and
//! the share record itself.

pub mod hash;
pub mod hashlink;
pub mod merkle;
pub mod ser;
pub mod share;
pub mod target;
pub mod tx;

pub use hash::{hash160, hash160_to_script, sha256d, Hash, ZERO_HASH};
pub use hashlink::{HashLink, HashLinkError};
pub use merkle::{aggregate, build_merkle_tree, merkle_link, MerkleTree};
pub use share::{configure as configure_share, PowFunc, SegwitInfo, Share, ShareError, ShareInfo, SmallBlockHeader, GENTX_BEFORE_REFHASH};
pub use target::Target;
pub use tx::{AuxChainTip, BlockTemplate, TransactionTemplate, TxKey};

/// Validates process-wide invariants the share-chain format depends on.
/// Call once at startup before parsing or constructing any share.
pub fn assert_invariants() {
	share::assert_gentx_prefix_length();
}
