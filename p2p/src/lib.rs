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

//! Peer gossip for the share chain: a small wire protocol for announcing
//! and withdrawing transaction awareness between directly-connected peers,
//! and a coordinator that turns block-template and mempool changes into
//! outbound gossip.

pub mod coordinator;
pub mod error;
pub mod msg;
pub mod node;

pub use coordinator::Coordinator;
pub use error::Error;
pub use msg::{Message, PROTOCOL_VERSION};
pub use node::Node;
