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

use std::io;

use spool_core::ser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("serialization error: {0}")]
	Serialization(#[from] ser::Error),
	#[error("connection error: {0}")]
	Connection(#[from] io::Error),
	#[error("peer closed the connection")]
	ConnectionClose,
	#[error("peer protocol version mismatch: us {us}, peer {peer}")]
	ProtocolMismatch { us: u32, peer: u32 },
	#[error("peer sent a message violating the gossip protocol: {0}")]
	ProtocolViolation(String),
	#[error("unknown peer tag {0}")]
	UnknownPeer(String),
}
