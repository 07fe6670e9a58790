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

//! Hex encode/decode helpers, plus the "display" convention used for
//! share and block hashes: little-endian internally, big-endian (i.e.
//! byte-reversed) when printed.

/// Encode bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
	hex::encode(bytes)
}

/// Decode a hex string (optionally "0x"-prefixed) into bytes.
pub fn from_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
	let trimmed = s.strip_prefix("0x").unwrap_or(s);
	hex::decode(trimmed)
}

/// Hex-encode a byte slice after reversing it, the convention used to
/// display little-endian internal hashes in big-endian "display" form.
pub fn to_hex_reversed(bytes: &[u8]) -> String {
	let mut reversed = bytes.to_vec();
	reversed.reverse();
	to_hex(&reversed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let bytes = vec![0xde, 0xad, 0xbe, 0xef];
		let s = to_hex(&bytes);
		assert_eq!(s, "deadbeef");
		assert_eq!(from_hex(&s).unwrap(), bytes);
		assert_eq!(from_hex("0xdeadbeef").unwrap(), bytes);
	}

	#[test]
	fn reversed_display() {
		let bytes = vec![0x01, 0x02, 0x03];
		assert_eq!(to_hex_reversed(&bytes), "030201");
	}
}
