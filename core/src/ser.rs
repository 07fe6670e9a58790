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

//! Binary serialization and deserialization layer specialized for the
//! share-chain wire format: little-endian fixed-width integers, Bitcoin
//! "compact size" varints, varstrings, and 32-byte hash lists.
//!
//! Implement `Writeable`/`Readable` on a type and use `serialize`/
//! `deserialize` to move it to and from any `std::io::{Write, Read}`.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_bigint::BigUint;
use thiserror::Error;

use crate::hash::Hash;

/// Errors deriving from serializing or deserializing share-chain data.
#[derive(Debug, Error)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("expected {expected:?}, received {received:?}")]
	UnexpectedData { expected: Vec<u8>, received: Vec<u8> },
	#[error("data exceeded a sanity limit: {0}")]
	TooLarge(String),
	#[error("corrupted data: {0}")]
	Corrupted(String),
}

/// Writes binary-serializable types to an underlying `Write`.
pub trait Writer {
	fn write_u8(&mut self, n: u8) -> Result<(), Error>;
	fn write_u16(&mut self, n: u16) -> Result<(), Error>;
	fn write_u32(&mut self, n: u32) -> Result<(), Error>;
	fn write_u64(&mut self, n: u64) -> Result<(), Error>;
	/// Writes raw bytes verbatim, with no length prefix.
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
	/// Bitcoin "compact size" varint.
	fn write_varint(&mut self, n: u64) -> Result<(), Error>;
	/// varint length prefix followed by the bytes themselves.
	fn write_var_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.write_varint(bytes.len() as u64)?;
		self.write_fixed_bytes(bytes)
	}
	/// varint count followed by that many 32-byte hashes.
	fn write_hash_list(&mut self, hashes: &[Hash]) -> Result<(), Error> {
		self.write_varint(hashes.len() as u64)?;
		for h in hashes {
			self.write_fixed_bytes(h.as_bytes())?;
		}
		Ok(())
	}
	/// A little-endian big integer, zero-padded (or truncated) to `width`
	/// bytes.
	fn write_bigint_le(&mut self, n: &BigUint, width: usize) -> Result<(), Error> {
		let mut bytes = n.to_bytes_le();
		bytes.resize(width, 0);
		self.write_fixed_bytes(&bytes)
	}
}

/// Reads binary-serialized types from an underlying `Read`.
pub trait Reader {
	fn read_u8(&mut self) -> Result<u8, Error>;
	fn read_u16(&mut self) -> Result<u16, Error>;
	fn read_u32(&mut self) -> Result<u32, Error>;
	fn read_u64(&mut self) -> Result<u64, Error>;
	fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error>;
	fn read_varint(&mut self) -> Result<u64, Error>;
	fn read_var_bytes(&mut self) -> Result<Vec<u8>, Error> {
		let len = self.read_varint()?;
		if len > MAX_VAR_BYTES {
			return Err(Error::TooLarge(format!("var_bytes length {}", len)));
		}
		self.read_fixed_bytes(len as usize)
	}
	fn read_hash(&mut self) -> Result<Hash, Error> {
		let bytes = self.read_fixed_bytes(32)?;
		Ok(Hash::from_slice(&bytes))
	}
	fn read_hash_list(&mut self) -> Result<Vec<Hash>, Error> {
		let count = self.read_varint()?;
		if count > MAX_HASH_LIST {
			return Err(Error::TooLarge(format!("hash list length {}", count)));
		}
		(0..count).map(|_| self.read_hash()).collect()
	}
	fn read_bigint_le(&mut self, width: usize) -> Result<BigUint, Error> {
		let bytes = self.read_fixed_bytes(width)?;
		Ok(BigUint::from_bytes_le(&bytes))
	}
}

/// Sanity caps against malformed or hostile input; not protocol constants.
const MAX_VAR_BYTES: u64 = 10_000_000;
const MAX_HASH_LIST: u64 = 1_000_000;

/// Trait for types that know how to write themselves in the wire format.
pub trait Writeable {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error>;
}

/// Trait for types that know how to read themselves from the wire format.
pub trait Readable: Sized {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error>;
}

/// Serializes a `Writeable` into any `std::io::Write`.
pub fn serialize<W: Write, T: Writeable>(sink: &mut W, thing: &T) -> Result<(), Error> {
	let mut writer = BinWriter { sink };
	thing.write(&mut writer)
}

/// Serializes a `Writeable` into an in-memory byte vector.
pub fn ser_vec<T: Writeable>(thing: &T) -> Result<Vec<u8>, Error> {
	let mut vec = Vec::new();
	serialize(&mut vec, thing)?;
	Ok(vec)
}

/// Deserializes a `Readable` from any `std::io::Read`.
pub fn deserialize<R: Read, T: Readable>(source: &mut R) -> Result<T, Error> {
	let mut reader = BinReader { source };
	T::read(&mut reader)
}

struct BinWriter<'a, W: Write> {
	sink: &'a mut W,
}

impl<'a, W: Write> Writer for BinWriter<'a, W> {
	fn write_u8(&mut self, n: u8) -> Result<(), Error> {
		Ok(self.sink.write_u8(n)?)
	}
	fn write_u16(&mut self, n: u16) -> Result<(), Error> {
		Ok(self.sink.write_u16::<LittleEndian>(n)?)
	}
	fn write_u32(&mut self, n: u32) -> Result<(), Error> {
		Ok(self.sink.write_u32::<LittleEndian>(n)?)
	}
	fn write_u64(&mut self, n: u64) -> Result<(), Error> {
		Ok(self.sink.write_u64::<LittleEndian>(n)?)
	}
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		Ok(self.sink.write_all(bytes)?)
	}
	fn write_varint(&mut self, n: u64) -> Result<(), Error> {
		if n < 0xfd {
			self.write_u8(n as u8)
		} else if n <= 0xffff {
			self.write_u8(0xfd)?;
			self.write_u16(n as u16)
		} else if n <= 0xffff_ffff {
			self.write_u8(0xfe)?;
			self.write_u32(n as u32)
		} else {
			self.write_u8(0xff)?;
			self.write_u64(n)
		}
	}
}

struct BinReader<'a, R: Read> {
	source: &'a mut R,
}

impl<'a, R: Read> Reader for BinReader<'a, R> {
	fn read_u8(&mut self) -> Result<u8, Error> {
		Ok(self.source.read_u8()?)
	}
	fn read_u16(&mut self) -> Result<u16, Error> {
		Ok(self.source.read_u16::<LittleEndian>()?)
	}
	fn read_u32(&mut self) -> Result<u32, Error> {
		Ok(self.source.read_u32::<LittleEndian>()?)
	}
	fn read_u64(&mut self) -> Result<u64, Error> {
		Ok(self.source.read_u64::<LittleEndian>()?)
	}
	fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
		let mut buf = vec![0u8; len];
		self.source.read_exact(&mut buf)?;
		Ok(buf)
	}
	fn read_varint(&mut self) -> Result<u64, Error> {
		let first = self.read_u8()?;
		match first {
			0xfd => Ok(self.read_u16()? as u64),
			0xfe => Ok(self.read_u32()? as u64),
			0xff => self.read_u64(),
			n => Ok(n as u64),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn varint_round_trip() {
		for n in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
			let mut buf = Vec::new();
			{
				let mut w = BinWriter { sink: &mut buf };
				w.write_varint(n).unwrap();
			}
			let mut cursor = &buf[..];
			let mut r = BinReader { source: &mut cursor };
			assert_eq!(r.read_varint().unwrap(), n);
		}
	}

	#[test]
	fn var_bytes_round_trip() {
		let data = vec![1u8, 2, 3, 4, 5];
		let mut buf = Vec::new();
		{
			let mut w = BinWriter { sink: &mut buf };
			w.write_var_bytes(&data).unwrap();
		}
		let mut cursor = &buf[..];
		let mut r = BinReader { source: &mut cursor };
		assert_eq!(r.read_var_bytes().unwrap(), data);
	}

	#[test]
	fn bigint_le_round_trip() {
		let n = BigUint::from(0x1234_5678_9abc_u64);
		let mut buf = Vec::new();
		{
			let mut w = BinWriter { sink: &mut buf };
			w.write_bigint_le(&n, 16).unwrap();
		}
		assert_eq!(buf.len(), 16);
		let mut cursor = &buf[..];
		let mut r = BinReader { source: &mut cursor };
		assert_eq!(r.read_bigint_le(16).unwrap(), n);
	}
}
