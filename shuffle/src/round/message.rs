//! message.rs - shuffle round wire messages and their positional codec.

//
// Copyright (c) 2021 Cloak Network
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Every payload is laid out positionally: a 4-byte little-endian tag, the
// 32-byte round id, then the fields in declaration order. Variable-length
// byte fields carry a 4-byte little-endian length; vectors a 4-byte count.
// The trailing signature of the wire framing is *not* part of the payload;
// it is split off at the dispatch boundary before decoding.

use crate::error::ShuffleError;
use crate::group::{Id, ID_SIZE};
use byteorder::{ByteOrder, LittleEndian};
use cloak_crypto::hash::{Hash, HASH_SIZE};
use std::fmt;

pub const TAG_PUBLIC_KEYS: u32 = 0;
pub const TAG_DATA: u32 = 1;
pub const TAG_SHUFFLE_DATA: u32 = 2;
pub const TAG_ENCRYPTED_DATA: u32 = 3;
pub const TAG_GO: u32 = 4;
pub const TAG_NO_GO: u32 = 5;
pub const TAG_PRIVATE_KEY: u32 = 6;
pub const TAG_BLAME_DATA: u32 = 7;
pub const TAG_BLAME_VERIFICATION: u32 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShufflePayload {
    PublicKeys {
        inner_key: Vec<u8>,
        outer_key: Vec<u8>,
    },
    Data {
        ciphertext: Vec<u8>,
    },
    ShuffleData {
        blocks: Vec<Vec<u8>>,
    },
    EncryptedData {
        blocks: Vec<Vec<u8>>,
    },
    Go {
        broadcast_hash: Hash,
    },
    NoGo,
    PrivateKey {
        key: Vec<u8>,
    },
    BlameData {
        key: Vec<u8>,
        log: Vec<u8>,
        signature: Vec<u8>,
    },
    BlameVerification {
        blame_hashes: Vec<Vec<u8>>,
        blame_signatures: Vec<Vec<u8>>,
    },
}

impl ShufflePayload {
    pub fn tag(&self) -> u32 {
        match self {
            ShufflePayload::PublicKeys { .. } => TAG_PUBLIC_KEYS,
            ShufflePayload::Data { .. } => TAG_DATA,
            ShufflePayload::ShuffleData { .. } => TAG_SHUFFLE_DATA,
            ShufflePayload::EncryptedData { .. } => TAG_ENCRYPTED_DATA,
            ShufflePayload::Go { .. } => TAG_GO,
            ShufflePayload::NoGo => TAG_NO_GO,
            ShufflePayload::PrivateKey { .. } => TAG_PRIVATE_KEY,
            ShufflePayload::BlameData { .. } => TAG_BLAME_DATA,
            ShufflePayload::BlameVerification { .. } => TAG_BLAME_VERIFICATION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShufflePayload::PublicKeys { .. } => "PublicKeys",
            ShufflePayload::Data { .. } => "Data",
            ShufflePayload::ShuffleData { .. } => "ShuffleData",
            ShufflePayload::EncryptedData { .. } => "EncryptedData",
            ShufflePayload::Go { .. } => "Go",
            ShufflePayload::NoGo => "NoGo",
            ShufflePayload::PrivateKey { .. } => "PrivateKey",
            ShufflePayload::BlameData { .. } => "BlameData",
            ShufflePayload::BlameVerification { .. } => "BlameVerification",
        }
    }

    pub fn encode(&self, round_id: &Id) -> Vec<u8> {
        let mut out = Vec::new();
        put_u32(&mut out, self.tag());
        out.extend_from_slice(round_id.base_vector());
        match self {
            ShufflePayload::PublicKeys {
                inner_key,
                outer_key,
            } => {
                put_bytes(&mut out, inner_key);
                put_bytes(&mut out, outer_key);
            }
            ShufflePayload::Data { ciphertext } => {
                put_bytes(&mut out, ciphertext);
            }
            ShufflePayload::ShuffleData { blocks }
            | ShufflePayload::EncryptedData { blocks } => {
                put_blocks(&mut out, blocks);
            }
            ShufflePayload::Go { broadcast_hash } => {
                out.extend_from_slice(&broadcast_hash.to_bytes());
            }
            ShufflePayload::NoGo => {}
            ShufflePayload::PrivateKey { key } => {
                put_bytes(&mut out, key);
            }
            ShufflePayload::BlameData {
                key,
                log,
                signature,
            } => {
                put_bytes(&mut out, key);
                put_bytes(&mut out, log);
                put_bytes(&mut out, signature);
            }
            ShufflePayload::BlameVerification {
                blame_hashes,
                blame_signatures,
            } => {
                put_blocks(&mut out, blame_hashes);
                put_blocks(&mut out, blame_signatures);
            }
        }
        out
    }

    pub fn decode(buf: &[u8]) -> Result<(Id, ShufflePayload), ShuffleError> {
        let mut reader = Reader::new(buf);
        let tag = reader.read_u32()?;
        let round_id = Id::try_from_bytes(reader.read_exact(ID_SIZE)?)?;
        let payload = match tag {
            TAG_PUBLIC_KEYS => ShufflePayload::PublicKeys {
                inner_key: reader.read_bytes()?,
                outer_key: reader.read_bytes()?,
            },
            TAG_DATA => ShufflePayload::Data {
                ciphertext: reader.read_bytes()?,
            },
            TAG_SHUFFLE_DATA => ShufflePayload::ShuffleData {
                blocks: reader.read_blocks()?,
            },
            TAG_ENCRYPTED_DATA => ShufflePayload::EncryptedData {
                blocks: reader.read_blocks()?,
            },
            TAG_GO => {
                let raw = reader.read_exact(HASH_SIZE)?;
                let broadcast_hash = Hash::try_from_bytes(raw)
                    .map_err(|e| ShuffleError::MalformedMessage(format!("{}", e)))?;
                ShufflePayload::Go { broadcast_hash }
            }
            TAG_NO_GO => ShufflePayload::NoGo,
            TAG_PRIVATE_KEY => ShufflePayload::PrivateKey {
                key: reader.read_bytes()?,
            },
            TAG_BLAME_DATA => ShufflePayload::BlameData {
                key: reader.read_bytes()?,
                log: reader.read_bytes()?,
                signature: reader.read_bytes()?,
            },
            TAG_BLAME_VERIFICATION => ShufflePayload::BlameVerification {
                blame_hashes: reader.read_blocks()?,
                blame_signatures: reader.read_blocks()?,
            },
            other => return Err(ShuffleError::UnknownMessageType(other)),
        };
        Ok((round_id, payload))
    }
}

impl fmt::Display for ShufflePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShufflePayload::ShuffleData { blocks } => {
                write!(f, "ShuffleData({} blocks)", blocks.len())
            }
            ShufflePayload::EncryptedData { blocks } => {
                write!(f, "EncryptedData({} blocks)", blocks.len())
            }
            ShufflePayload::Go { broadcast_hash } => write!(f, "Go({})", broadcast_hash),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// The byte string a member signs when revealing its blame evidence:
/// `(BlameData tag, round id, material)`, where the material is the hash
/// over the revealed key and log. Cross-verification re-wraps a peer's
/// *claim bytes* with the same layout.
pub fn blame_proof(round_id: &Id, material: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, TAG_BLAME_DATA);
    out.extend_from_slice(round_id.base_vector());
    put_bytes(&mut out, material);
    out
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    let mut raw = [0u8; 4];
    LittleEndian::write_u32(&mut raw, value);
    out.extend_from_slice(&raw);
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}

fn put_blocks(out: &mut Vec<u8>, blocks: &[Vec<u8>]) {
    put_u32(out, blocks.len() as u32);
    for block in blocks {
        put_bytes(out, block);
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Reader<'a> {
        Reader { buf, pos: 0 }
    }

    fn read_exact(&mut self, len: usize) -> Result<&'a [u8], ShuffleError> {
        if self.buf.len() < self.pos + len {
            return Err(ShuffleError::TruncatedMessage);
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, ShuffleError> {
        let raw = self.read_exact(4)?;
        Ok(LittleEndian::read_u32(raw))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, ShuffleError> {
        let len = self.read_u32()? as usize;
        Ok(self.read_exact(len)?.to_vec())
    }

    fn read_blocks(&mut self) -> Result<Vec<Vec<u8>>, ShuffleError> {
        let count = self.read_u32()? as usize;
        let mut blocks = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            blocks.push(self.read_bytes()?);
        }
        Ok(blocks)
    }
}
