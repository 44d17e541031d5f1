//! mod.rs - hashing with SHA3-256.

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

use crate::utils::u8v_to_typed_str;
use crate::CryptoError;
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::hash as stdhash;

pub const HASH_SIZE: usize = 32;

/// A SHA3-256 digest.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// One-shot digest of any hashable value.
    pub fn digest<T: Hashable + ?Sized>(value: &T) -> Hash {
        let mut state = Hasher::new();
        value.hash(&mut state);
        state.result()
    }

    /// One-shot digest of a raw byte vector.
    pub fn from_vector(msg: &[u8]) -> Hash {
        let mut state = Hasher::new();
        state.input(msg);
        state.result()
    }

    pub fn base_vector(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Hash, CryptoError> {
        if bytes.len() != HASH_SIZE {
            return Err(CryptoError::InvalidBinaryLength(HASH_SIZE, bytes.len()));
        }
        let mut h = [0u8; HASH_SIZE];
        h.copy_from_slice(bytes);
        Ok(Hash(h))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8v_to_typed_str("H", self.base_vector()))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl stdhash::Hash for Hash {
    fn hash<H: stdhash::Hasher>(&self, state: &mut H) {
        stdhash::Hash::hash(&self.0, state);
    }
}

/// Incremental hashing state.
pub struct Hasher {
    inner: Sha3_256,
}

impl Hasher {
    pub fn new() -> Hasher {
        Hasher {
            inner: Sha3_256::new(),
        }
    }

    pub fn input(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn result(self) -> Hash {
        let out = self.inner.finalize();
        let mut h = [0u8; HASH_SIZE];
        h.copy_from_slice(&out[..HASH_SIZE]);
        Hash(h)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Hasher::new()
    }
}

/// Anything that can be fed into a `Hasher`.
pub trait Hashable {
    fn hash(&self, state: &mut Hasher);
}

impl Hashable for [u8] {
    fn hash(&self, state: &mut Hasher) {
        state.input(self);
    }
}

impl Hashable for Vec<u8> {
    fn hash(&self, state: &mut Hasher) {
        state.input(self);
    }
}

impl Hashable for str {
    fn hash(&self, state: &mut Hasher) {
        state.input(self.as_bytes());
    }
}

impl Hashable for Hash {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.0);
    }
}

impl Hashable for u8 {
    fn hash(&self, state: &mut Hasher) {
        state.input(&[*self]);
    }
}

impl Hashable for u16 {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.to_le_bytes());
    }
}

impl Hashable for u32 {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.to_le_bytes());
    }
}

impl Hashable for u64 {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.to_le_bytes());
    }
}

impl Hashable for usize {
    fn hash(&self, state: &mut Hasher) {
        (*self as u64).hash(state);
    }
}
