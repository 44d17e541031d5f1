//! group.rs - member identities and the ordered group view.

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

use crate::error::ShuffleError;
use cloak_crypto::hash::{Hashable, Hasher};
use cloak_crypto::sig;
use cloak_crypto::utils::u8v_to_hexstr;
use rand::{thread_rng, RngCore};
use std::fmt;

pub const ID_SIZE: usize = 32;

/// Opaque identity of a group member, a session, or a round. The all-zero
/// id is a sentinel meaning "no such member" and never names a real peer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; ID_SIZE]);

impl Id {
    pub fn zero() -> Id {
        Id([0u8; ID_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_SIZE]
    }

    pub fn random() -> Id {
        let mut raw = [0u8; ID_SIZE];
        thread_rng().fill_bytes(&mut raw);
        Id(raw)
    }

    pub fn from_bytes(raw: [u8; ID_SIZE]) -> Id {
        Id(raw)
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Id, ShuffleError> {
        if bytes.len() != ID_SIZE {
            return Err(ShuffleError::MalformedMessage(format!(
                "bad id length: {}",
                bytes.len()
            )));
        }
        let mut raw = [0u8; ID_SIZE];
        raw.copy_from_slice(bytes);
        Ok(Id(raw))
    }

    pub fn base_vector(&self) -> &[u8] {
        &self.0
    }
}

impl Hashable for Id {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.0);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8v_to_hexstr(&self.0[..4]))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", u8v_to_hexstr(&self.0))
    }
}

/// The fixed, ordered membership of one round. Index 0 is the head of the
/// shuffle cascade, index N-1 the tail. The view is immutable for the
/// lifetime of the round.
pub struct Group {
    members: Vec<(Id, sig::PublicKey)>,
}

impl Group {
    pub fn new(members: Vec<(Id, sig::PublicKey)>) -> Group {
        assert!(!members.is_empty(), "a group must have members");
        assert!(
            members.iter().all(|(id, _)| !id.is_zero()),
            "the zero id is reserved"
        );
        Group { members }
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn index(&self, id: &Id) -> Option<usize> {
        self.members.iter().position(|(m, _)| m == id)
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.index(id).is_some()
    }

    pub fn id(&self, index: usize) -> &Id {
        &self.members[index].0
    }

    pub fn key(&self, id: &Id) -> Option<&sig::PublicKey> {
        self.members
            .iter()
            .find(|(m, _)| m == id)
            .map(|(_, key)| key)
    }

    pub fn key_by_index(&self, index: usize) -> &sig::PublicKey {
        &self.members[index].1
    }

    /// Successor in cascade order, or the zero sentinel for the tail.
    pub fn next(&self, id: &Id) -> Id {
        match self.index(id) {
            Some(idx) if idx + 1 < self.members.len() => self.members[idx + 1].0.clone(),
            _ => Id::zero(),
        }
    }

    /// Predecessor in cascade order, or the zero sentinel for the head.
    pub fn previous(&self, id: &Id) -> Id {
        match self.index(id) {
            Some(idx) if idx > 0 => self.members[idx - 1].0.clone(),
            _ => Id::zero(),
        }
    }
}
