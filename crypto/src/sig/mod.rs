//! mod.rs - long-term Ed25519 signing identities.

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

use crate::hash::{Hash, Hashable, Hasher};
use crate::utils::u8v_to_typed_str;
use crate::CryptoError;
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use std::fmt;

pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SECRET_KEY_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;

#[derive(Clone)]
pub struct SecretKey(ed25519_dalek::SigningKey);

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

/// Generate a fresh identity keypair.
pub fn make_random_keys() -> (SecretKey, PublicKey) {
    let skey = ed25519_dalek::SigningKey::generate(&mut OsRng);
    let pkey = PublicKey(skey.verifying_key());
    (SecretKey(skey), pkey)
}

/// Generate a keypair from a seed. Only for tests and tools; real
/// identities must use `make_random_keys`.
pub fn make_deterministic_keys(seed: &[u8]) -> (SecretKey, PublicKey) {
    let seed = Hash::from_vector(seed).to_bytes();
    let skey = ed25519_dalek::SigningKey::from_bytes(&seed);
    let pkey = PublicKey(skey.verifying_key());
    (SecretKey(skey), pkey)
}

/// Sign a raw message with the identity key.
pub fn sign(skey: &SecretKey, msg: &[u8]) -> Signature {
    Signature(skey.0.sign(msg))
}

/// Check a signature over a raw message.
pub fn validate_sig(pkey: &PublicKey, msg: &[u8], sig: &Signature) -> Result<(), CryptoError> {
    pkey.0
        .verify(msg, &sig.0)
        .map_err(|_| CryptoError::BadSignature)
}

impl SecretKey {
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<SecretKey, CryptoError> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(CryptoError::InvalidBinaryLength(
                SECRET_KEY_SIZE,
                bytes.len(),
            ));
        }
        let mut raw = [0u8; SECRET_KEY_SIZE];
        raw.copy_from_slice(bytes);
        Ok(SecretKey(ed25519_dalek::SigningKey::from_bytes(&raw)))
    }
}

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidBinaryLength(
                PUBLIC_KEY_SIZE,
                bytes.len(),
            ));
        }
        let mut raw = [0u8; PUBLIC_KEY_SIZE];
        raw.copy_from_slice(bytes);
        ed25519_dalek::VerifyingKey::from_bytes(&raw)
            .map(PublicKey)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Signature, CryptoError> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::InvalidBinaryLength(SIGNATURE_SIZE, bytes.len()));
        }
        ed25519_dalek::Signature::from_slice(bytes)
            .map(Signature)
            .map_err(|_| CryptoError::BadSignature)
    }
}

impl Hashable for PublicKey {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.to_bytes());
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8v_to_typed_str("PK", &self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8v_to_typed_str("Sig", &self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_sign_and_verify() {
        let (skey, pkey) = make_deterministic_keys(b"User1");
        let sig = sign(&skey, b"a signed message");
        assert!(validate_sig(&pkey, b"a signed message", &sig).is_ok());
        assert!(validate_sig(&pkey, b"a different message", &sig).is_err());

        let (_, other_pkey) = make_deterministic_keys(b"User2");
        assert!(validate_sig(&other_pkey, b"a signed message", &sig).is_err());
    }

    #[test]
    fn tst_deterministic_keys() {
        let (_, pk1) = make_deterministic_keys(b"User1");
        let (_, pk2) = make_deterministic_keys(b"User1");
        let (_, pk3) = make_deterministic_keys(b"User2");
        assert_eq!(pk1, pk2);
        assert_ne!(pk1, pk3);
    }

    #[test]
    fn tst_byte_round_trips() {
        let (skey, pkey) = make_deterministic_keys(b"User1");
        let sig = sign(&skey, b"msg");

        let pkey2 = PublicKey::try_from_bytes(&pkey.to_bytes()).unwrap();
        assert_eq!(pkey, pkey2);

        let sig2 = Signature::try_from_bytes(&sig.to_bytes()).unwrap();
        assert!(validate_sig(&pkey, b"msg", &sig2).is_ok());

        let skey2 = SecretKey::try_from_bytes(&skey.to_bytes()).unwrap();
        assert_eq!(skey2.public_key(), pkey);

        assert!(Signature::try_from_bytes(&[0u8; 10]).is_err());
    }
}
