//! mod.rs - ephemeral X25519 encryption keys with sealed-box encryption.

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

use crate::hash::{Hasher, Hashable};
use crate::utils::u8v_to_typed_str;
use crate::CryptoError;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::{CryptoRng, RngCore};
use std::fmt;
use x25519_dalek as x25519;

pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SECRET_KEY_SIZE: usize = 32;

/// AEAD tag plus the ephemeral public key prepended to every sealed box.
pub const SEAL_OVERHEAD: usize = PUBLIC_KEY_SIZE + 16;

#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(x25519::PublicKey);

#[derive(Clone)]
pub struct SecretKey(x25519::StaticSecret);

/// Generate a fresh encryption keypair.
pub fn make_random_keys<R: RngCore + CryptoRng>(rng: &mut R) -> (SecretKey, PublicKey) {
    let mut raw = [0u8; SECRET_KEY_SIZE];
    rng.fill_bytes(&mut raw);
    let skey = SecretKey(x25519::StaticSecret::from(raw));
    let pkey = skey.public_key();
    (skey, pkey)
}

/// Generate a keypair from a seed. Only for tests and tools.
pub fn make_deterministic_keys(seed: &[u8]) -> (SecretKey, PublicKey) {
    let raw = crate::hash::Hash::from_vector(seed).to_bytes();
    let skey = SecretKey(x25519::StaticSecret::from(raw));
    let pkey = skey.public_key();
    (skey, pkey)
}

impl SecretKey {
    pub fn public_key(&self) -> PublicKey {
        PublicKey(x25519::PublicKey::from(&self.0))
    }

    /// Check that this secret key is the private half of `pkey`.
    pub fn verify_key(&self, pkey: &PublicKey) -> bool {
        self.public_key() == *pkey
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
        Ok(SecretKey(x25519::StaticSecret::from(raw)))
    }
}

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        *self.0.as_bytes()
    }

    /// Load a public key from the wire, rejecting byte strings that cannot
    /// be a valid key.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidBinaryLength(
                PUBLIC_KEY_SIZE,
                bytes.len(),
            ));
        }
        let mut raw = [0u8; PUBLIC_KEY_SIZE];
        raw.copy_from_slice(bytes);
        if raw == [0u8; PUBLIC_KEY_SIZE] {
            // the identity point yields a non-contributory exchange
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(PublicKey(x25519::PublicKey::from(raw)))
    }
}

// Each message is sealed under a fresh ephemeral keypair, so a fixed nonce
// never repeats for the same AEAD key.
fn seal_key(shared: &x25519::SharedSecret, eph: &x25519::PublicKey, to: &x25519::PublicKey) -> Key {
    let mut state = Hasher::new();
    state.input(shared.as_bytes());
    state.input(eph.as_bytes());
    state.input(to.as_bytes());
    Key::from(state.result().to_bytes())
}

/// Seal `msg` to the owner of `pkey`: `ephemeral_pk || aead_ciphertext`.
pub fn encrypt<R: RngCore + CryptoRng>(pkey: &PublicKey, msg: &[u8], rng: &mut R) -> Vec<u8> {
    let mut raw = [0u8; SECRET_KEY_SIZE];
    rng.fill_bytes(&mut raw);
    let eph_skey = x25519::StaticSecret::from(raw);
    let eph_pkey = x25519::PublicKey::from(&eph_skey);

    let shared = eph_skey.diffie_hellman(&pkey.0);
    let key = seal_key(&shared, &eph_pkey, &pkey.0);
    let cipher = ChaCha20Poly1305::new(&key);
    let sealed = cipher
        .encrypt(Nonce::from_slice(&[0u8; 12]), msg)
        .expect("AEAD encryption");

    let mut out = Vec::with_capacity(PUBLIC_KEY_SIZE + sealed.len());
    out.extend_from_slice(eph_pkey.as_bytes());
    out.extend_from_slice(&sealed);
    out
}

/// Open a sealed box produced by `encrypt`.
pub fn decrypt(skey: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < SEAL_OVERHEAD {
        return Err(CryptoError::DecryptionFailure);
    }
    let (eph_bytes, sealed) = ciphertext.split_at(PUBLIC_KEY_SIZE);
    let mut raw = [0u8; PUBLIC_KEY_SIZE];
    raw.copy_from_slice(eph_bytes);
    let eph_pkey = x25519::PublicKey::from(raw);

    let shared = skey.0.diffie_hellman(&eph_pkey);
    let key = seal_key(&shared, &eph_pkey, &x25519::PublicKey::from(&skey.0));
    let cipher = ChaCha20Poly1305::new(&key);
    cipher
        .decrypt(Nonce::from_slice(&[0u8; 12]), sealed)
        .map_err(|_| CryptoError::DecryptionFailure)
}

impl Hashable for PublicKey {
    fn hash(&self, state: &mut Hasher) {
        state.input(&self.to_bytes());
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8v_to_typed_str("EPK", &self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tst_seal_round_trip() {
        let mut rng = StdRng::seed_from_u64(1);
        let (skey, pkey) = make_random_keys(&mut rng);
        let ct = encrypt(&pkey, b"a sealed message", &mut rng);
        assert_eq!(decrypt(&skey, &ct).unwrap(), b"a sealed message");
    }

    #[test]
    fn tst_wrong_key_fails() {
        let mut rng = StdRng::seed_from_u64(2);
        let (_, pkey) = make_random_keys(&mut rng);
        let (other_skey, _) = make_random_keys(&mut rng);
        let ct = encrypt(&pkey, b"secret", &mut rng);
        assert_eq!(
            decrypt(&other_skey, &ct),
            Err(CryptoError::DecryptionFailure)
        );
    }

    #[test]
    fn tst_truncated_box_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let (skey, pkey) = make_random_keys(&mut rng);
        let ct = encrypt(&pkey, b"secret", &mut rng);
        assert!(decrypt(&skey, &ct[..SEAL_OVERHEAD - 1]).is_err());
        let mut tampered = ct.clone();
        tampered[PUBLIC_KEY_SIZE] ^= 0x01;
        assert!(decrypt(&skey, &tampered).is_err());
    }

    #[test]
    fn tst_verify_key() {
        let (skey, pkey) = make_deterministic_keys(b"User1");
        let (_, other_pkey) = make_deterministic_keys(b"User2");
        assert!(skey.verify_key(&pkey));
        assert!(!skey.verify_key(&other_pkey));
    }

    #[test]
    fn tst_public_key_validity() {
        let (_, pkey) = make_deterministic_keys(b"User1");
        assert!(PublicKey::try_from_bytes(&pkey.to_bytes()).is_ok());
        assert!(PublicKey::try_from_bytes(&[0u8; PUBLIC_KEY_SIZE]).is_err());
        assert!(PublicKey::try_from_bytes(&[1u8; 31]).is_err());
    }
}
