//! mod.rs - layered (onion) encryption over ephemeral encryption keys.

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

use crate::ecies;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Layered encryption used by the shuffle cascade. Owns its own CSPRNG so
/// that tests can substitute a deterministic one.
pub struct OnionEncryptor {
    rng: StdRng,
}

impl OnionEncryptor {
    pub fn new() -> OnionEncryptor {
        OnionEncryptor {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn from_seed(seed: u64) -> OnionEncryptor {
        OnionEncryptor {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Wrap `plaintext` in one layer per key, applied in array order, so
    /// that the *last* key's layer ends up outermost and its owner strips
    /// the onion first.
    pub fn encrypt(&mut self, keys: &[ecies::PublicKey], plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = plaintext.to_vec();
        for key in keys {
            ciphertext = ecies::encrypt(key, &ciphertext, &mut self.rng);
        }
        ciphertext
    }

    /// Strip one layer from every block. Returns the cleartexts together
    /// with the indices of blocks that failed to decrypt; failed slots hold
    /// an empty block.
    pub fn decrypt(&self, skey: &ecies::SecretKey, blocks: &[Vec<u8>]) -> (Vec<Vec<u8>>, Vec<usize>) {
        let mut cleartexts = Vec::with_capacity(blocks.len());
        let mut bad = Vec::new();
        for (idx, block) in blocks.iter().enumerate() {
            match ecies::decrypt(skey, block) {
                Ok(cleartext) => cleartexts.push(cleartext),
                Err(_) => {
                    cleartexts.push(Vec::new());
                    bad.push(idx);
                }
            }
        }
        (cleartexts, bad)
    }

    /// Uniformly permute the blocks in place.
    pub fn randomize_blocks(&mut self, blocks: &mut Vec<Vec<u8>>) {
        blocks.shuffle(&mut self.rng);
    }
}

impl Default for OnionEncryptor {
    fn default() -> Self {
        OnionEncryptor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyring(n: usize) -> (Vec<ecies::SecretKey>, Vec<ecies::PublicKey>) {
        let mut skeys = Vec::new();
        let mut pkeys = Vec::new();
        for ix in 0..n {
            let seed = format!("User_{}", ix).into_bytes();
            let (sk, pk) = ecies::make_deterministic_keys(&seed);
            skeys.push(sk);
            pkeys.push(pk);
        }
        (skeys, pkeys)
    }

    #[test]
    fn tst_last_key_is_outermost() {
        let (skeys, pkeys) = keyring(3);
        let mut onion = OnionEncryptor::from_seed(1);
        let ct = onion.encrypt(&pkeys, b"payload");

        // peeling must succeed in reverse key order
        let (step1, bad) = onion.decrypt(&skeys[2], &[ct]);
        assert!(bad.is_empty());
        let (step2, bad) = onion.decrypt(&skeys[1], &step1);
        assert!(bad.is_empty());
        let (step3, bad) = onion.decrypt(&skeys[0], &step2);
        assert!(bad.is_empty());
        assert_eq!(step3[0], b"payload");
    }

    #[test]
    fn tst_bad_blocks_are_reported() {
        let (skeys, pkeys) = keyring(1);
        let mut onion = OnionEncryptor::from_seed(2);
        let good = onion.encrypt(&pkeys, b"good block");
        let garbage = vec![0u8; 80];
        let (cleartexts, bad) = onion.decrypt(&skeys[0], &[good, garbage]);
        assert_eq!(bad, vec![1]);
        assert_eq!(cleartexts[0], b"good block");
        assert!(cleartexts[1].is_empty());
    }

    #[test]
    fn tst_randomize_is_a_permutation() {
        let mut onion = OnionEncryptor::from_seed(3);
        let original: Vec<Vec<u8>> = (0u8..16).map(|ix| vec![ix; 4]).collect();
        let mut blocks = original.clone();
        onion.randomize_blocks(&mut blocks);
        let mut sorted = blocks.clone();
        sorted.sort();
        let mut expected = original.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn tst_deterministic_seed_is_reproducible() {
        let original: Vec<Vec<u8>> = (0u8..16).map(|ix| vec![ix; 4]).collect();
        let mut a = original.clone();
        let mut b = original.clone();
        OnionEncryptor::from_seed(4).randomize_blocks(&mut a);
        OnionEncryptor::from_seed(4).randomize_blocks(&mut b);
        assert_eq!(a, b);
    }
}
