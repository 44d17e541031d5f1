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

pub mod ecies;
pub mod hash;
pub mod onion;
pub mod sig;
pub mod utils;

use failure::Fail;

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum CryptoError {
    /// Trying to coerce from an incorrect byte array.
    #[fail(
        display = "Invalid binary string length. Expected: {}, Got: {}",
        _0, _1
    )]
    InvalidBinaryLength(usize, usize),
    #[fail(display = "Invalid public key")]
    InvalidPublicKey,
    #[fail(display = "Signature check failed")]
    BadSignature,
    #[fail(display = "Decryption failure")]
    DecryptionFailure,
}
