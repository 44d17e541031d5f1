//! error.rs - shuffle protocol errors.

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

use failure::Fail;

// Recoverable protocol rejections. A handler returning one of these leaves
// the round state untouched; the dispatch boundary logs the rejection and
// rolls the message log back.

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum ShuffleError {
    #[fail(display = "Round has already been started")]
    AlreadyStarted,
    #[fail(display = "Local identity is not a member of the group")]
    NotAMember,
    #[fail(display = "Received a misordered {} message in state {}", _0, _1)]
    MisorderedMessage(&'static str, &'static str),
    #[fail(display = "Received multiple {} messages from the same identity", _0)]
    DuplicateMessage(&'static str),
    #[fail(display = "Received a conflicting second data message from the same identity")]
    ConflictingData,
    #[fail(display = "Received an empty data block")]
    EmptyData,
    #[fail(display = "Invalid signature or data")]
    InvalidSignature,
    #[fail(display = "Message belongs to a different round")]
    WrongRound,
    #[fail(display = "Sender is not a member of this group")]
    UnknownSender,
    #[fail(display = "Received a message reserved for a different role")]
    WrongNode,
    #[fail(display = "Received a message from an unexpected sender")]
    WrongSender,
    #[fail(display = "Received an invalid key")]
    InvalidKey,
    #[fail(display = "Key material for the sender has not been received yet")]
    MissingKey,
    #[fail(display = "Truncated message")]
    TruncatedMessage,
    #[fail(display = "Unknown message type: {}", _0)]
    UnknownMessageType(u32),
    #[fail(display = "Malformed message: {}", _0)]
    MalformedMessage(String),
}
