//! lib.rs - Cloak accountable shuffle protocol.

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

// ========================================================================
// A fixed group of N mutually-distrusting members each contributes one
// fixed-size message block. The round outputs the multiset of all N blocks
// in a permuted order: no honest member's block can be linked back to its
// sender, and any deviation from the protocol is converted into publicly
// verifiable evidence naming at least one misbehaving member.
//
// The round itself is a single-threaded state machine driven by the
// transport: every inbound wire message is handed to
// `ShuffleRound::process_data`, and outbound traffic flows through the
// `RoundNetwork` trait. Peer liveness and timeouts are the transport's
// concern, not ours.
// ========================================================================

mod error;
pub use error::*;

pub mod group;
pub mod loopback;
pub mod msglog;
pub mod network;
pub mod round;

pub use group::{Group, Id};
pub use network::{Network, RoundNetwork};
pub use round::{ShuffleRound, State, BLOCK_SIZE};
