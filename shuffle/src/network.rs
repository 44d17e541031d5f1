//! network.rs - the transport surface a round drives.

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

use crate::group::Id;
use failure::Error;

/// Outbound transport for a single round. Peer connections, dispatch of
/// inbound traffic into `ShuffleRound::process_data`, timeouts, and peer
/// liveness all live behind this trait.
pub trait RoundNetwork: Send {
    /// Send a signed message to every group member.
    fn broadcast(&self, data: Vec<u8>) -> Result<(), Error>;

    /// Send a signed message to one group member.
    fn send(&self, data: Vec<u8>, to: &Id) -> Result<(), Error>;

    /// Deliver a recovered plaintext to the round's output sink.
    fn push_data(&self, data: Vec<u8>, source: &Id) -> Result<(), Error>;

    /// Tear the round down with a human-readable reason.
    fn close(&self, reason: &str);

    // Clone self as a box.
    fn box_clone(&self) -> Network;
}

pub type Network = Box<dyn RoundNetwork>;

impl Clone for Network {
    fn clone(&self) -> Network {
        self.box_clone()
    }
}
