//! loopback.rs - in-memory network hub for tests and simulation.

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
use crate::network::{Network, RoundNetwork};
use failure::Error;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// An outbound message captured by the hub, waiting to be pumped into the
/// destination rounds by the test driver.
#[derive(Clone, Debug)]
pub struct QueuedMessage {
    pub from: Id,
    /// `None` for broadcasts.
    pub to: Option<Id>,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct HubState {
    queue: VecDeque<QueuedMessage>,
    delivered: Vec<(Id, Vec<u8>)>,
    closed: Vec<(Id, String)>,
}

/// Shared state behind every `LoopbackNetwork` handed to a round. The test
/// driver drains `pop_message` and feeds each message back into the
/// destination rounds, which preserves the serial dispatch model of the
/// protocol.
#[derive(Clone)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> LoopbackHub {
        LoopbackHub {
            state: Arc::new(Mutex::new(HubState::default())),
        }
    }

    /// A network endpoint bound to one member identity.
    pub fn network(&self, local: &Id) -> Network {
        Box::new(LoopbackNetwork {
            local: local.clone(),
            state: self.state.clone(),
        })
    }

    pub fn pop_message(&self) -> Option<QueuedMessage> {
        self.state.lock().unwrap().queue.pop_front()
    }

    /// Plaintexts pushed to `node`'s output sink so far.
    pub fn delivered(&self, node: &Id) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .delivered
            .iter()
            .filter(|(id, _)| id == node)
            .map(|(_, data)| data.clone())
            .collect()
    }

    /// The first close reason reported by `node`, if any.
    pub fn close_reason(&self, node: &Id) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .closed
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, reason)| reason.clone())
    }
}

impl Default for LoopbackHub {
    fn default() -> Self {
        LoopbackHub::new()
    }
}

#[derive(Clone)]
struct LoopbackNetwork {
    local: Id,
    state: Arc<Mutex<HubState>>,
}

impl RoundNetwork for LoopbackNetwork {
    fn broadcast(&self, data: Vec<u8>) -> Result<(), Error> {
        self.state.lock().unwrap().queue.push_back(QueuedMessage {
            from: self.local.clone(),
            to: None,
            data,
        });
        Ok(())
    }

    fn send(&self, data: Vec<u8>, to: &Id) -> Result<(), Error> {
        self.state.lock().unwrap().queue.push_back(QueuedMessage {
            from: self.local.clone(),
            to: Some(to.clone()),
            data,
        });
        Ok(())
    }

    fn push_data(&self, data: Vec<u8>, _source: &Id) -> Result<(), Error> {
        self.state
            .lock()
            .unwrap()
            .delivered
            .push((self.local.clone(), data));
        Ok(())
    }

    fn close(&self, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .closed
            .push((self.local.clone(), reason.to_string()));
    }

    fn box_clone(&self) -> Network {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ID_SIZE;

    fn id(byte: u8) -> Id {
        Id::from_bytes([byte; ID_SIZE])
    }

    #[test]
    fn tst_queue_and_sinks() {
        let hub = LoopbackHub::new();
        let net1 = hub.network(&id(1));
        let net2 = hub.network(&id(2));

        net1.broadcast(vec![1, 2, 3]).unwrap();
        net2.send(vec![4, 5], &id(1)).unwrap();

        let first = hub.pop_message().unwrap();
        assert_eq!(first.from, id(1));
        assert!(first.to.is_none());
        let second = hub.pop_message().unwrap();
        assert_eq!(second.to, Some(id(1)));
        assert!(hub.pop_message().is_none());

        net1.push_data(b"plain".to_vec(), &id(1)).unwrap();
        assert_eq!(hub.delivered(&id(1)), vec![b"plain".to_vec()]);
        assert!(hub.delivered(&id(2)).is_empty());

        net2.close("done");
        assert_eq!(hub.close_reason(&id(2)), Some("done".to_string()));
        assert_eq!(hub.close_reason(&id(1)), None);
    }
}
