//! msglog.rs - append-only record of the wire messages accepted by a round.

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
use crate::group::{Id, ID_SIZE};
use byteorder::{ByteOrder, LittleEndian};

/// One accepted wire message, exactly as it arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub sender: Id,
    pub data: Vec<u8>,
}

/// The log is appended *before* a message is dispatched and rolled back
/// with `pop` when the handler rejects it, so serialized evidence contains
/// exactly the messages that entered the round state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn new() -> MessageLog {
        MessageLog {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, data: Vec<u8>, sender: Id) {
        self.entries.push(LogEntry { sender, data });
    }

    /// Roll back the most recent append.
    pub fn pop(&mut self) -> Option<LogEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![0u8; 4];
        LittleEndian::write_u32(&mut out[..4], self.entries.len() as u32);
        for entry in &self.entries {
            out.extend_from_slice(entry.sender.base_vector());
            let mut len = [0u8; 4];
            LittleEndian::write_u32(&mut len, entry.data.len() as u32);
            out.extend_from_slice(&len);
            out.extend_from_slice(&entry.data);
        }
        out
    }

    pub fn deserialize(buf: &[u8]) -> Result<MessageLog, ShuffleError> {
        if buf.len() < 4 {
            return Err(ShuffleError::TruncatedMessage);
        }
        let count = LittleEndian::read_u32(&buf[..4]) as usize;
        let mut pos = 4;
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            if buf.len() < pos + ID_SIZE + 4 {
                return Err(ShuffleError::TruncatedMessage);
            }
            let sender = Id::try_from_bytes(&buf[pos..pos + ID_SIZE])?;
            pos += ID_SIZE;
            let len = LittleEndian::read_u32(&buf[pos..pos + 4]) as usize;
            pos += 4;
            if buf.len() < pos + len {
                return Err(ShuffleError::TruncatedMessage);
            }
            entries.push(LogEntry {
                sender,
                data: buf[pos..pos + len].to_vec(),
            });
            pos += len;
        }
        Ok(MessageLog { entries })
    }
}
