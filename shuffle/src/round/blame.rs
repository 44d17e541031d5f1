//! blame.rs - forensic replay over revealed logs and outer keys.

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

// Runs after every member has revealed its outer private key and message
// log. All evidence is authenticated: log entries carry the sender's wire
// signature, so a conflicting pair of entries convicts the signer, not the
// log owners that recorded them.

use super::message::{
    ShufflePayload, TAG_BLAME_DATA, TAG_ENCRYPTED_DATA, TAG_GO, TAG_NO_GO, TAG_PRIVATE_KEY,
    TAG_PUBLIC_KEYS,
};
use crate::error::ShuffleError;
use crate::group::{Group, Id};
use crate::msglog::{LogEntry, MessageLog};
use cloak_crypto::{ecies, sig};
use log::{debug, warn};
use std::collections::HashMap;

struct ParsedEntry {
    sender: usize,
    payload: ShufflePayload,
    /// The signed payload bytes, used verbatim for equivocation checks.
    raw: Vec<u8>,
}

pub struct ShuffleBlamer<'a> {
    group: &'a Group,
    round_id: Id,
    logs: Vec<MessageLog>,
    outer_keys: Vec<ecies::SecretKey>,
    bad_nodes: Vec<bool>,
}

impl<'a> ShuffleBlamer<'a> {
    pub fn new(
        group: &'a Group,
        round_id: Id,
        logs: Vec<MessageLog>,
        outer_keys: Vec<ecies::SecretKey>,
    ) -> ShuffleBlamer<'a> {
        assert_eq!(logs.len(), group.count());
        assert_eq!(outer_keys.len(), group.count());
        let bad_nodes = vec![false; group.count()];
        ShuffleBlamer {
            group,
            round_id,
            logs,
            outer_keys,
            bad_nodes,
        }
    }

    pub fn start(&mut self) {
        let parsed = self.parse_logs();
        self.check_equivocation(&parsed);
        let submissions = self.collect_submissions(&parsed[0]);
        self.check_duplicate_submissions(&submissions);
        self.replay_cascade(&parsed, &submissions);
    }

    pub fn bad_nodes(&self) -> &[bool] {
        &self.bad_nodes
    }

    fn set_bad(&mut self, idx: usize, why: &str) {
        if !self.bad_nodes[idx] {
            warn!("blamer: node {} misbehaved: {}", idx, why);
        }
        self.bad_nodes[idx] = true;
    }

    // An honest member only logs messages that passed the signature and
    // round-id checks, so a log with an unverifiable entry was fabricated
    // by its owner.
    fn parse_logs(&mut self) -> Vec<Vec<ParsedEntry>> {
        let count = self.group.count();
        let mut all = Vec::with_capacity(count);
        let mut tampered_owners = Vec::new();
        for owner in 0..count {
            let mut entries = Vec::new();
            for entry in self.logs[owner].entries() {
                match parse_entry(self.group, &self.round_id, entry) {
                    Ok(parsed) => entries.push(parsed),
                    Err(err) => {
                        debug!("blamer: log {} holds a bad entry: {}", owner, err);
                        tampered_owners.push(owner);
                    }
                }
            }
            all.push(entries);
        }
        for owner in tampered_owners {
            self.set_bad(owner, "revealed a log with an unverifiable entry");
        }
        all
    }

    // Broadcast-class messages must reach every member with identical
    // bytes; two distinct signed payloads from one sender are proof of
    // equivocation. Go and NoGo share a slot so that casting both votes is
    // caught as well.
    fn check_equivocation(&mut self, parsed: &[Vec<ParsedEntry>]) {
        let mut seen: HashMap<(usize, u32), &[u8]> = HashMap::new();
        let mut equivocators = Vec::new();
        for entries in parsed {
            for entry in entries {
                let class = match entry.payload.tag() {
                    TAG_PUBLIC_KEYS | TAG_ENCRYPTED_DATA | TAG_PRIVATE_KEY | TAG_BLAME_DATA => {
                        entry.payload.tag()
                    }
                    TAG_GO | TAG_NO_GO => TAG_GO,
                    _ => continue,
                };
                match seen.get(&(entry.sender, class)) {
                    Some(prev) if *prev != entry.raw.as_slice() => {
                        equivocators.push(entry.sender);
                    }
                    Some(_) => {}
                    None => {
                        seen.insert((entry.sender, class), &entry.raw);
                    }
                }
            }
        }
        for idx in equivocators {
            self.set_bad(idx, "equivocated on a broadcast message");
        }
    }

    /// The outer ciphertext each member submitted, reconstructed from the
    /// head's log. Slots stay empty if blame started before the head heard
    /// from everyone.
    fn collect_submissions(&self, head_entries: &[ParsedEntry]) -> Vec<Option<Vec<u8>>> {
        let mut submissions: Vec<Option<Vec<u8>>> = vec![None; self.group.count()];
        for entry in head_entries {
            if let ShufflePayload::Data { ciphertext } = &entry.payload {
                if submissions[entry.sender].is_none() {
                    submissions[entry.sender] = Some(ciphertext.clone());
                }
            }
        }
        submissions
    }

    fn check_duplicate_submissions(&mut self, submissions: &[Option<Vec<u8>>]) {
        let count = submissions.len();
        let mut duplicates = Vec::new();
        for idx in 0..count {
            for jdx in idx + 1..count {
                if let (Some(a), Some(b)) = (&submissions[idx], &submissions[jdx]) {
                    if a == b {
                        duplicates.push(idx);
                        duplicates.push(jdx);
                    }
                }
            }
        }
        for idx in duplicates {
            self.set_bad(idx, "submitted a duplicate ciphertext");
        }
    }

    // Walk the cascade with the revealed outer keys: each shuffler's input
    // must decrypt cleanly, and the multiset of cleartexts must equal the
    // output it signed. A block that fails to decrypt convicts whoever
    // introduced it; a multiset mismatch convicts the shuffler.
    fn replay_cascade(
        &mut self,
        parsed: &[Vec<ParsedEntry>],
        submissions: &[Option<Vec<u8>>],
    ) {
        if submissions.iter().any(|s| s.is_none()) {
            debug!("blamer: incomplete submission record, skipping the cascade replay");
            return;
        }
        let count = self.group.count();
        // (block, introducer)
        let mut current: Vec<(Vec<u8>, usize)> = submissions
            .iter()
            .enumerate()
            .map(|(idx, sub)| (sub.clone().expect("checked above"), idx))
            .collect();

        for stage in 0..count {
            let mut cleartexts = Vec::with_capacity(current.len());
            let mut corrupt = Vec::new();
            for (block, introducer) in &current {
                match ecies::decrypt(&self.outer_keys[stage], block) {
                    Ok(cleartext) => cleartexts.push(cleartext),
                    Err(_) => corrupt.push(*introducer),
                }
            }
            if !corrupt.is_empty() {
                for idx in corrupt {
                    self.set_bad(idx, "introduced an undecryptable block");
                }
                return;
            }

            let claimed = match self.claimed_output(parsed, stage) {
                Some(blocks) => blocks,
                None => {
                    debug!("blamer: no recorded output for node {}", stage);
                    return;
                }
            };

            let mut lhs = cleartexts;
            let mut rhs = claimed.clone();
            lhs.sort();
            rhs.sort();
            if lhs != rhs {
                self.set_bad(stage, "shuffle output does not match its input");
                return;
            }
            current = claimed.into_iter().map(|block| (block, stage)).collect();
        }
    }

    // A shuffler's output is whatever it signed: the ShuffleData its
    // successor accepted, or the EncryptedData broadcast for the tail.
    fn claimed_output(
        &self,
        parsed: &[Vec<ParsedEntry>],
        stage: usize,
    ) -> Option<Vec<Vec<u8>>> {
        let count = self.group.count();
        if stage + 1 < count {
            parsed[stage + 1].iter().find_map(|entry| {
                if entry.sender != stage {
                    return None;
                }
                match &entry.payload {
                    ShufflePayload::ShuffleData { blocks } => Some(blocks.clone()),
                    _ => None,
                }
            })
        } else {
            parsed.iter().flatten().find_map(|entry| {
                if entry.sender != count - 1 {
                    return None;
                }
                match &entry.payload {
                    ShufflePayload::EncryptedData { blocks } => Some(blocks.clone()),
                    _ => None,
                }
            })
        }
    }
}

fn parse_entry(
    group: &Group,
    round_id: &Id,
    entry: &LogEntry,
) -> Result<ParsedEntry, ShuffleError> {
    let sender = group
        .index(&entry.sender)
        .ok_or(ShuffleError::UnknownSender)?;
    if entry.data.len() < sig::SIGNATURE_SIZE {
        return Err(ShuffleError::TruncatedMessage);
    }
    let (payload_bytes, sig_bytes) = entry.data.split_at(entry.data.len() - sig::SIGNATURE_SIZE);
    let signature =
        sig::Signature::try_from_bytes(sig_bytes).map_err(|_| ShuffleError::InvalidSignature)?;
    if sig::validate_sig(group.key_by_index(sender), payload_bytes, &signature).is_err() {
        return Err(ShuffleError::InvalidSignature);
    }
    let (rid, payload) = ShufflePayload::decode(payload_bytes)?;
    if rid != *round_id {
        return Err(ShuffleError::WrongRound);
    }
    Ok(ParsedEntry {
        sender,
        payload,
        raw: payload_bytes.to_vec(),
    })
}
