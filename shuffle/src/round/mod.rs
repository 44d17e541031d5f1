//! mod.rs - the verifiable shuffle round state machine.

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
// One round of the accountable shuffle.
//
// Every member generates two ephemeral keypairs and broadcasts the public
// halves. Each member onion-encrypts its padded block under all inner
// keys, then under all outer keys, and submits the result to the head of
// the cascade. Members then take turns stripping one outer layer and
// permuting the working vector; the tail broadcasts the final vector.
// Each member votes Go (with a hash binding it to its view of the output)
// or NoGo, and on unanimous agreement the inner private keys are revealed
// and everyone recovers the same unlinkable multiset of blocks.
//
// Any cryptographic failure drops the round into the blame sub-protocol:
// members reveal their outer private keys and message logs, cross-check
// each other's evidence for equivocation, and finally hand the
// authenticated logs to the forensic replayer, which names at least one
// misbehaving member.
// ========================================================================

pub mod blame;
pub mod message;

use self::blame::ShuffleBlamer;
use self::message::ShufflePayload;
use crate::error::ShuffleError;
use crate::group::{Group, Id};
use crate::msglog::MessageLog;
use crate::network::Network;
use byteorder::{ByteOrder, LittleEndian};
use cloak_crypto::hash::{Hash, Hashable, Hasher};
use cloak_crypto::onion::OnionEncryptor;
use cloak_crypto::{ecies, sig};
use log::{log, warn, Level};
use rand::rngs::OsRng;
use serde_derive::{Deserialize, Serialize};

/// Fixed plaintext capacity of one contribution.
pub const BLOCK_SIZE: usize = 1024;

macro_rules! sdebug {
    ($self:expr, $fmt:expr $(,$arg:expr)*) => (
        log!(Level::Debug, concat!("[{}] ({}) ", $fmt), $self.local_index, $self.state.name(), $($arg),*);
    );
}
macro_rules! sinfo {
    ($self:expr, $fmt:expr $(,$arg:expr)*) => (
        log!(Level::Info, concat!("[{}] ({}) ", $fmt), $self.local_index, $self.state.name(), $($arg),*);
    );
}
macro_rules! swarn {
    ($self:expr, $fmt:expr $(,$arg:expr)*) => (
        log!(Level::Warn, concat!("[{}] ({}) ", $fmt), $self.local_index, $self.state.name(), $($arg),*);
    );
}
macro_rules! serror {
    ($self:expr, $fmt:expr $(,$arg:expr)*) => (
        log!(Level::Error, concat!("[{}] ({}) ", $fmt), $self.local_index, $self.state.name(), $($arg),*);
    );
}

/// Shuffle round finite state machine state.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "state")]
#[serde(rename_all = "snake_case")]
pub enum State {
    Offline,
    KeySharing,
    DataSubmission,
    WaitingForShuffle,
    Shuffling,
    ShuffleDone,
    Verification,
    PrivateKeySharing,
    Decryption,
    BlameInit,
    BlameShare,
    Finished,
}

impl State {
    /// Enum to string.
    pub fn name(&self) -> &'static str {
        match *self {
            State::Offline => "Offline",
            State::KeySharing => "KeySharing",
            State::DataSubmission => "DataSubmission",
            State::WaitingForShuffle => "WaitingForShuffle",
            State::Shuffling => "Shuffling",
            State::ShuffleDone => "ShuffleDone",
            State::Verification => "Verification",
            State::PrivateKeySharing => "PrivateKeySharing",
            State::Decryption => "Decryption",
            State::BlameInit => "BlameInit",
            State::BlameShare => "BlameShare",
            State::Finished => "Finished",
        }
    }
}

/// The canonical "nothing to send" contribution.
pub fn default_data() -> Vec<u8> {
    vec![0u8; BLOCK_SIZE + 4]
}

/// Length-prefix `data` with 4 little-endian bytes and zero-pad to exactly
/// `BLOCK_SIZE + 4` bytes. The caller guarantees `data.len() <= BLOCK_SIZE`.
pub fn prepare_data(data: &[u8]) -> Vec<u8> {
    let mut msg = vec![0u8; 4];
    LittleEndian::write_u32(&mut msg[..4], data.len() as u32);
    msg.extend_from_slice(data);
    msg.resize(BLOCK_SIZE + 4, 0);
    msg
}

/// Inverse of `prepare_data`. Empty and malformed blocks yield an empty
/// vector, which the caller drops.
pub fn get_data(data: &[u8]) -> Vec<u8> {
    if data.len() < 4 {
        warn!("received a truncated cleartext block: len={}", data.len());
        return Vec::new();
    }
    let size = LittleEndian::read_u32(&data[..4]) as usize;
    if size == 0 {
        return Vec::new();
    }
    if size > BLOCK_SIZE || size > data.len() - 4 {
        warn!("received a bad cleartext block: claimed={}", size);
        return Vec::new();
    }
    data[4..4 + size].to_vec()
}

/// One member's view of a single shuffle round. Inbound wire traffic is
/// pushed through `process_data`; everything else happens behind the
/// `Network` the round was constructed with.
pub struct ShuffleRound {
    group: Group,
    local_id: Id,
    local_index: usize,
    session_id: Id,
    round_id: Id,
    signing_key: sig::SecretKey,
    network: Network,
    onion: OnionEncryptor,

    /// Own contribution, already padded to one block.
    data: Vec<u8>,

    state: State,
    /// The state the round was in when blame started; part of the evidence
    /// about where the protocol stalled.
    blame_state: State,

    // --------------------------------------------
    // Phase 1 - ephemeral keying. Public keys are addressed by the
    // inverted key index kidx(i) = N-1-i, private keys by the raw sender
    // index. Every slot is written at most once per round.
    inner_key: ecies::SecretKey,
    outer_key: ecies::SecretKey,
    public_inner_keys: Vec<Option<ecies::PublicKey>>,
    public_outer_keys: Vec<Option<ecies::PublicKey>>,
    keys_received: usize,

    // --------------------------------------------
    // Phases 2-4 - submission and cascade.
    inner_ciphertext: Vec<u8>,
    outer_ciphertext: Vec<u8>,
    shuffle_ciphertext: Vec<Vec<u8>>,
    shuffle_cleartext: Vec<Vec<u8>>,
    data_received: usize,
    encrypted_data: Vec<Vec<u8>>,

    // --------------------------------------------
    // Phase 5 - equivocation check.
    broadcast_hash: Option<Hash>,
    go: Vec<bool>,
    go_received: Vec<bool>,
    go_count: usize,
    broadcast_hashes: Vec<Option<Hash>>,

    // --------------------------------------------
    // Phase 6 - inner key revelation.
    private_inner_keys: Vec<Option<ecies::SecretKey>>,

    // --------------------------------------------
    // Blame evidence.
    private_outer_keys: Vec<Option<ecies::SecretKey>>,
    logs: Vec<Option<MessageLog>>,
    blame_hash: Vec<Option<Vec<u8>>>,
    blame_signatures: Vec<Option<sig::Signature>>,
    valid_blames: Vec<bool>,
    received_blame_verification: Vec<bool>,
    blame_data_received: usize,
    blame_verifications: usize,

    // --------------------------------------------
    /// Every wire message this round accepted, in arrival order.
    log: MessageLog,
    bad_members: Vec<usize>,
    successful: bool,
}

impl ShuffleRound {
    /// Create a round. Oversized payloads are replaced by the default
    /// block so that a bad local input cannot stall the whole group.
    pub fn new(
        group: Group,
        local_id: Id,
        session_id: Id,
        round_id: Id,
        signing_key: sig::SecretKey,
        data: Vec<u8>,
        network: Network,
        onion: OnionEncryptor,
    ) -> Result<ShuffleRound, ShuffleError> {
        let local_index = group.index(&local_id).ok_or(ShuffleError::NotAMember)?;
        let count = group.count();

        let data = if data == default_data() {
            data
        } else if data.len() > BLOCK_SIZE {
            warn!(
                "attempted to send data larger than the block size: {} > {}",
                data.len(),
                BLOCK_SIZE
            );
            default_data()
        } else {
            prepare_data(&data)
        };

        let (inner_key, _) = ecies::make_random_keys(&mut OsRng);
        let (outer_key, _) = ecies::make_random_keys(&mut OsRng);

        Ok(ShuffleRound {
            group,
            local_id,
            local_index,
            session_id,
            round_id,
            signing_key,
            network,
            onion,
            data,
            state: State::Offline,
            blame_state: State::Offline,
            inner_key,
            outer_key,
            public_inner_keys: vec![None; count],
            public_outer_keys: vec![None; count],
            keys_received: 0,
            inner_ciphertext: Vec::new(),
            outer_ciphertext: Vec::new(),
            shuffle_ciphertext: Vec::new(),
            shuffle_cleartext: Vec::new(),
            data_received: 0,
            encrypted_data: Vec::new(),
            broadcast_hash: None,
            go: vec![false; count],
            go_received: vec![false; count],
            go_count: 0,
            broadcast_hashes: vec![None; count],
            private_inner_keys: vec![None; count],
            private_outer_keys: vec![None; count],
            logs: vec![None; count],
            blame_hash: vec![None; count],
            blame_signatures: vec![None; count],
            valid_blames: vec![false; count],
            received_blame_verification: vec![false; count],
            blame_data_received: 0,
            blame_verifications: 0,
            log: MessageLog::new(),
            bad_members: Vec::new(),
            successful: false,
        })
    }

    // ----------------------------------------------------------------------
    // Public API.
    // ----------------------------------------------------------------------

    /// Kick the round off by broadcasting the ephemeral public keys.
    pub fn start(&mut self) -> Result<(), ShuffleError> {
        if self.state != State::Offline {
            swarn!(self, "start() called more than once");
            return Err(ShuffleError::AlreadyStarted);
        }
        sinfo!(
            self,
            "starting round {} of session {}",
            self.round_id,
            self.session_id
        );
        if self.local_index == 0 {
            self.shuffle_ciphertext = vec![Vec::new(); self.group.count()];
        }
        self.broadcast_public_keys();
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Indexes of members proven to have violated the protocol. Non-empty
    /// only after a round that went through blame.
    pub fn bad_members(&self) -> &[usize] {
        &self.bad_members
    }

    /// Dispatch one inbound wire message. The message is logged first and
    /// the log rolled back if any check rejects it, so the log holds
    /// exactly the messages that entered the round state.
    pub fn process_data(&mut self, data: &[u8], from: &Id) {
        self.log.append(data.to_vec(), from.clone());
        if let Err(err) = self.process_data_base(data, from) {
            swarn!(
                self,
                "rejected a message from {} in round {}: {}",
                from,
                self.round_id,
                err
            );
            self.log.pop();
        }
    }

    // ----------------------------------------------------------------------
    // Dispatch.
    // ----------------------------------------------------------------------

    fn process_data_base(&mut self, data: &[u8], from: &Id) -> Result<(), ShuffleError> {
        let payload_bytes = self.verify_framing(data, from)?;
        let (rid, payload) = ShufflePayload::decode(payload_bytes)?;
        if rid != self.round_id {
            return Err(ShuffleError::WrongRound);
        }
        let idx = self.group.index(from).expect("framing checked membership");
        sdebug!(self, "received {} from {}", payload, idx);
        match payload {
            ShufflePayload::PublicKeys {
                inner_key,
                outer_key,
            } => self.handle_public_keys(idx, inner_key, outer_key),
            ShufflePayload::Data { ciphertext } => self.handle_data(idx, ciphertext),
            ShufflePayload::ShuffleData { blocks } => self.handle_shuffle(from, blocks),
            ShufflePayload::EncryptedData { blocks } => self.handle_data_broadcast(idx, blocks),
            ShufflePayload::Go { broadcast_hash } => {
                self.handle_verification(idx, true, Some(broadcast_hash))
            }
            ShufflePayload::NoGo => self.handle_verification(idx, false, None),
            ShufflePayload::PrivateKey { key } => self.handle_private_key(idx, key),
            ShufflePayload::BlameData {
                key,
                log,
                signature,
            } => self.handle_blame(idx, key, log, signature),
            ShufflePayload::BlameVerification {
                blame_hashes,
                blame_signatures,
            } => self.handle_blame_verification(idx, blame_hashes, blame_signatures),
        }
    }

    /// Split off and check the trailing signature; returns the payload.
    fn verify_framing<'a>(&self, data: &'a [u8], from: &Id) -> Result<&'a [u8], ShuffleError> {
        let key = self.group.key(from).ok_or(ShuffleError::UnknownSender)?;
        if data.len() < sig::SIGNATURE_SIZE {
            return Err(ShuffleError::TruncatedMessage);
        }
        let (payload, sig_bytes) = data.split_at(data.len() - sig::SIGNATURE_SIZE);
        let signature = sig::Signature::try_from_bytes(sig_bytes)
            .map_err(|_| ShuffleError::InvalidSignature)?;
        sig::validate_sig(key, payload, &signature)
            .map_err(|_| ShuffleError::InvalidSignature)?;
        Ok(payload)
    }

    /// Sign and broadcast, feeding our own copy through the local
    /// dispatcher first so the log sees it the way peers do.
    fn broadcast(&mut self, payload: &[u8]) {
        let mut msg = payload.to_vec();
        msg.extend_from_slice(&sig::sign(&self.signing_key, payload).to_bytes());
        let local = self.local_id.clone();
        self.process_data(&msg, &local);
        if let Err(err) = self.network.broadcast(msg) {
            serror!(self, "failed to broadcast: {}", err);
        }
    }

    /// Sign and unicast. A message to ourselves never touches the wire.
    fn send(&mut self, payload: &[u8], to: &Id) {
        let mut msg = payload.to_vec();
        msg.extend_from_slice(&sig::sign(&self.signing_key, payload).to_bytes());
        if *to == self.local_id {
            let local = self.local_id.clone();
            self.process_data(&msg, &local);
            return;
        }
        if let Err(err) = self.network.send(msg, to) {
            serror!(self, "failed to send to {}: {}", to, err);
        }
    }

    fn kidx(&self, idx: usize) -> usize {
        self.group.count() - 1 - idx
    }

    // ----------------------------------------------------------------------
    // Phase 1 - key sharing.
    // ----------------------------------------------------------------------

    fn broadcast_public_keys(&mut self) {
        self.state = State::KeySharing;
        let msg = ShufflePayload::PublicKeys {
            inner_key: self.inner_key.public_key().to_bytes().to_vec(),
            outer_key: self.outer_key.public_key().to_bytes().to_vec(),
        }
        .encode(&self.round_id);
        self.broadcast(&msg);
    }

    fn handle_public_keys(
        &mut self,
        idx: usize,
        inner_key: Vec<u8>,
        outer_key: Vec<u8>,
    ) -> Result<(), ShuffleError> {
        if self.state != State::Offline && self.state != State::KeySharing {
            return Err(ShuffleError::MisorderedMessage(
                "PublicKeys",
                self.state.name(),
            ));
        }
        let kidx = self.kidx(idx);
        if self.public_inner_keys[kidx].is_some() || self.public_outer_keys[kidx].is_some() {
            return Err(ShuffleError::DuplicateMessage("PublicKeys"));
        }
        let inner_key =
            ecies::PublicKey::try_from_bytes(&inner_key).map_err(|_| ShuffleError::InvalidKey)?;
        let outer_key =
            ecies::PublicKey::try_from_bytes(&outer_key).map_err(|_| ShuffleError::InvalidKey)?;
        self.public_inner_keys[kidx] = Some(inner_key);
        self.public_outer_keys[kidx] = Some(outer_key);

        self.keys_received += 1;
        if self.keys_received == self.group.count() {
            self.keys_received = 0;
            self.submit_data();
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Phase 2 - data submission.
    // ----------------------------------------------------------------------

    fn submit_data(&mut self) {
        self.state = State::DataSubmission;

        let inner_keys: Vec<ecies::PublicKey> = self
            .public_inner_keys
            .iter()
            .map(|key| key.clone().expect("all public keys received"))
            .collect();
        let outer_keys: Vec<ecies::PublicKey> = self
            .public_outer_keys
            .iter()
            .map(|key| key.clone().expect("all public keys received"))
            .collect();

        self.inner_ciphertext = self.onion.encrypt(&inner_keys, &self.data);
        self.outer_ciphertext = self.onion.encrypt(&outer_keys, &self.inner_ciphertext);
        sdebug!(
            self,
            "submitting {} bytes to the head",
            self.outer_ciphertext.len()
        );

        let msg = ShufflePayload::Data {
            ciphertext: self.outer_ciphertext.clone(),
        }
        .encode(&self.round_id);

        self.state = State::WaitingForShuffle;
        let head = self.group.id(0).clone();
        self.send(&msg, &head);
    }

    fn handle_data(&mut self, idx: usize, ciphertext: Vec<u8>) -> Result<(), ShuffleError> {
        if self.state != State::KeySharing
            && self.state != State::DataSubmission
            && self.state != State::WaitingForShuffle
        {
            return Err(ShuffleError::MisorderedMessage("Data", self.state.name()));
        }
        if self.local_index != 0 {
            return Err(ShuffleError::WrongNode);
        }
        if ciphertext.is_empty() {
            return Err(ShuffleError::EmptyData);
        }
        if !self.shuffle_ciphertext[idx].is_empty() {
            if self.shuffle_ciphertext[idx] != ciphertext {
                return Err(ShuffleError::ConflictingData);
            }
            return Err(ShuffleError::DuplicateMessage("Data"));
        }
        self.shuffle_ciphertext[idx] = ciphertext;

        self.data_received += 1;
        if self.data_received == self.group.count() {
            self.data_received = 0;
            self.shuffle();
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Phase 3 - the cascade.
    // ----------------------------------------------------------------------

    fn handle_shuffle(&mut self, from: &Id, blocks: Vec<Vec<u8>>) -> Result<(), ShuffleError> {
        if self.state != State::WaitingForShuffle {
            return Err(ShuffleError::MisorderedMessage(
                "ShuffleData",
                self.state.name(),
            ));
        }
        if self.group.previous(&self.local_id) != *from {
            return Err(ShuffleError::WrongSender);
        }
        self.shuffle_ciphertext = blocks;
        self.shuffle();
        Ok(())
    }

    fn shuffle(&mut self) {
        self.state = State::Shuffling;
        sdebug!(self, "shuffling {} blocks", self.shuffle_ciphertext.len());

        for idx in 0..self.shuffle_ciphertext.len() {
            for jdx in idx + 1..self.shuffle_ciphertext.len() {
                if self.shuffle_ciphertext[idx] == self.shuffle_ciphertext[jdx] {
                    swarn!(self, "found duplicate ciphertexts, blaming");
                    self.start_blame();
                    return;
                }
            }
        }

        let (cleartext, bad) = self.onion.decrypt(&self.outer_key, &self.shuffle_ciphertext);
        if !bad.is_empty() {
            swarn!(self, "failed to strip a layer at indexes {:?}, blaming", bad);
            self.start_blame();
            return;
        }
        self.shuffle_cleartext = cleartext;
        self.onion.randomize_blocks(&mut self.shuffle_cleartext);

        let next = self.group.next(&self.local_id);
        self.state = State::ShuffleDone;
        if next.is_zero() {
            let msg = ShufflePayload::EncryptedData {
                blocks: self.shuffle_cleartext.clone(),
            }
            .encode(&self.round_id);
            self.broadcast(&msg);
        } else {
            let msg = ShufflePayload::ShuffleData {
                blocks: self.shuffle_cleartext.clone(),
            }
            .encode(&self.round_id);
            self.send(&msg, &next);
        }
    }

    // ----------------------------------------------------------------------
    // Phases 4 and 5 - distribution and the equivocation check.
    // ----------------------------------------------------------------------

    fn handle_data_broadcast(&mut self, idx: usize, blocks: Vec<Vec<u8>>) -> Result<(), ShuffleError> {
        if self.state != State::ShuffleDone {
            return Err(ShuffleError::MisorderedMessage(
                "EncryptedData",
                self.state.name(),
            ));
        }
        if idx != self.group.count() - 1 {
            return Err(ShuffleError::WrongSender);
        }
        self.encrypted_data = blocks;
        self.verify();
        Ok(())
    }

    /// Check for our own block in the final vector and vote.
    fn verify(&mut self) {
        let found = self.encrypted_data.contains(&self.inner_ciphertext);
        let msg = if found {
            self.state = State::Verification;
            let mut hasher = Hasher::new();
            for key in &self.public_inner_keys {
                key.as_ref().expect("all public keys received").hash(&mut hasher);
            }
            for key in &self.public_outer_keys {
                key.as_ref().expect("all public keys received").hash(&mut hasher);
            }
            for block in &self.encrypted_data {
                block.hash(&mut hasher);
            }
            let broadcast_hash = hasher.result();
            self.broadcast_hash = Some(broadcast_hash);
            ShufflePayload::Go { broadcast_hash }
        } else {
            swarn!(self, "our message is missing from the shuffled output");
            ShufflePayload::NoGo
        };
        let msg = msg.encode(&self.round_id);
        self.broadcast(&msg);
    }

    fn handle_verification(
        &mut self,
        idx: usize,
        go: bool,
        broadcast_hash: Option<Hash>,
    ) -> Result<(), ShuffleError> {
        if self.state != State::Verification && self.state != State::ShuffleDone {
            return Err(ShuffleError::MisorderedMessage(
                "Go/NoGo",
                self.state.name(),
            ));
        }
        if self.go_received[idx] {
            return Err(ShuffleError::DuplicateMessage("Go/NoGo"));
        }
        self.go_received[idx] = true;
        self.go[idx] = go;
        self.broadcast_hashes[idx] = broadcast_hash;

        self.go_count += 1;
        if self.go_count < self.group.count() {
            return Ok(());
        }

        for idx in 0..self.group.count() {
            if !self.go[idx] || self.broadcast_hashes[idx] != self.broadcast_hash {
                self.start_blame();
                return Ok(());
            }
        }
        self.broadcast_private_key();
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Phase 6 - inner key revelation and final decryption.
    // ----------------------------------------------------------------------

    fn broadcast_private_key(&mut self) {
        sdebug!(self, "all votes agree, revealing the inner private key");
        self.state = State::PrivateKeySharing;
        let msg = ShufflePayload::PrivateKey {
            key: self.inner_key.to_bytes().to_vec(),
        }
        .encode(&self.round_id);
        self.broadcast(&msg);
    }

    fn handle_private_key(&mut self, idx: usize, key: Vec<u8>) -> Result<(), ShuffleError> {
        if self.state != State::Verification && self.state != State::PrivateKeySharing {
            return Err(ShuffleError::MisorderedMessage(
                "PrivateKey",
                self.state.name(),
            ));
        }
        if self.private_inner_keys[idx].is_some() {
            return Err(ShuffleError::DuplicateMessage("PrivateKey"));
        }
        let key = ecies::SecretKey::try_from_bytes(&key).map_err(|_| ShuffleError::InvalidKey)?;
        let kidx = self.kidx(idx);
        let public = self.public_inner_keys[kidx]
            .as_ref()
            .ok_or(ShuffleError::MissingKey)?;
        if !key.verify_key(public) {
            return Err(ShuffleError::InvalidKey);
        }
        self.private_inner_keys[idx] = Some(key);

        self.keys_received += 1;
        if self.keys_received == self.group.count() {
            self.keys_received = 0;
            self.decrypt();
        }
        Ok(())
    }

    fn decrypt(&mut self) {
        self.state = State::Decryption;

        let mut cleartexts = self.encrypted_data.clone();
        for idx in 0..self.group.count() {
            let key = self.private_inner_keys[idx]
                .as_ref()
                .expect("all private keys received");
            let (next, bad) = self.onion.decrypt(key, &cleartexts);
            if !bad.is_empty() {
                swarn!(
                    self,
                    "failed to strip the final layers at indexes {:?}",
                    bad
                );
                self.state = State::Finished;
                self.network.close("Round unsuccessfully finished.");
                return;
            }
            cleartexts = next;
        }

        for cleartext in cleartexts {
            let msg = get_data(&cleartext);
            if msg.is_empty() {
                continue;
            }
            sdebug!(self, "recovered a valid message of {} bytes", msg.len());
            if let Err(err) = self.network.push_data(msg, &self.local_id) {
                serror!(self, "failed to deliver a message: {}", err);
            }
        }
        self.successful = true;
        self.state = State::Finished;
        sinfo!(self, "round finished successfully");
        self.network.close("Round successfully finished.");
    }

    // ----------------------------------------------------------------------
    // Blame sub-protocol.
    // ----------------------------------------------------------------------

    /// Freeze the current state into the evidence and reveal our outer
    /// private key together with the full message log.
    fn start_blame(&mut self) {
        if self.state == State::BlameInit {
            swarn!(self, "already in the blame state");
            return;
        }
        sdebug!(self, "entering the blame state");
        self.blame_state = self.state;
        self.state = State::BlameInit;
        self.blame_verifications = 0;

        let key = self.outer_key.to_bytes().to_vec();
        let log = self.log.serialize();

        let mut hasher = Hasher::new();
        key.hash(&mut hasher);
        log.hash(&mut hasher);
        let proof = message::blame_proof(&self.round_id, &hasher.result().to_bytes());
        let signature = sig::sign(&self.signing_key, &proof);

        let msg = ShufflePayload::BlameData {
            key,
            log,
            signature: signature.to_bytes().to_vec(),
        }
        .encode(&self.round_id);
        self.broadcast(&msg);
    }

    fn handle_blame(
        &mut self,
        idx: usize,
        key: Vec<u8>,
        log: Vec<u8>,
        signature: Vec<u8>,
    ) -> Result<(), ShuffleError> {
        if self.state == State::Finished {
            return Err(ShuffleError::MisorderedMessage(
                "BlameData",
                self.state.name(),
            ));
        }
        if self.private_outer_keys[idx].is_some() {
            return Err(ShuffleError::DuplicateMessage("BlameData"));
        }

        let mut hasher = Hasher::new();
        key.hash(&mut hasher);
        log.hash(&mut hasher);
        let proof = message::blame_proof(&self.round_id, &hasher.result().to_bytes());
        let signature =
            sig::Signature::try_from_bytes(&signature).map_err(|_| ShuffleError::InvalidSignature)?;
        sig::validate_sig(self.group.key_by_index(idx), &proof, &signature)
            .map_err(|_| ShuffleError::InvalidSignature)?;

        let outer = ecies::SecretKey::try_from_bytes(&key).map_err(|_| ShuffleError::InvalidKey)?;
        let kidx = self.kidx(idx);
        let public = self.public_outer_keys[kidx]
            .as_ref()
            .ok_or(ShuffleError::MissingKey)?;
        if !outer.verify_key(public) {
            return Err(ShuffleError::InvalidKey);
        }
        let peer_log = MessageLog::deserialize(&log)?;

        self.private_outer_keys[idx] = Some(outer);
        self.logs[idx] = Some(peer_log);
        self.blame_hash[idx] = Some(proof);
        self.blame_signatures[idx] = Some(signature);

        self.blame_data_received += 1;
        if self.blame_data_received == self.group.count() {
            self.broadcast_blame_verification();
        } else if self.state != State::BlameInit {
            self.start_blame();
        }
        Ok(())
    }

    /// Tell everyone what evidence we observed from whom.
    fn broadcast_blame_verification(&mut self) {
        sdebug!(self, "broadcasting blame verification");
        self.state = State::BlameShare;
        let blame_hashes: Vec<Vec<u8>> = self
            .blame_hash
            .iter()
            .map(|hash| hash.clone().expect("all blame data received"))
            .collect();
        let blame_signatures: Vec<Vec<u8>> = self
            .blame_signatures
            .iter()
            .map(|signature| {
                signature
                    .as_ref()
                    .expect("all blame data received")
                    .to_bytes()
                    .to_vec()
            })
            .collect();
        let msg = ShufflePayload::BlameVerification {
            blame_hashes,
            blame_signatures,
        }
        .encode(&self.round_id);
        self.broadcast(&msg);
    }

    // A differing claim about node j is accepted as proof of j's
    // equivocation only if the *sender* signed that claim: the sender
    // stakes its own long-term key on it.
    fn handle_blame_verification(
        &mut self,
        idx: usize,
        blame_hashes: Vec<Vec<u8>>,
        blame_signatures: Vec<Vec<u8>>,
    ) -> Result<(), ShuffleError> {
        if self.state == State::Finished {
            return Err(ShuffleError::MisorderedMessage(
                "BlameVerification",
                self.state.name(),
            ));
        }
        if self.received_blame_verification[idx] {
            return Err(ShuffleError::DuplicateMessage("BlameVerification"));
        }
        let count = self.group.count();
        if blame_hashes.len() != count || blame_signatures.len() != count {
            return Err(ShuffleError::MalformedMessage(
                "missing blame hashes or signatures".to_string(),
            ));
        }

        let mut newly_valid = Vec::new();
        for jdx in 0..count {
            if self.blame_hash[jdx].as_ref() == Some(&blame_hashes[jdx]) {
                continue;
            }
            let proof = message::blame_proof(&self.round_id, &blame_hashes[jdx]);
            let signature = sig::Signature::try_from_bytes(&blame_signatures[jdx])
                .map_err(|_| ShuffleError::InvalidSignature)?;
            sig::validate_sig(self.group.key_by_index(idx), &proof, &signature)
                .map_err(|_| ShuffleError::InvalidSignature)?;
            newly_valid.push(jdx);
        }
        for jdx in newly_valid {
            self.valid_blames[jdx] = true;
        }

        self.received_blame_verification[idx] = true;
        self.blame_verifications += 1;
        if self.blame_verifications == self.group.count() {
            self.blame_round();
        }
        Ok(())
    }

    /// Conclude: equivocators found during cross-verification are named
    /// directly; otherwise the forensic replayer walks the evidence.
    fn blame_round(&mut self) {
        sdebug!(
            self,
            "entering the blame round, stalled in {}",
            self.blame_state.name()
        );
        for idx in 0..self.group.count() {
            if self.valid_blames[idx] {
                swarn!(self, "bad node: {}", idx);
                self.bad_members.push(idx);
            }
        }

        if self.bad_members.is_empty() {
            let logs: Vec<MessageLog> = self
                .logs
                .iter()
                .map(|log| log.clone().expect("all blame data received"))
                .collect();
            let outer_keys: Vec<ecies::SecretKey> = self
                .private_outer_keys
                .iter()
                .map(|key| key.clone().expect("all blame data received"))
                .collect();
            let mut blamer =
                ShuffleBlamer::new(&self.group, self.round_id.clone(), logs, outer_keys);
            blamer.start();
            for (idx, bad) in blamer.bad_nodes().iter().enumerate() {
                if *bad {
                    swarn!(self, "bad node: {}", idx);
                    self.bad_members.push(idx);
                }
            }
        }

        self.state = State::Finished;
        self.network.close("Round unsuccessfully finished.");
    }
}

#[cfg(test)]
mod tests {
    use super::message::{
        ShufflePayload, TAG_DATA, TAG_ENCRYPTED_DATA, TAG_GO, TAG_NO_GO, TAG_PRIVATE_KEY,
        TAG_PUBLIC_KEYS,
    };
    use super::*;
    use crate::group::ID_SIZE;
    use crate::loopback::{LoopbackHub, QueuedMessage};
    use byteorder::{ByteOrder, LittleEndian};

    const N: usize = 3;

    struct Sim {
        hub: LoopbackHub,
        rounds: Vec<ShuffleRound>,
        ids: Vec<Id>,
        sig_skeys: Vec<sig::SecretKey>,
        round_id: Id,
    }

    fn make_group() -> (Vec<(Id, sig::PublicKey)>, Vec<Id>, Vec<sig::SecretKey>) {
        let mut members = Vec::new();
        let mut ids = Vec::new();
        let mut skeys = Vec::new();
        for ix in 0..N {
            let id = Id::from_bytes([(ix + 1) as u8; ID_SIZE]);
            let (skey, pkey) = sig::make_deterministic_keys(format!("User_{}", ix).as_bytes());
            ids.push(id.clone());
            members.push((id, pkey));
            skeys.push(skey);
        }
        (members, ids, skeys)
    }

    fn make_sim(payloads: Vec<Vec<u8>>) -> Sim {
        assert_eq!(payloads.len(), N);
        let (members, ids, sig_skeys) = make_group();
        let hub = LoopbackHub::new();
        let session_id = Id::from_bytes([0xaa; ID_SIZE]);
        let round_id = Id::from_bytes([0xbb; ID_SIZE]);

        let mut rounds = Vec::new();
        for (ix, data) in payloads.into_iter().enumerate() {
            let round = ShuffleRound::new(
                Group::new(members.clone()),
                ids[ix].clone(),
                session_id.clone(),
                round_id.clone(),
                sig_skeys[ix].clone(),
                data,
                hub.network(&ids[ix]),
                OnionEncryptor::from_seed(ix as u64),
            )
            .expect("member of the group");
            rounds.push(round);
        }
        Sim {
            hub,
            rounds,
            ids,
            sig_skeys,
            round_id,
        }
    }

    fn deliver(rounds: &mut Vec<ShuffleRound>, msg: &QueuedMessage) {
        match &msg.to {
            Some(to) => {
                if let Some(round) = rounds.iter_mut().find(|r| r.local_id == *to) {
                    round.process_data(&msg.data, &msg.from);
                }
            }
            None => {
                for round in rounds.iter_mut() {
                    if round.local_id != msg.from {
                        round.process_data(&msg.data, &msg.from);
                    }
                }
            }
        }
    }

    fn pump(sim: &mut Sim) {
        while let Some(msg) = sim.hub.pop_message() {
            deliver(&mut sim.rounds, &msg);
        }
    }

    fn start_all(sim: &mut Sim) {
        for round in sim.rounds.iter_mut() {
            round.start().expect("first start");
        }
    }

    fn payload_tag(wire: &[u8]) -> Option<u32> {
        if wire.len() < 4 + sig::SIGNATURE_SIZE {
            return None;
        }
        Some(LittleEndian::read_u32(&wire[..4]))
    }

    fn sorted(mut blocks: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
        blocks.sort();
        blocks
    }

    fn resign(sim: &Sim, sender: usize, payload: &ShufflePayload) -> Vec<u8> {
        let mut msg = payload.encode(&sim.round_id);
        let signature = sig::sign(&sim.sig_skeys[sender], &msg);
        msg.extend_from_slice(&signature.to_bytes());
        msg
    }

    // ------------------------------------------------------------------
    // Block framing.
    // ------------------------------------------------------------------

    #[test]
    fn tst_prepare_and_get_data() {
        let data = b"alpha";
        let block = prepare_data(data);
        assert_eq!(block.len(), BLOCK_SIZE + 4);
        assert_eq!(get_data(&block), data.to_vec());

        assert!(get_data(&default_data()).is_empty());
        assert!(get_data(&[1, 2]).is_empty());

        // a length prefix pointing past the block is dropped
        let mut bogus = default_data();
        LittleEndian::write_u32(&mut bogus[..4], (BLOCK_SIZE + 1) as u32);
        assert!(get_data(&bogus).is_empty());

        let empty = prepare_data(b"");
        assert_eq!(empty, default_data());
    }

    #[test]
    fn tst_oversized_data_is_replaced() {
        let sim = make_sim(vec![
            vec![0xee; BLOCK_SIZE + 1],
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        assert_eq!(sim.rounds[0].data, default_data());
        assert_eq!(sim.rounds[1].data, prepare_data(b"bravo"));
    }

    // ------------------------------------------------------------------
    // Scenario 1 - the happy path.
    // ------------------------------------------------------------------

    #[test]
    fn tst_happy_path() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        start_all(&mut sim);
        pump(&mut sim);

        let expected = sorted(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        for ix in 0..N {
            let round = &sim.rounds[ix];
            assert_eq!(round.state(), State::Finished);
            assert!(round.is_successful());
            assert!(round.bad_members().is_empty());
            assert_eq!(sorted(sim.hub.delivered(&sim.ids[ix])), expected);
            assert_eq!(
                sim.hub.close_reason(&sim.ids[ix]),
                Some("Round successfully finished.".to_string())
            );
        }
    }

    // ------------------------------------------------------------------
    // Scenario 2 - a member with nothing to say.
    // ------------------------------------------------------------------

    #[test]
    fn tst_default_data_is_dropped() {
        let mut sim = make_sim(vec![b"alpha".to_vec(), b"bravo".to_vec(), default_data()]);
        start_all(&mut sim);
        pump(&mut sim);

        let expected = sorted(vec![b"alpha".to_vec(), b"bravo".to_vec()]);
        for ix in 0..N {
            assert!(sim.rounds[ix].is_successful());
            assert_eq!(sorted(sim.hub.delivered(&sim.ids[ix])), expected);
        }
    }

    // ------------------------------------------------------------------
    // Scenario 3 - oversized input degrades to the default block.
    // ------------------------------------------------------------------

    #[test]
    fn tst_oversized_input_round() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            vec![0xee; BLOCK_SIZE + 1],
            b"charlie".to_vec(),
        ]);
        start_all(&mut sim);
        pump(&mut sim);

        let expected = sorted(vec![b"alpha".to_vec(), b"charlie".to_vec()]);
        for ix in 0..N {
            assert!(sim.rounds[ix].is_successful());
            assert_eq!(sorted(sim.hub.delivered(&sim.ids[ix])), expected);
        }
    }

    // ------------------------------------------------------------------
    // Scenario 4 - the tail equivocates on the final broadcast.
    // ------------------------------------------------------------------

    #[test]
    fn tst_equivocating_tail_is_blamed() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        start_all(&mut sim);

        let mut tampered = false;
        while let Some(msg) = sim.hub.pop_message() {
            let is_final_broadcast = !tampered
                && msg.to.is_none()
                && msg.from == sim.ids[N - 1]
                && payload_tag(&msg.data) == Some(TAG_ENCRYPTED_DATA);
            if !is_final_broadcast {
                deliver(&mut sim.rounds, &msg);
                continue;
            }
            tampered = true;

            // member 1's block is replaced in the copy sent to member 1
            let payload = &msg.data[..msg.data.len() - sig::SIGNATURE_SIZE];
            let (_, decoded) = ShufflePayload::decode(payload).unwrap();
            let mut blocks = match decoded {
                ShufflePayload::EncryptedData { blocks } => blocks,
                other => panic!("expected EncryptedData, got {}", other),
            };
            let target = sim.rounds[1].inner_ciphertext.clone();
            let slot = blocks
                .iter()
                .position(|b| *b == target)
                .expect("member 1's block is present in the honest copy");
            blocks[slot] = vec![0u8; target.len()];
            let doctored = resign(&sim, N - 1, &ShufflePayload::EncryptedData { blocks });

            let from = msg.from.clone();
            sim.rounds[0].process_data(&msg.data, &from);
            sim.rounds[1].process_data(&doctored, &from);
        }
        assert!(tampered);

        for ix in 0..N {
            let round = &sim.rounds[ix];
            assert_eq!(round.state(), State::Finished);
            assert!(!round.is_successful());
            assert_eq!(round.bad_members(), &[N - 1]);
            assert!(sim.hub.delivered(&sim.ids[ix]).is_empty());
            assert_eq!(
                sim.hub.close_reason(&sim.ids[ix]),
                Some("Round unsuccessfully finished.".to_string())
            );
        }
    }

    // ------------------------------------------------------------------
    // Scenario 5 - two submissions collide at the head.
    // ------------------------------------------------------------------

    #[test]
    fn tst_duplicate_submissions_are_blamed() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        start_all(&mut sim);

        let mut captured: Option<Vec<u8>> = None;
        let mut tampered = false;
        while let Some(msg) = sim.hub.pop_message() {
            if !tampered && payload_tag(&msg.data) == Some(TAG_DATA) {
                let payload = &msg.data[..msg.data.len() - sig::SIGNATURE_SIZE];
                let (_, decoded) = ShufflePayload::decode(payload).unwrap();
                let ciphertext = match decoded {
                    ShufflePayload::Data { ciphertext } => ciphertext,
                    other => panic!("expected Data, got {}", other),
                };
                match captured.take() {
                    None => captured = Some(ciphertext),
                    Some(stolen) => {
                        // the second submitter replays the first submission
                        // as its own
                        tampered = true;
                        let sender = sim
                            .ids
                            .iter()
                            .position(|id| *id == msg.from)
                            .expect("known sender");
                        let doctored =
                            resign(&sim, sender, &ShufflePayload::Data { ciphertext: stolen });
                        deliver(
                            &mut sim.rounds,
                            &QueuedMessage {
                                from: msg.from.clone(),
                                to: msg.to.clone(),
                                data: doctored,
                            },
                        );
                        continue;
                    }
                }
            }
            deliver(&mut sim.rounds, &msg);
        }
        assert!(tampered);

        for ix in 0..N {
            let round = &sim.rounds[ix];
            assert_eq!(round.state(), State::Finished);
            assert!(!round.is_successful());
            assert_eq!(round.bad_members(), &[1, 2]);
        }
    }

    // ------------------------------------------------------------------
    // Scenario 6 - a forged signature never touches the state or the log.
    // ------------------------------------------------------------------

    #[test]
    fn tst_forged_signature_leaves_state_untouched() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        sim.rounds[0].start().unwrap();

        let log_len = sim.rounds[0].log.len();
        let keys_received = sim.rounds[0].keys_received;

        // a PublicKeys message "from" member 2, signed with member 0's key
        let (_, inner_pk) = ecies::make_deterministic_keys(b"forged_inner");
        let (_, outer_pk) = ecies::make_deterministic_keys(b"forged_outer");
        let forged = resign(
            &sim,
            0,
            &ShufflePayload::PublicKeys {
                inner_key: inner_pk.to_bytes().to_vec(),
                outer_key: outer_pk.to_bytes().to_vec(),
            },
        );
        let from = sim.ids[2].clone();
        sim.rounds[0].process_data(&forged, &from);

        let round = &sim.rounds[0];
        assert_eq!(round.log.len(), log_len);
        assert_eq!(round.keys_received, keys_received);
        let kidx = round.kidx(2);
        assert!(round.public_inner_keys[kidx].is_none());
        assert!(round.public_outer_keys[kidx].is_none());
        assert_eq!(round.state(), State::KeySharing);
    }

    // ------------------------------------------------------------------
    // Replayed broadcasts never advance any counter twice.
    // ------------------------------------------------------------------

    #[test]
    fn tst_replayed_messages_are_rejected() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        start_all(&mut sim);

        while let Some(msg) = sim.hub.pop_message() {
            deliver(&mut sim.rounds, &msg);
            let tag = payload_tag(&msg.data);
            if msg.to.is_none()
                && (tag == Some(TAG_PUBLIC_KEYS)
                    || tag == Some(TAG_GO)
                    || tag == Some(TAG_NO_GO)
                    || tag == Some(TAG_PRIVATE_KEY))
            {
                // replay the exact same wire bytes once more
                deliver(&mut sim.rounds, &msg);
            }
        }

        for ix in 0..N {
            assert!(sim.rounds[ix].is_successful());
            assert_eq!(sim.rounds[ix].go_count, N);
        }
    }

    #[test]
    fn tst_start_twice_fails() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        sim.rounds[0].start().unwrap();
        assert_eq!(sim.rounds[0].start(), Err(ShuffleError::AlreadyStarted));
    }

    // ------------------------------------------------------------------
    // Blame cross-verification accepts a differing claim only under the
    // sender's own long-term key.
    // ------------------------------------------------------------------

    #[test]
    fn tst_blame_verification_uses_sender_key() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);

        // pretend we already observed consistent evidence from everyone
        let ours: Vec<Vec<u8>> = (0..N)
            .map(|jdx| message::blame_proof(&sim.round_id, format!("claim_{}", jdx).as_bytes()))
            .collect();
        for jdx in 0..N {
            sim.rounds[0].blame_hash[jdx] = Some(ours[jdx].clone());
        }

        // member 0 claims to have seen something else from member 1,
        // staking its own key on the claim
        let mut claims = ours.clone();
        claims[1] = message::blame_proof(&sim.round_id, b"a different view");
        let proof = message::blame_proof(&sim.round_id, &claims[1]);

        let signed_by_sender = sig::sign(&sim.sig_skeys[0], &proof);
        let mut signatures = vec![vec![0u8; sig::SIGNATURE_SIZE]; N];
        signatures[1] = signed_by_sender.to_bytes().to_vec();

        sim.rounds[0]
            .handle_blame_verification(0, claims.clone(), signatures)
            .unwrap();
        assert!(sim.rounds[0].valid_blames[1]);
        assert!(!sim.rounds[0].valid_blames[0]);
        assert!(sim.rounds[0].received_blame_verification[0]);

        // the same claim signed by the accused member's key is rejected
        // outright and mutates nothing
        let signed_by_subject = sig::sign(&sim.sig_skeys[1], &proof);
        let mut signatures = vec![vec![0u8; sig::SIGNATURE_SIZE]; N];
        signatures[1] = signed_by_subject.to_bytes().to_vec();

        let result = sim.rounds[1].handle_blame_verification(0, claims, signatures);
        assert_eq!(result, Err(ShuffleError::InvalidSignature));
        assert!(!sim.rounds[1].valid_blames[1]);
        assert!(!sim.rounds[1].received_blame_verification[0]);
    }

    // ------------------------------------------------------------------
    // Misordered and misaddressed messages are rejected without side
    // effects.
    // ------------------------------------------------------------------

    #[test]
    fn tst_misordered_messages_are_rejected() {
        let mut sim = make_sim(vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
        ]);
        sim.rounds[0].start().unwrap();
        let log_len = sim.rounds[0].log.len();

        // a PrivateKey long before the verification phase
        let (esk, _) = ecies::make_deterministic_keys(b"stray");
        let stray = resign(
            &sim,
            1,
            &ShufflePayload::PrivateKey {
                key: esk.to_bytes().to_vec(),
            },
        );
        let from = sim.ids[1].clone();
        sim.rounds[0].process_data(&stray, &from);
        assert_eq!(sim.rounds[0].log.len(), log_len);
        assert!(sim.rounds[0].private_inner_keys[1].is_none());

        // data sent to a non-head member
        let stray = resign(
            &sim,
            0,
            &ShufflePayload::Data {
                ciphertext: vec![1; 16],
            },
        );
        sim.rounds[1].start().unwrap();
        let log_len = sim.rounds[1].log.len();
        let from = sim.ids[0].clone();
        sim.rounds[1].process_data(&stray, &from);
        assert_eq!(sim.rounds[1].log.len(), log_len);

        // a message for some other round
        let other_round = Id::from_bytes([0xcc; ID_SIZE]);
        let mut msg = ShufflePayload::NoGo.encode(&other_round);
        let signature = sig::sign(&sim.sig_skeys[1], &msg);
        msg.extend_from_slice(&signature.to_bytes());
        let log_len = sim.rounds[0].log.len();
        let from = sim.ids[1].clone();
        sim.rounds[0].process_data(&msg, &from);
        assert_eq!(sim.rounds[0].log.len(), log_len);
        assert!(!sim.rounds[0].go_received[1]);
    }
}
