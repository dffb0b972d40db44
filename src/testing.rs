//! Host-side mocks for the two upper trait contracts, shared by this
//! crate's own unit tests.
//!
//! Mirrors the teacher's `test_utils.rs`: plain recorder structs backed by
//! `std::vec::Vec`, reached through `extern crate std` since the crate
//! itself stays `#![no_std]`.

extern crate std;

use std::vec::Vec;

use crate::upper::{LinkId, SerialWrite, UpperEngine};

/// A [`SerialWrite`] that accepts everything and records what it saw.
#[derive(Debug, Default)]
pub struct Recorder {
    /// Every byte handed to [`SerialWrite::write`], in order.
    pub written: Vec<u8>,
}

impl Recorder {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SerialWrite for Recorder {
    fn write(&mut self, bytes: &[u8]) -> usize {
        self.written.extend_from_slice(bytes);
        bytes.len()
    }
}

/// A [`SerialWrite`] that only accepts up to `allow` bytes total across all
/// calls, then starts returning short counts — for exercising the TX
/// short-write recovery path.
#[derive(Debug)]
pub struct ShortWriter {
    /// Remaining byte budget.
    pub allow: usize,
    /// Bytes actually accepted so far.
    pub written: Vec<u8>,
}

impl ShortWriter {
    /// A writer that accepts exactly `allow` bytes in total.
    #[must_use]
    pub fn new(allow: usize) -> Self {
        Self { allow, written: Vec::new() }
    }
}

impl SerialWrite for ShortWriter {
    fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.allow);
        self.allow -= n;
        self.written.extend_from_slice(&bytes[..n]);
        n
    }
}

/// An [`UpperEngine`] that records every callback it receives, for
/// asserting on lifecycle/delivery ordering without a real PPP stack.
#[derive(Debug, Default)]
pub struct Spy {
    /// `(link, protocol, payload_head, total_len)` from each `input` call.
    pub delivered: Vec<(LinkId, u16, u16, usize)>,
    /// Links that received a `clear` callback.
    pub cleared: Vec<LinkId>,
    /// Links that received a `start` callback.
    pub started: Vec<LinkId>,
    /// Links that received a `link_end` callback.
    pub ended: Vec<LinkId>,
}

impl Spy {
    /// A spy with no recorded callbacks yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpperEngine for Spy {
    fn input(&mut self, link: LinkId, protocol: u16, payload: u16, total_len: usize) {
        self.delivered.push((link, protocol, payload, total_len));
    }
    fn start(&mut self, link: LinkId) {
        self.started.push(link);
    }
    fn link_end(&mut self, link: LinkId) {
        self.ended.push(link);
    }
    fn clear(&mut self, link: LinkId) {
        self.cleared.push(link);
    }
}

/// An [`UpperEngine`] that ignores every callback, for tests exercising
/// only the RX/TX byte paths.
#[derive(Debug, Default)]
pub struct NoopEngine;

impl UpperEngine for NoopEngine {
    fn input(&mut self, _link: LinkId, _protocol: u16, _payload: u16, _total_len: usize) {}
    fn start(&mut self, _link: LinkId) {}
    fn link_end(&mut self, _link: LinkId) {}
    fn clear(&mut self, _link: LinkId) {}
}
