//! `no_std`, `no_alloc` HDLC-style async framer for PPP-over-Serial (RFC 1662).
//!
//! # Architecture
//!
//! - [`fcs`] — the 16-bit frame check sequence, table-based by default or
//!   bitwise under the `compact-fcs` feature.
//! - [`accm`] — the Async Control Character Map, the per-direction "which
//!   bytes must be escaped" mask.
//! - [`buffer`] — a fixed-capacity, index-linked buffer pool and the
//!   append-cursor both [`rx`] and [`tx`] drive a byte at a time.
//! - [`rx`] — the byte-driven deframing state machine.
//! - [`tx`] — the framer/escaper, entered either with an already-framed
//!   payload or with a raw IP packet plus ACFC/PFC/VJ handling.
//! - [`vj`] — the trait seam for an optional Van Jacobson TCP/IP header
//!   compressor; this crate does not implement VJ itself.
//! - [`upper`] — the two narrow trait contracts ([`upper::SerialWrite`],
//!   [`upper::UpperEngine`]) the core is polymorphic over.
//! - [`link`] — [`link::Link`], the object that ties one link's RX/TX
//!   framers, ACCMs, and configuration together.
//! - [`sync`] (feature `critical-section`) — interrupt-safe ACCM sharing
//!   and a cross-thread RX dispatch queue, plus (feature `async`) an
//!   `AtomicWaker` for awaiting queued frames.
//!
//! # Example
//!
//! ```
//! use pppos::buffer::BufferPool;
//! use pppos::link::{Link, LinkConfig};
//! use pppos::upper::{Command, LinkId, SerialWrite, UpperEngine};
//!
//! struct Serial(std::vec::Vec<u8>);
//! impl SerialWrite for Serial {
//!     fn write(&mut self, bytes: &[u8]) -> usize {
//!         self.0.extend_from_slice(bytes);
//!         bytes.len()
//!     }
//! }
//!
//! struct Engine;
//! impl UpperEngine for Engine {
//!     fn input(&mut self, _link: LinkId, _protocol: u16, _payload: u16, _total_len: usize) {}
//!     fn start(&mut self, _link: LinkId) {}
//!     fn link_end(&mut self, _link: LinkId) {}
//!     fn clear(&mut self, _link: LinkId) {}
//! }
//!
//! let mut pool: BufferPool<16, 128> = BufferPool::new();
//! let mut link = Link::new(LinkId(0), LinkConfig::new());
//! let mut engine = Engine;
//! link.handle_command(Command::Connect, &mut pool, &mut engine);
//!
//! let mut serial = Serial(std::vec::Vec::new());
//! link.write(&mut pool, &mut serial, 0, &[0xFF, 0x03, 0xC0, 0x21, 0x09, 0x01, 0x00, 0x04]);
//! ```
#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

pub mod accm;
pub mod buffer;
pub mod constants;
pub mod error;
pub mod fcs;
pub mod link;
pub mod rx;
pub mod stats;
#[cfg(feature = "critical-section")]
pub mod sync;
#[cfg(test)]
pub(crate) mod testing;
pub mod tx;
pub mod upper;
pub mod vj;

pub use accm::Accm;
pub use buffer::BufferPool;
pub use error::PoolError;
pub use link::{Link, LinkConfig};
pub use rx::{RxDelivery, RxFramer, RxState};
pub use stats::{RxStats, TxStats};
pub use tx::TxFramer;
pub use upper::{Command, LinkId, NetifOutcome, SerialWrite, UpperEngine, WriteOutcome};
pub use vj::{PassthroughVj, VjCompressor, VjOutcome};
