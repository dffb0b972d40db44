//! Wire-format constants and buffer-pool sizing defaults.
//!
//! Grouped the way the upstream protocol defines them: framing octets,
//! FCS seeds, well-known protocol numbers, and the buffer-pool defaults
//! that size a [`crate::buffer::BufferPool`] when an application doesn't
//! pick its own.

// -----------------------------------------------------------------------
// HDLC-like async framing octets (RFC 1662)
// -----------------------------------------------------------------------

/// Frame delimiter.
pub const PPP_FLAG: u8 = 0x7E;
/// Escape octet: the following byte is XORed with [`PPP_TRANS`].
pub const PPP_ESCAPE: u8 = 0x7D;
/// XOR mask applied by the escape mechanism.
pub const PPP_TRANS: u8 = 0x20;
/// HDLC "all stations" address field.
pub const PPP_ALLSTATIONS: u8 = 0xFF;
/// HDLC unnumbered information control field.
pub const PPP_UI: u8 = 0x03;

// -----------------------------------------------------------------------
// FCS
// -----------------------------------------------------------------------

/// FCS accumulator seed.
pub const PPP_INITFCS: u16 = 0xFFFF;
/// FCS residue a correctly received frame (header+payload+FCS) folds to.
pub const PPP_GOODFCS: u16 = 0xF0B8;
/// Reversed CRC-16/CCITT polynomial used by the FCS engine.
pub const PPP_FCS_POLYNOMIAL: u16 = 0x8408;
/// Size in bytes of the on-wire FCS field.
pub const FCS_SIZE: usize = 2;

// -----------------------------------------------------------------------
// Protocol numbers
// -----------------------------------------------------------------------

/// IP protocol number (uncompressed, no VJ).
pub const PPP_IP: u16 = 0x0021;
/// VJ-compressed TCP/IP protocol number.
pub const PPP_VJC_COMP: u16 = 0x002D;
/// VJ-uncompressed TCP/IP protocol number.
pub const PPP_VJC_UNCOMP: u16 = 0x002F;

// -----------------------------------------------------------------------
// Timing
// -----------------------------------------------------------------------

/// Default idle window (in caller-defined ticks) before a leading flag is
/// forced onto the next transmitted frame.
pub const PPP_MAXIDLEFLAG: u32 = 100;

// -----------------------------------------------------------------------
// Buffer pool defaults
// -----------------------------------------------------------------------

/// Default per-buffer payload capacity for [`crate::buffer::BufferPool`].
pub const DEFAULT_BUFFER_SIZE: usize = 128;
/// Default buffer count for [`crate::buffer::BufferPool`].
pub const DEFAULT_POOL_BUFFERS: usize = 16;
/// Minimum buffer capacity the pool's trim/escape-pair logic is correct for.
///
/// The FCS trim walks back at most one buffer boundary (see
/// [`crate::buffer::BufferPool::trim_tail`]); this only holds when every
/// buffer can hold at least the 2-byte FCS plus at least 2 bytes of
/// whatever preceded it.
pub const MIN_BUFFER_SIZE: usize = 4;

/// Default depth of the cross-thread RX dispatch queue (feature
/// `critical-section`).
pub const RX_DISPATCH_QUEUE_DEPTH: usize = 8;
