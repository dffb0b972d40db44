//! The two narrow trait contracts the core is polymorphic over, plus the
//! small vocabulary types shared across the link adapter's public API.
//!
//! The core needs exactly two capability sets from its surroundings: a
//! place to write framed bytes (`SerialWrite`), and somewhere to deliver
//! recovered frames and lifecycle notifications (`UpperEngine`). Neither
//! trait requires allocation or `dyn` dispatch; a [`crate::link::Link`] is
//! generic over both.

/// Identifies one link within a process, for cross-thread dispatch of
/// recovered frames (see [`crate::sync::RxDispatchQueue`]).
///
/// A typed, copyable handle rather than a raw pointer — the original
/// source embeds a backpointer to the upper engine in the pbuf's reserved
/// prefix; a memory-safe rewrite resolves a handle through a table instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkId(pub u8);

/// Lifecycle commands the upper engine issues to the link adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Bring the link up: reset framing state, initialize ACCM/VJ, start
    /// LCP.
    Connect,
    /// Tear the link down without releasing it.
    Disconnect,
    /// Release the link context entirely.
    Free,
}

/// Result of [`crate::link::Link::write`] (pre-framed PPP write).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// Handled (successfully transmitted, or dropped for a recoverable
    /// reason already reflected in the TX stats).
    None,
    /// The escaped output chain could not be built: the buffer pool was
    /// exhausted.
    Alloc,
}

/// Result of [`crate::link::Link::netif_output`] (IP packet + protocol
/// tag, with optional VJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetifOutcome {
    /// Transmitted (or dropped for a reason already reflected in stats).
    Ok,
    /// The escaped output chain could not be built: the buffer pool was
    /// exhausted.
    Mem,
    /// The VJ compressor returned a type this crate can't tag a protocol
    /// number for.
    Val,
}

/// The serial device side: a byte sink with a single write primitive.
///
/// `write` must return the number of bytes actually accepted; a short
/// write (fewer than `bytes.len()`) signals failure to the caller, which
/// aborts the remainder of the current frame and forces a leading flag on
/// the next one. Implementations must not block indefinitely or panic on
/// a full transmit buffer — return a short count instead.
pub trait SerialWrite {
    /// Writes as many of `bytes` as the device currently accepts.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

/// The upper PPP engine side: where recovered frames and lifecycle events
/// go.
pub trait UpperEngine {
    /// Delivers one fully verified, deframed `(protocol, payload)` packet.
    /// `payload` is the pool chain head; the engine takes ownership and is
    /// responsible for eventually freeing it back to the pool.
    fn input(&mut self, link: LinkId, protocol: u16, payload: u16, total_len: usize);

    /// Begin LCP negotiation on a newly connected link.
    fn start(&mut self, link: LinkId);

    /// Notify the engine that the link has gone down.
    fn link_end(&mut self, link: LinkId);

    /// Reset any per-session upper-layer state (called on `CONNECT`, before
    /// `start`).
    fn clear(&mut self, link: LinkId);
}
