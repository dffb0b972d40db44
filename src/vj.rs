//! Van Jacobson TCP/IP header compression boundary.
//!
//! The VJ algorithm itself is out of scope for this crate; this module only
//! defines the trait seam the TX framer calls through, plus a
//! [`PassthroughVj`] implementation that always reports the packet as plain
//! IP, for use where VJ is disabled or unavailable.

/// What [`VjCompressor::compress_ip`] determined about an outgoing packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VjOutcome {
    /// Send as plain, uncompressed IP (`PPP_IP`).
    Ip,
    /// Send as a VJ-compressed TCP segment (`PPP_VJC_COMP`).
    CompressedTcp,
    /// Send as a VJ "uncompressed TCP" frame (`PPP_VJC_UNCOMP`): full
    /// headers, but the VJ connection-state slot is still recorded.
    UncompressedTcp,
    /// The compressor doesn't know what to do with this packet; the caller
    /// must drop it with a protocol error.
    Unsupported,
}

/// The capability set the link adapter needs from a VJ compressor.
///
/// `reset` is called by [`crate::link::Link::handle_command`] on `CONNECT`;
/// `compress_ip` is the only method the TX netif-output path calls. The
/// remaining three describe the ingress side a full VJ implementation would
/// also need, kept here so the trait documents the complete contract even
/// though this crate's RX path (receiving compressed TCP) is not specified
/// by the framer core and is left to the upper engine.
pub trait VjCompressor {
    /// Reinitializes all connection-slot state. Called on `CONNECT`, before
    /// any traffic flows, matching `pppos_connect`'s VJ reinitialization.
    fn reset(&mut self);

    /// Inspects (and potentially rewrites in place) an outgoing IP packet,
    /// returning how its protocol number should be tagged.
    fn compress_ip(&mut self, packet: &mut [u8]) -> VjOutcome;

    /// Reconstructs a full header from a VJ-compressed TCP segment.
    fn uncompress_compressed(&mut self, packet: &[u8]) -> Option<usize>;

    /// Records connection state from a VJ "uncompressed TCP" frame without
    /// altering it.
    fn uncompress_uncompressed(&mut self, packet: &[u8]) -> bool;

    /// Notifies the compressor that a decompression error occurred so it
    /// can invalidate any per-connection state it was relying on.
    fn uncompress_error(&mut self);
}

/// A no-op compressor: every outgoing packet is tagged plain IP.
///
/// Used when VJ is disabled (or unimplemented) so the TX framer's VJ call
/// site has something to call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughVj;

impl VjCompressor for PassthroughVj {
    fn reset(&mut self) {}

    fn compress_ip(&mut self, _packet: &mut [u8]) -> VjOutcome {
        VjOutcome::Ip
    }

    fn uncompress_compressed(&mut self, _packet: &[u8]) -> Option<usize> {
        None
    }

    fn uncompress_uncompressed(&mut self, _packet: &[u8]) -> bool {
        true
    }

    fn uncompress_error(&mut self) {}
}
