//! Link statistics.
//!
//! Every drop path in [`crate::rx`] and [`crate::tx`] is "never fatal" by
//! design (see the error taxonomy in the crate root docs) but must still be
//! observable, so each one bumps a counter here instead of disappearing
//! silently.

/// RX-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Frames dropped for bad FCS.
    pub chkerr: u32,
    /// Frames dropped for being incomplete at the terminating flag.
    pub lenerr: u32,
    /// Frames dropped because the buffer pool was exhausted mid-frame.
    pub memerr: u32,
    /// Frames dropped because the cross-thread dispatch queue was full.
    pub ifindiscards: u32,
}

impl RxStats {
    /// A zeroed counter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chkerr: 0,
            lenerr: 0,
            memerr: 0,
            ifindiscards: 0,
        }
    }
}

/// TX-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    /// Frames dropped because the buffer pool was exhausted while building
    /// the escaped output chain.
    pub memerr: u32,
    /// Frames dropped because of a VJ/protocol anomaly.
    pub proterr: u32,
    /// Frames dropped (or truncated) because of a short serial write.
    pub err: u32,
    /// Frames successfully handed to the serial device.
    pub xmit: u32,
}

impl TxStats {
    /// A zeroed counter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memerr: 0,
            proterr: 0,
            err: 0,
            xmit: 0,
        }
    }
}
