//! Error types.
//!
//! Framing, short-write, and protocol-tagging failures are recoverable by
//! design (see [`crate::stats`] and [`crate::upper::WriteOutcome`]/
//! [`crate::upper::NetifOutcome`]) and are reported through those outcome
//! enums rather than `Result`. The one domain that fails before a frame
//! even has a home to report stats against — buffer pool exhaustion while
//! still building a chain — gets a real error type, since
//! [`crate::buffer::ChainBuilder::push`] needs `?` to unwind cleanly.

use core::fmt;

/// Buffer pool allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// No free buffer was available.
    Exhausted,
}

impl PoolError {
    /// Returns a short, static description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "buffer pool exhausted",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
