//! Interrupt-safe sharing: an ACCM cell readable from an ISR/poller and
//! writable from the upper engine, plus a fixed-depth FIFO for the
//! cross-thread RX handoff described in the crate's concurrency model.
//!
//! Available under the `critical-section` feature. Grounded on the
//! teacher's `sync::primitives::CriticalSectionCell` (the same
//! `critical_section::Mutex<RefCell<T>>` wrapper, generalized here to a
//! `Copy`-snapshot read rather than a closure-scoped borrow, since an ACCM
//! snapshot is only 32 bytes) and `sync::shared` (the `receive_async`
//! poll-on-waker pattern, reused for the `async` feature below).

use core::cell::RefCell;

use critical_section::Mutex;

use crate::accm::Accm;
use crate::upper::LinkId;

/// An [`Accm`] readable and writable from either side of the RX/TX split
/// under a short critical section.
///
/// RX reads a full snapshot once per byte rather than re-entering the
/// critical section per bit test, keeping the locked region to a single
/// `Copy` of 32 bytes.
pub struct AccmCell {
    inner: Mutex<RefCell<Accm>>,
}

impl AccmCell {
    /// Wraps an initial ACCM value.
    #[must_use]
    pub const fn new(initial: Accm) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(initial)),
        }
    }

    /// Takes a snapshot of the current mask.
    #[must_use]
    pub fn snapshot(&self) -> Accm {
        critical_section::with(|cs| *self.inner.borrow(cs).borrow())
    }

    /// Replaces the mask (e.g. after an LCP ACCM negotiation).
    pub fn set(&self, accm: Accm) {
        critical_section::with(|cs| *self.inner.borrow(cs).borrow_mut() = accm);
    }

    /// Applies a function to the mask in place, under one critical section.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Accm) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow(cs).borrow_mut()))
    }
}

// Safety: all access goes through `critical_section::with`, which provides
// the necessary mutual exclusion on every supported target.
unsafe impl Sync for AccmCell {}

/// One queued cross-thread RX delivery: which link it belongs to plus the
/// recovered frame, as described in the design notes' message-passing
/// option for the RX-to-upper-engine handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedFrame {
    /// Which link the frame arrived on.
    pub link: LinkId,
    /// Recovered protocol number.
    pub protocol: u16,
    /// Pool chain head.
    pub head: u16,
    /// Payload length, FCS excluded.
    pub total_len: usize,
}

/// A fixed-depth FIFO for handing completed RX frames from the serial
/// read path to the upper engine's event loop when they run on different
/// threads.
///
/// Enqueue fails (returning the frame back to the caller) when full; per
/// the concurrency model, the caller must then free the chain and bump a
/// discard counter rather than retry or block.
pub struct RxDispatchQueue<const DEPTH: usize> {
    inner: Mutex<RefCell<Ring<DEPTH>>>,
}

struct Ring<const DEPTH: usize> {
    slots: [Option<QueuedFrame>; DEPTH],
    head: usize,
    len: usize,
}

impl<const DEPTH: usize> Ring<DEPTH> {
    const fn new() -> Self {
        Self {
            slots: [None; DEPTH],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, frame: QueuedFrame) -> Result<(), QueuedFrame> {
        if self.len == DEPTH {
            return Err(frame);
        }
        let idx = (self.head + self.len) % DEPTH;
        self.slots[idx] = Some(frame);
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<QueuedFrame> {
        if self.len == 0 {
            return None;
        }
        let frame = self.slots[self.head].take();
        self.head = (self.head + 1) % DEPTH;
        self.len -= 1;
        frame
    }
}

impl<const DEPTH: usize> RxDispatchQueue<DEPTH> {
    /// An empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Ring::new())),
        }
    }

    /// Enqueues a completed frame for cross-thread dispatch. `Err` returns
    /// the frame back so the caller can free its chain and count the
    /// discard; this never blocks or retries internally.
    pub fn push(&self, frame: QueuedFrame) -> Result<(), QueuedFrame> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().push(frame))
    }

    /// Dequeues the oldest pending frame, preserving FIFO order.
    pub fn pop(&self) -> Option<QueuedFrame> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop())
    }
}

impl<const DEPTH: usize> Default for RxDispatchQueue<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: all access goes through `critical_section::with`.
unsafe impl<const DEPTH: usize> Sync for RxDispatchQueue<DEPTH> {}

#[cfg(feature = "async")]
impl<const DEPTH: usize> RxDispatchQueue<DEPTH> {
    /// Waits for and pops the next queued frame.
    ///
    /// Mirrors the teacher's `receive_async`/`AtomicWaker` pattern; here
    /// the wake side is the RX byte path itself, which should call
    /// `waker.wake()` after every successful [`RxDispatchQueue::push`].
    pub async fn pop_async(&self, waker: &atomic_waker::AtomicWaker) -> QueuedFrame {
        use core::future::poll_fn;
        use core::task::Poll;

        poll_fn(|cx| {
            if let Some(frame) = self.pop() {
                Poll::Ready(frame)
            } else {
                waker.register(cx.waker());
                // Re-check after registering to avoid missing a push that
                // happened between the first `pop` and `register`.
                match self.pop() {
                    Some(frame) => Poll::Ready(frame),
                    None => Poll::Pending,
                }
            }
        })
        .await
    }
}

#[cfg(feature = "async")]
pub mod atomic_waker {
    //! A minimal `AtomicWaker`, mirrored after the teacher's
    //! `sync::primitives::AtomicWaker`.

    use core::sync::atomic::{AtomicBool, Ordering};
    use core::task::Waker;

    use critical_section::Mutex;
    use core::cell::RefCell;

    /// A single-slot waker register, safe to write from an ISR and read
    /// from an async task.
    pub struct AtomicWaker {
        waker: Mutex<RefCell<Option<Waker>>>,
        registered: AtomicBool,
    }

    impl AtomicWaker {
        /// An empty waker slot.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                waker: Mutex::new(RefCell::new(None)),
                registered: AtomicBool::new(false),
            }
        }

        /// Stores `waker`, replacing whatever was registered before.
        pub fn register(&self, waker: &Waker) {
            critical_section::with(|cs| {
                *self.waker.borrow(cs).borrow_mut() = Some(waker.clone());
            });
            self.registered.store(true, Ordering::Release);
        }

        /// Wakes the registered waker, if any.
        pub fn wake(&self) {
            let woken = critical_section::with(|cs| self.waker.borrow(cs).borrow_mut().take());
            if let Some(waker) = woken {
                self.registered.store(false, Ordering::Release);
                waker.wake();
            }
        }

        /// Whether a waker is currently registered.
        #[must_use]
        pub fn is_registered(&self) -> bool {
            self.registered.load(Ordering::Acquire)
        }
    }

    impl Default for AtomicWaker {
        fn default() -> Self {
            Self::new()
        }
    }

    // Safety: all access goes through `critical_section::with`.
    unsafe impl Sync for AtomicWaker {}
}

#[cfg(feature = "async")]
pub use atomic_waker as asynch;
