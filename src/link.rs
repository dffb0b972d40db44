//! Link adapter: ties RX, TX, per-direction ACCM, and the upper-engine
//! trait contracts together into the one object a caller drives per PPPoS
//! link.
//!
//! Configuration follows the teacher's builder-struct convention (see
//! `driver::config::Config` for the pattern this mirrors): a `LinkConfig`
//! with RFC-sane defaults and chainable `with_*` setters, consumed once by
//! [`Link::new`].

use crate::accm::Accm;
use crate::buffer::BufferPool;
use crate::constants::PPP_MAXIDLEFLAG;
use crate::rx::RxFramer;
use crate::stats::{RxStats, TxStats};
use crate::tx::TxFramer;
use crate::upper::{Command, LinkId, NetifOutcome, SerialWrite, UpperEngine, WriteOutcome};
use crate::vj::{PassthroughVj, VjCompressor};

/// Per-link settings, fixed for the life of a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Omit the address/control bytes on transmit once LCP has negotiated
    /// ACFC. Never affects RX: the framer always accepts both the
    /// compressed and uncompressed forms.
    pub acfc: bool,
    /// Omit the protocol field's high byte on transmit when PFC has been
    /// negotiated and the protocol number fits in one byte.
    pub pfc: bool,
    /// Run outgoing IP packets through the configured VJ compressor.
    pub vj_enabled: bool,
    /// Ticks of TX idle time before a leading flag is forced onto the next
    /// frame.
    pub max_idle_flag: u32,
}

impl LinkConfig {
    /// RFC-sane defaults: no compression negotiated yet, VJ off, the
    /// upstream protocol's default idle window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            acfc: false,
            pfc: false,
            vj_enabled: false,
            max_idle_flag: PPP_MAXIDLEFLAG,
        }
    }

    /// Sets the ACFC flag.
    #[must_use]
    pub const fn with_acfc(mut self, acfc: bool) -> Self {
        self.acfc = acfc;
        self
    }

    /// Sets the PFC flag.
    #[must_use]
    pub const fn with_pfc(mut self, pfc: bool) -> Self {
        self.pfc = pfc;
        self
    }

    /// Enables or disables the VJ compression pass on TX.
    #[must_use]
    pub const fn with_vj_enabled(mut self, vj_enabled: bool) -> Self {
        self.vj_enabled = vj_enabled;
        self
    }

    /// Overrides the idle-flag window.
    #[must_use]
    pub const fn with_max_idle_flag(mut self, ticks: u32) -> Self {
        self.max_idle_flag = ticks;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One PPPoS link: RX/TX framers, their independent ACCMs, the negotiated
/// configuration, and the VJ compressor's own per-connection state.
///
/// Generic over the serial sink, upper engine, and (here) the VJ
/// compressor type `V` so the core stays free of `dyn` dispatch and
/// allocation; callers monomorphize once per concrete stack. `V` defaults
/// to [`PassthroughVj`] for callers that never enable VJ.
pub struct Link<V: VjCompressor = PassthroughVj> {
    id: LinkId,
    config: LinkConfig,
    rx_accm: Accm,
    tx_accm: Accm,
    rx: RxFramer,
    tx: TxFramer,
    vj: V,
}

impl<V: VjCompressor + Default> Link<V> {
    /// Builds a link in its cold-boot state. Call [`Link::handle_command`]
    /// with [`Command::Connect`] before any traffic flows.
    #[must_use]
    pub fn new(id: LinkId, config: LinkConfig) -> Self {
        Self {
            id,
            config,
            rx_accm: Accm::default(),
            tx_accm: Accm::default(),
            rx: RxFramer::new(),
            tx: TxFramer::new(config.max_idle_flag),
            vj: V::default(),
        }
    }
}

impl<V: VjCompressor> Link<V> {
    /// This link's identity.
    #[must_use]
    pub const fn id(&self) -> LinkId {
        self.id
    }

    /// Current RX counters.
    #[must_use]
    pub const fn rx_stats(&self) -> RxStats {
        self.rx.stats()
    }

    /// Current TX counters.
    #[must_use]
    pub const fn tx_stats(&self) -> TxStats {
        self.tx.stats()
    }

    /// Replaces the RX ACCM, e.g. after an inbound LCP ConfReq negotiates a
    /// non-default mask.
    pub fn set_rx_accm(&mut self, accm: Accm) {
        self.rx_accm = accm;
    }

    /// Replaces the TX ACCM, e.g. after an outbound LCP ConfAck.
    pub fn set_tx_accm(&mut self, accm: Accm) {
        self.tx_accm = accm;
    }

    /// Applies a lifecycle command, notifying `upper` as appropriate.
    ///
    /// `CONNECT` resets both framers, both ACCMs, and the VJ compressor to
    /// their cold-boot state, then calls `upper.clear` followed by
    /// `upper.start`, matching the original reset sequence: the full reset
    /// (not just the RX framer) is necessary because a link can be
    /// reconnected after a previous session negotiated a non-default mask
    /// or left VJ connection-slot state behind. `DISCONNECT` only notifies
    /// `upper.link_end`, leaving buffered state alone for `FREE` to reclaim.
    /// `FREE` discards any in-flight RX chain without resynchronizing.
    pub fn handle_command<const N: usize, const BUF: usize, U: UpperEngine>(
        &mut self,
        command: Command,
        pool: &mut BufferPool<N, BUF>,
        upper: &mut U,
    ) {
        match command {
            Command::Connect => {
                self.rx.on_connect(pool);
                self.rx_accm = Accm::default();
                self.tx_accm = Accm::default();
                self.vj.reset();
                upper.clear(self.id);
                upper.start(self.id);
            }
            Command::Disconnect => {
                upper.link_end(self.id);
            }
            Command::Free => {
                self.rx.discard(pool);
            }
        }
    }

    /// Feeds one byte of serial input through the RX framer, delivering a
    /// completed frame to `upper` if this byte terminated one.
    ///
    /// Callers sharing the RX ACCM with another execution context should
    /// snapshot it via [`crate::sync::AccmCell::snapshot`] before this call
    /// rather than locking for the whole byte; a plain, non-shared `Link`
    /// reads `self.rx_accm` directly.
    pub fn input_byte<const N: usize, const BUF: usize, U: UpperEngine>(
        &mut self,
        byte: u8,
        pool: &mut BufferPool<N, BUF>,
        upper: &mut U,
    ) {
        if let Some(delivery) = self.rx.input_byte(byte, &self.rx_accm, pool) {
            upper.input(self.id, delivery.protocol, delivery.head, delivery.total_len);
        }
    }

    /// Entry point (a): transmit an already-framed PPP payload (header,
    /// protocol, and data bytes the caller chose to include).
    pub fn write<const N: usize, const BUF: usize, W: SerialWrite>(
        &mut self,
        pool: &mut BufferPool<N, BUF>,
        sink: &mut W,
        now: u32,
        payload: &[u8],
    ) -> WriteOutcome {
        self.tx.write(pool, sink, &self.tx_accm, now, payload)
    }

    /// Entry point (b): transmit an IP packet under a protocol tag, with
    /// this link's ACFC/PFC settings and (if enabled) a pass through its
    /// own VJ compressor applied.
    pub fn netif_output<const N: usize, const BUF: usize, W: SerialWrite>(
        &mut self,
        pool: &mut BufferPool<N, BUF>,
        sink: &mut W,
        now: u32,
        protocol: u16,
        packet: &mut [u8],
    ) -> NetifOutcome {
        let vj = if self.config.vj_enabled { Some(&mut self.vj) } else { None };
        self.tx.netif_output(
            pool,
            sink,
            &self.tx_accm,
            now,
            self.config.acfc,
            self.config.pfc,
            vj,
            protocol,
            packet,
        )
    }
}
