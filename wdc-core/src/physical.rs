//! Physical Link Layer
//!
//! Turns the UART byte stream plus the enable line into discrete frames.
//!
//! ```text
//!            assertion edge                     deassertion edge
//!   Idle ───────────────────────▶ Active ───────────────────────▶ Idle
//!         flush UART RX                  drain UART RX into a Frame
//!         transmit queued frame          enqueue if 1..=50 bytes
//!         start-of-frame callback        end-of-frame callback
//! ```
//!
//! Edges that report the level the bus is already in are ignored.
//!
//! Outbound frames wait in a queue and are handed to the UART only on the
//! next assertion edge, never in the middle of a frame. While transmitting,
//! the companion holds the enable line at its active level;
//! [`PhysicalLink::on_transmit_complete`] releases it.
//!
//! When the inbound queue is full the newest frame is rejected and the
//! end-of-frame callback is not invoked.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use wdc_hal::{EnableLine, UartRegisters};
use wdc_protocol::{Frame, FrameHeader, MAX_FRAME_SIZE};

use crate::config::{EnablePolarity, LinkConfig};
use crate::error::Error;
use crate::queue::FrameQueue;
use crate::traits::{FrameCallback, FrameSink, FrameSource};
use crate::uart::{UartDriver, DEFAULT_RX_BUFFER_SIZE, DEFAULT_TX_BUFFER_SIZE};

/// Depth of the inbound and outbound frame queues
pub const DEFAULT_QUEUE_DEPTH: usize = 4;

/// Bus arbitration state as seen on the enable line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    Idle,
    Active,
}

/// Link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames placed on the inbound queue
    pub frames_received: u32,
    /// Frames handed to the UART
    pub frames_transmitted: u32,
    /// Frames discarded for being empty or oversize
    pub invalid_frames: u32,
    /// Valid frames rejected because the inbound queue was full
    pub inbound_dropped: u32,
    /// Outbound frames dropped because the TX buffer could not take them
    pub transmit_dropped: u32,
}

struct LinkState<'a, E, const DEPTH: usize> {
    line: E,
    polarity: EnablePolarity,
    bus: BusState,
    /// Enable line is held at the active level by us
    driving: bool,
    inbound: FrameQueue<DEPTH>,
    outbound: FrameQueue<DEPTH>,
    start_of_frame: Option<&'a (dyn FrameCallback + Sync)>,
    end_of_frame: Option<&'a (dyn FrameCallback + Sync)>,
    stats: LinkStats,
}

impl<'a, E: EnableLine, const DEPTH: usize> LinkState<'a, E, DEPTH> {
    /// Stop holding the bus and let the line settle at its idle level
    fn release_line(&mut self) {
        self.line.release_to(self.polarity.idle_level());
        self.driving = false;
    }
}

/// Frame-level view of one UART plus its enable line
pub struct PhysicalLink<
    'a,
    U,
    E,
    const RX: usize = { DEFAULT_RX_BUFFER_SIZE },
    const TX: usize = { DEFAULT_TX_BUFFER_SIZE },
    const DEPTH: usize = { DEFAULT_QUEUE_DEPTH },
> {
    uart: UartDriver<'a, U, RX, TX>,
    state: Mutex<CriticalSectionRawMutex, RefCell<LinkState<'a, E, DEPTH>>>,
    bus_active: AtomicBool,
}

impl<'a, U, E, const RX: usize, const TX: usize, const DEPTH: usize>
    PhysicalLink<'a, U, E, RX, TX, DEPTH>
where
    U: UartRegisters,
    E: EnableLine,
{
    // RX must be able to hold one byte more than a frame so oversize frames
    // are detected rather than silently clipped.
    const VALID: () = assert!(
        RX - 1 > MAX_FRAME_SIZE && TX - 1 >= MAX_FRAME_SIZE && DEPTH >= 1,
        "buffers too small for a maximum-size frame"
    );

    /// Configure the UART and release the enable line
    pub fn new(regs: U, line: E, config: &LinkConfig) -> Result<Self, Error> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;

        config.validate()?;
        let uart = UartDriver::new(regs);
        uart.configure(config.baud_rate)?;

        let mut line = line;
        line.release_to(config.polarity.idle_level());
        if config.polarity.is_asserted(line.is_high()) {
            warn!("enable line reads asserted after release");
        }

        Ok(Self {
            uart,
            state: Mutex::new(RefCell::new(LinkState {
                line,
                polarity: config.polarity,
                bus: BusState::Idle,
                driving: false,
                inbound: FrameQueue::new(),
                outbound: FrameQueue::new(),
                start_of_frame: None,
                end_of_frame: None,
                stats: LinkStats::default(),
            })),
            bus_active: AtomicBool::new(false),
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut LinkState<'a, E, DEPTH>) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    /// Enable line edge interrupt handler (both edges)
    pub fn on_enable_edge(&self) {
        let callback = self.with(|s| {
            let high = s.line.is_high();
            let asserted = s.polarity.is_asserted(high);
            match (s.bus, asserted) {
                (BusState::Idle, true) => {
                    self.begin_frame(s);
                    s.start_of_frame
                }
                (BusState::Active, false) => self.finish_frame(s),
                _ => {
                    trace!("enable line edge ignored (high={})", high);
                    None
                }
            }
        });

        if let Some(callback) = callback {
            callback.notify();
        }
    }

    fn begin_frame(&self, s: &mut LinkState<'a, E, DEPTH>) {
        s.bus = BusState::Active;
        self.bus_active.store(true, Ordering::Release);
        self.uart.flush_receive();
        trace!("start of frame");

        let Some(frame) = s.outbound.pop() else {
            if s.driving {
                // Claimed with nothing left to send
                s.release_line();
            }
            return;
        };

        s.line.drive(s.polarity.active_level());
        s.driving = true;
        match self.uart.send_all(&frame.encode_to_vec()) {
            Ok(()) => {
                s.stats.frames_transmitted = s.stats.frames_transmitted.wrapping_add(1);
                trace!("transmitting {} byte frame", frame.len());
            }
            Err(_) => {
                s.release_line();
                s.stats.transmit_dropped = s.stats.transmit_dropped.wrapping_add(1);
                warn!("TX buffer busy, dropped {} byte frame", frame.len());
            }
        }
    }

    fn finish_frame(
        &self,
        s: &mut LinkState<'a, E, DEPTH>,
    ) -> Option<&'a (dyn FrameCallback + Sync)> {
        s.bus = BusState::Idle;
        self.bus_active.store(false, Ordering::Release);

        let len = self.uart.can_read();
        if len == 0 || len > MAX_FRAME_SIZE {
            self.uart.flush_receive();
            s.stats.invalid_frames = s.stats.invalid_frames.wrapping_add(1);
            debug!("discarding invalid frame of {} bytes", len);
            return None;
        }

        let mut bytes = [0u8; MAX_FRAME_SIZE];
        let n = self.uart.receive(&mut bytes);
        let frame = match Frame::from_bytes(&bytes[..n]) {
            Ok(frame) => frame,
            Err(_) => {
                s.stats.invalid_frames = s.stats.invalid_frames.wrapping_add(1);
                return None;
            }
        };

        if s.inbound.push(frame).is_err() {
            s.stats.inbound_dropped = s.stats.inbound_dropped.wrapping_add(1);
            warn!("inbound queue full, dropped {} byte frame", n);
            return None;
        }

        s.stats.frames_received = s.stats.frames_received.wrapping_add(1);
        trace!("end of frame, {} bytes", n);
        s.end_of_frame
    }

    /// UART transmit-complete interrupt handler
    ///
    /// Releases the enable line once every queued byte has left. A line
    /// claimed with [`claim_bus`](Self::claim_bus) stays held until its
    /// assertion edge has started the frame.
    pub fn on_transmit_complete(&self) {
        let released = self.with(|s| {
            if s.driving && s.bus == BusState::Active && self.uart.is_transmit_idle() {
                s.release_line();
                true
            } else {
                false
            }
        });

        if released {
            trace!("enable line released");
        }
    }

    /// Start a frame from the companion side
    ///
    /// Drives the enable line to its active level if the bus is idle and a
    /// frame is queued. The resulting assertion edge, delivered through
    /// [`on_enable_edge`](Self::on_enable_edge), transmits the frame. Returns
    /// false if the bus is busy or there is nothing to send.
    pub fn claim_bus(&self) -> bool {
        self.with(|s| {
            if s.bus == BusState::Active || s.driving || s.outbound.is_empty() {
                return false;
            }
            s.line.drive(s.polarity.active_level());
            s.driving = true;
            true
        })
    }

    /// Queue a frame for transmission at the next frame start
    pub fn write_packet(&self, frame: Frame) -> Result<(), Error> {
        let result = self.with(|s| s.outbound.push(frame));
        if result.is_err() {
            warn!("outbound queue full");
        }
        result
    }

    /// Queue raw wire bytes (header first) as a frame
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), Error> {
        self.write_packet(Frame::from_bytes(bytes)?)
    }

    /// Number of outbound frames still waiting for a frame start
    pub fn pending_writes(&self) -> usize {
        self.with(|s| s.outbound.len())
    }

    /// Number of completed inbound frames
    pub fn can_read(&self) -> usize {
        self.with(|s| s.inbound.len())
    }

    /// Copy the oldest frame's wire bytes into `buf` and remove it
    ///
    /// Returns the frame length, header included. If `buf` is too short the
    /// frame stays queued and [`Error::BufferTooSmall`] is returned.
    pub fn read_packet(&self, buf: &mut [u8]) -> Result<usize, Error> {
        self.with(|s| {
            let frame = s.inbound.peek().ok_or(Error::NoFrameAvailable)?;
            let len = frame.encode(buf)?;
            s.inbound.pop();
            Ok(len)
        })
    }

    /// Remove and return the oldest frame
    pub fn read_frame(&self) -> Result<Frame, Error> {
        self.with(|s| s.inbound.pop()).ok_or(Error::NoFrameAvailable)
    }

    /// Header of the oldest frame, left queued
    pub fn peek_header(&self) -> Option<FrameHeader> {
        self.with(|s| s.inbound.peek().map(Frame::decode_header))
    }

    /// Drop every queued inbound frame
    pub fn flush_inbound(&self) {
        self.with(|s| s.inbound.clear());
    }

    pub fn bus_state(&self) -> BusState {
        if self.is_bus_active() {
            BusState::Active
        } else {
            BusState::Idle
        }
    }

    /// Lock-free check whether a frame is in progress
    pub fn is_bus_active(&self) -> bool {
        self.bus_active.load(Ordering::Acquire)
    }

    pub fn set_start_of_frame_callback(&self, callback: Option<&'a (dyn FrameCallback + Sync)>) {
        self.with(|s| s.start_of_frame = callback);
    }

    /// Called only for frames that were queued
    pub fn set_end_of_frame_callback(&self, callback: Option<&'a (dyn FrameCallback + Sync)>) {
        self.with(|s| s.end_of_frame = callback);
    }

    pub fn stats(&self) -> LinkStats {
        self.with(|s| s.stats)
    }

    /// Underlying UART driver, for interrupt wiring and byte-level access
    pub fn uart(&self) -> &UartDriver<'a, U, RX, TX> {
        &self.uart
    }

    /// Run `f` with exclusive access to the enable line
    pub fn with_enable_line<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        self.with(|s| f(&mut s.line))
    }

    /// Shut down, releasing the enable line and disabling the UART
    pub fn free(self) -> (U, E) {
        let Self { uart, state, .. } = self;
        let mut state = state.into_inner().into_inner();
        state.release_line();
        (uart.free(), state.line)
    }
}

impl<'a, U, E, const RX: usize, const TX: usize, const DEPTH: usize> FrameSource
    for PhysicalLink<'a, U, E, RX, TX, DEPTH>
where
    U: UartRegisters,
    E: EnableLine,
{
    fn next_frame(&self) -> Option<Frame> {
        self.read_frame().ok()
    }
}

impl<'a, U, E, const RX: usize, const TX: usize, const DEPTH: usize> FrameSink
    for PhysicalLink<'a, U, E, RX, TX, DEPTH>
where
    U: UartRegisters,
    E: EnableLine,
{
    fn submit(&self, frame: Frame) -> Result<(), Error> {
        self.write_packet(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLine, MockUart};
    use core::sync::atomic::{AtomicUsize, Ordering as StdOrdering};
    use wdc_protocol::{Direction, Endpoint, PacketType};

    type TestLink<'a> = PhysicalLink<'a, MockUart, MockLine>;

    fn link<'a>() -> TestLink<'a> {
        PhysicalLink::new(
            MockUart::new(16_000_000),
            MockLine::default(),
            &LinkConfig::default(),
        )
        .unwrap()
    }

    /// Base asserts the line (`true`) or lets it go
    fn base_sets_line(link: &TestLink<'_>, asserted: bool) {
        link.with_enable_line(|l| l.base_asserting = asserted);
        link.on_enable_edge();
    }

    fn feed(link: &TestLink<'_>, bytes: &[u8]) {
        for &b in bytes {
            link.uart().with_registers(|r| r.incoming.push_back(b));
            link.uart().on_rx_interrupt();
        }
    }

    fn base_sends(link: &TestLink<'_>, bytes: &[u8]) {
        base_sets_line(link, true);
        feed(link, bytes);
        base_sets_line(link, false);
    }

    fn drain_tx(link: &TestLink<'_>) {
        while link.uart().with_registers(|r| r.tx_irq) {
            link.uart().on_tx_empty_interrupt();
        }
    }

    #[test]
    fn test_new_configures_uart() {
        let link = link();
        assert_eq!(link.uart().baud_rate(), Some(9600));
        assert_eq!(link.bus_state(), BusState::Idle);
        assert_eq!(link.with_enable_line(|l| l.driven), None);
    }

    #[test]
    fn test_new_rejects_baud_above_protocol_ceiling() {
        let config = LinkConfig {
            baud_rate: 600_000,
            ..LinkConfig::default()
        };
        let result: Result<TestLink<'_>, _> =
            PhysicalLink::new(MockUart::new(16_000_000), MockLine::default(), &config);
        assert!(matches!(result, Err(Error::UnsupportedBaudRate)));
    }

    #[test]
    fn test_frame_cycle_queues_one_frame() {
        let link = link();
        base_sets_line(&link, true);
        assert!(link.is_bus_active());

        feed(&link, &[0x86, 1, 2, 3]);
        base_sets_line(&link, false);
        assert!(!link.is_bus_active());

        assert_eq!(link.can_read(), 1);
        let mut buf = [0u8; MAX_FRAME_SIZE];
        assert_eq!(link.read_packet(&mut buf), Ok(4));
        assert_eq!(&buf[..4], &[0x86, 1, 2, 3]);
        assert_eq!(link.can_read(), 0);
        assert_eq!(link.stats().frames_received, 1);
    }

    #[test]
    fn test_boundary_lengths() {
        let link = link();
        base_sends(&link, &[0x02]);
        base_sends(&link, &[0xAA; MAX_FRAME_SIZE]);
        assert_eq!(link.can_read(), 2);

        assert_eq!(link.read_frame().map(|f| f.len()), Ok(1));
        assert_eq!(link.read_frame().map(|f| f.len()), Ok(MAX_FRAME_SIZE));
    }

    #[test]
    fn test_empty_frame_discarded() {
        static EOF: AtomicUsize = AtomicUsize::new(0);
        let on_eof = || {
            EOF.fetch_add(1, StdOrdering::Relaxed);
        };
        let link = link();
        link.set_end_of_frame_callback(Some(&on_eof));

        base_sends(&link, &[]);
        assert_eq!(link.can_read(), 0);
        assert_eq!(link.stats().invalid_frames, 1);
        assert_eq!(EOF.load(StdOrdering::Relaxed), 0);
    }

    #[test]
    fn test_oversize_frame_discarded() {
        let link = link();
        base_sends(&link, &[0x55; MAX_FRAME_SIZE + 1]);
        assert_eq!(link.can_read(), 0);
        assert_eq!(link.stats().invalid_frames, 1);
        assert_eq!(link.uart().can_read(), 0);
    }

    #[test]
    fn test_stale_bytes_flushed_at_frame_start() {
        let link = link();
        feed(&link, &[9, 9, 9]);
        base_sends(&link, &[0x86, 1]);

        let frame = link.read_frame().unwrap();
        assert_eq!(frame.header, 0x86);
        assert_eq!(&frame.payload[..], &[1]);
    }

    #[test]
    fn test_callbacks_fire_once_per_frame() {
        static SOF: AtomicUsize = AtomicUsize::new(0);
        static EOF: AtomicUsize = AtomicUsize::new(0);
        let on_sof = || {
            SOF.fetch_add(1, StdOrdering::Relaxed);
        };
        let on_eof = || {
            EOF.fetch_add(1, StdOrdering::Relaxed);
        };
        let link = link();
        link.set_start_of_frame_callback(Some(&on_sof));
        link.set_end_of_frame_callback(Some(&on_eof));

        base_sets_line(&link, true);
        // Glitch: same level reported again
        link.on_enable_edge();
        feed(&link, &[0x0B, 7]);
        base_sets_line(&link, false);
        link.on_enable_edge();

        assert_eq!(SOF.load(StdOrdering::Relaxed), 1);
        assert_eq!(EOF.load(StdOrdering::Relaxed), 1);
        assert_eq!(link.can_read(), 1);
    }

    #[test]
    fn test_inbound_full_rejects_newest() {
        static EOF: AtomicUsize = AtomicUsize::new(0);
        let on_eof = || {
            EOF.fetch_add(1, StdOrdering::Relaxed);
        };
        let link = link();
        link.set_end_of_frame_callback(Some(&on_eof));

        for tag in 0..=DEFAULT_QUEUE_DEPTH as u8 {
            base_sends(&link, &[0x08, tag]);
        }

        assert_eq!(link.can_read(), DEFAULT_QUEUE_DEPTH);
        assert_eq!(link.stats().inbound_dropped, 1);
        assert_eq!(EOF.load(StdOrdering::Relaxed), DEFAULT_QUEUE_DEPTH);
        // Oldest survives
        assert_eq!(link.read_frame().unwrap().payload[0], 0);
    }

    #[test]
    fn test_read_packet_buffer_too_small_keeps_frame() {
        let link = link();
        base_sends(&link, &[0x86, 1, 2, 3]);

        let mut small = [0u8; 2];
        assert_eq!(link.read_packet(&mut small), Err(Error::BufferTooSmall));
        assert_eq!(link.can_read(), 1);
    }

    #[test]
    fn test_read_from_empty_queue() {
        let link = link();
        let mut buf = [0u8; 8];
        assert_eq!(link.read_packet(&mut buf), Err(Error::NoFrameAvailable));
        assert_eq!(link.read_frame(), Err(Error::NoFrameAvailable));
        assert_eq!(link.peek_header(), None);
    }

    #[test]
    fn test_peek_and_flush_inbound() {
        let link = link();
        base_sends(&link, &[0b1000_1010, 1]);

        let header = link.peek_header().unwrap();
        assert_eq!(header.direction, Direction::BaseToCompanion);
        assert_eq!(header.packet_type, PacketType::Data);
        assert_eq!(header.endpoint, Endpoint::Output);
        assert_eq!(link.can_read(), 1);

        link.flush_inbound();
        assert_eq!(link.can_read(), 0);
    }

    #[test]
    fn test_write_packet_queue_full() {
        let link = link();
        for tag in 0..DEFAULT_QUEUE_DEPTH as u8 {
            link.write_bytes(&[0x08, tag]).unwrap();
        }
        assert_eq!(link.write_bytes(&[0x08, 0xFF]), Err(Error::QueueFull));
        assert_eq!(link.pending_writes(), DEFAULT_QUEUE_DEPTH);

        // Queued frames leave in order, one per frame start, and the
        // rejected one never does
        for _ in 0..DEFAULT_QUEUE_DEPTH {
            base_sets_line(&link, true);
            drain_tx(&link);
            link.on_transmit_complete();
            base_sets_line(&link, false);
        }
        let expected: Vec<u8> = (0..DEFAULT_QUEUE_DEPTH as u8)
            .flat_map(|tag| [0x08, tag])
            .collect();
        assert_eq!(link.uart().with_registers(|r| r.sent.clone()), expected);
        assert_eq!(link.pending_writes(), 0);
    }

    #[test]
    fn test_write_bytes_rejects_bad_length() {
        let link = link();
        assert_eq!(link.write_bytes(&[]), Err(Error::InvalidFrameLength));
        assert_eq!(
            link.write_bytes(&[0; MAX_FRAME_SIZE + 1]),
            Err(Error::InvalidFrameLength)
        );
    }

    #[test]
    fn test_outbound_sent_at_frame_start_only() {
        let link = link();
        base_sets_line(&link, true);
        link.write_bytes(&[0x08, 1, 2]).unwrap();

        // Queued mid-frame: waits for the next frame start
        assert!(!link.uart().with_registers(|r| r.tx_irq));
        base_sets_line(&link, false);

        base_sets_line(&link, true);
        assert_eq!(link.pending_writes(), 0);
        assert_eq!(link.with_enable_line(|l| l.driven), Some(false));
        drain_tx(&link);
        assert_eq!(link.uart().with_registers(|r| r.sent.clone()), [0x08, 1, 2]);
        assert_eq!(link.stats().frames_transmitted, 1);

        link.on_transmit_complete();
        assert_eq!(link.with_enable_line(|l| l.driven), None);
    }

    #[test]
    fn test_transmit_complete_waits_for_drain() {
        let link = link();
        link.write_bytes(&[0x08, 1, 2]).unwrap();
        base_sets_line(&link, true);

        link.uart().on_tx_empty_interrupt();
        link.on_transmit_complete();
        assert_eq!(link.with_enable_line(|l| l.driven), Some(false));

        drain_tx(&link);
        link.on_transmit_complete();
        assert_eq!(link.with_enable_line(|l| l.driven), None);
    }

    #[test]
    fn test_claim_bus() {
        let link = link();
        assert!(!link.claim_bus());

        link.write_bytes(&[0x0C, 1]).unwrap();
        assert!(link.claim_bus());
        assert!(!link.claim_bus());

        // Our own assertion edge starts the frame and the transmission
        link.on_enable_edge();
        assert!(link.is_bus_active());
        drain_tx(&link);
        link.on_transmit_complete();
        link.on_enable_edge();

        assert!(!link.is_bus_active());
        assert_eq!(link.uart().with_registers(|r| r.sent.clone()), [0x0C, 1]);
        // Nothing heard on the line while we talked
        assert_eq!(link.stats().invalid_frames, 1);
    }

    #[test]
    fn test_transmit_complete_before_claim_edge_keeps_line() {
        let link = link();
        link.write_bytes(&[0x0C, 1]).unwrap();
        assert!(link.claim_bus());

        // Stray bytes drain before our assertion edge is handled
        link.uart().send(&[0x55]);
        drain_tx(&link);
        link.on_transmit_complete();
        assert_eq!(link.with_enable_line(|l| l.driven), Some(false));

        link.on_enable_edge();
        assert!(link.is_bus_active());
        drain_tx(&link);
        link.on_transmit_complete();
        link.on_enable_edge();

        assert!(!link.is_bus_active());
        assert_eq!(link.with_enable_line(|l| l.driven), None);
        assert_eq!(
            link.uart().with_registers(|r| r.sent.clone()),
            [0x55, 0x0C, 1]
        );
    }

    #[test]
    fn test_active_low_full_cycle() {
        let link = link();
        assert!(link.with_enable_line(|l| l.bias_high));

        link.write_bytes(&[0x08, 7]).unwrap();
        assert!(link.claim_bus());
        assert!(!link.with_enable_line(|l| l.is_high()));
        link.on_enable_edge();
        assert!(link.is_bus_active());

        drain_tx(&link);
        link.on_transmit_complete();
        assert!(link.with_enable_line(|l| l.is_high()));
        link.on_enable_edge();

        assert_eq!(link.bus_state(), BusState::Idle);
        assert_eq!(link.with_enable_line(|l| l.driven), None);
        assert_eq!(link.uart().with_registers(|r| r.sent.clone()), [0x08, 7]);
    }

    #[test]
    fn test_active_high_full_cycle() {
        let config = LinkConfig {
            polarity: EnablePolarity::ActiveHigh,
            ..LinkConfig::default()
        };
        let link: TestLink<'_> =
            PhysicalLink::new(MockUart::new(16_000_000), MockLine::default(), &config).unwrap();
        // Released toward the idle level
        assert!(!link.with_enable_line(|l| l.bias_high));
        assert!(!link.with_enable_line(|l| l.is_high()));

        link.write_bytes(&[0x08, 7]).unwrap();
        assert!(link.claim_bus());
        assert_eq!(link.with_enable_line(|l| l.driven), Some(true));
        link.on_enable_edge();
        assert!(link.is_bus_active());

        drain_tx(&link);
        link.on_transmit_complete();
        assert!(!link.with_enable_line(|l| l.is_high()));
        link.on_enable_edge();
        assert!(!link.is_bus_active());
        assert_eq!(link.uart().with_registers(|r| r.sent.clone()), [0x08, 7]);

        // Base-initiated frame
        base_sends(&link, &[0x8A, 1]);
        assert!(!link.is_bus_active());
        assert_eq!(link.can_read(), 1);
        assert_eq!(link.read_frame().map(|f| f.header), Ok(0x8A));
    }

    #[test]
    fn test_frame_source_and_sink() {
        let link = link();
        base_sends(&link, &[0x88, 5]);
        assert_eq!(link.next_frame().map(|f| f.header), Some(0x88));
        assert!(link.next_frame().is_none());

        let frame = Frame::new(0x08, &[5]).unwrap();
        link.submit(frame).unwrap();
        assert_eq!(link.pending_writes(), 1);
    }

    #[test]
    fn test_frame_held_open_until_transmit_complete() {
        let link = link();
        link.submit(Frame::new(0x08, &[5]).unwrap()).unwrap();

        // Our reply goes out on the base's assertion edge and holds the line
        base_sends(&link, &[0x88, 5]);
        assert!(link.is_bus_active());
        assert!(link.next_frame().is_none());

        drain_tx(&link);
        link.on_transmit_complete();
        link.on_enable_edge();
        assert!(!link.is_bus_active());
        assert_eq!(link.next_frame().map(|f| f.header), Some(0x88));
    }

    #[test]
    fn test_free_releases_line() {
        let link = link();
        link.write_bytes(&[0x08, 1]).unwrap();
        base_sets_line(&link, true);

        let (regs, line) = link.free();
        assert!(!regs.enabled);
        assert_eq!(line.driven, None);
    }
}
