/*
 * The shared receive side of one PS/2 port
 *
 * A Ps2Port is meant to live in a static so both the clock interrupt and the
 * main loop can reach it:
 *
 * - decoder is written by the interrupt; the main loop only resets it with
 *   interrupts masked.
 * - buffer is filled by the interrupt and drained by the main loop.
 * - error mirrors the decoder's parked error so the main loop can read it
 *   without taking the decoder lock.
 * - stats is written by the interrupt only.
 */

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use hal::clock::{Clock, TimedOut, wait_until};
use spin::Mutex;

use crate::SCAN_BUFFER_LEN;
use crate::error::RxError;
use crate::receiver::{Edge, FrameDecoder, RxState};
use crate::ring::ScanBuffer;

/* Receive counters, kept for diagnostics */
pub struct RxStats {
    frames: AtomicU32,
    start: AtomicU32,
    overrun: AtomicU32,
    parity: AtomicU32,
    stop: AtomicU32,
}

impl RxStats {
    const fn new() -> Self {
        Self {
            frames: AtomicU32::new(0),
            start: AtomicU32::new(0),
            overrun: AtomicU32::new(0),
            parity: AtomicU32::new(0),
            stop: AtomicU32::new(0),
        }
    }

    fn counter(&self, err: RxError) -> &AtomicU32 {
        match err {
            RxError::StartBit => &self.start,
            RxError::Overrun => &self.overrun,
            RxError::Parity => &self.parity,
            RxError::StopBit => &self.stop,
        }
    }

    fn record(&self, err: RxError) {
        self.counter(err).fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn errors(&self, err: RxError) -> u32 {
        self.counter(err).load(Ordering::Relaxed)
    }
}

pub struct Ps2Port<const N: usize = SCAN_BUFFER_LEN> {
    decoder: Mutex<FrameDecoder>,
    error: AtomicU8,
    buffer: ScanBuffer<N>,
    stats: RxStats,
}

impl<const N: usize> Ps2Port<N> {
    pub const fn new() -> Self {
        Self {
            decoder: Mutex::new(FrameDecoder::new()),
            error: AtomicU8::new(0),
            buffer: ScanBuffer::new(),
            stats: RxStats::new(),
        }
    }

    /*
     * on_clock_falling - Clock interrupt entry point: one falling clock edge
     * with the data line level sampled at that edge.
     */
    pub fn on_clock_falling(&self, data_high: bool) {
        //The lock is only ever contended by a reset, which runs with the
        //interrupt masked; an edge that still races one is dropped
        let Some(mut decoder) = self.decoder.try_lock() else {
            return;
        };
        match decoder.clock(data_high) {
            Edge::Pending => {}
            Edge::Complete(byte) => {
                if self.buffer.push(byte).is_ok() {
                    self.stats.frames.fetch_add(1, Ordering::Relaxed);
                } else {
                    decoder.fail(RxError::Overrun);
                    self.park(RxError::Overrun);
                }
            }
            Edge::Failed(err) => self.park(err),
        }
    }

    fn park(&self, err: RxError) {
        self.stats.record(err);
        self.error.store(err.code(), Ordering::Release);
    }

    /*
     * reset_receiver - Force the decoder back to idle. Call with the clock
     * interrupt masked. Queued bytes are kept.
     */
    pub fn reset_receiver(&self) {
        self.decoder.lock().reset();
        self.error.store(0, Ordering::Release);
    }

    /* rx_error - The error the decoder is parked on, if any */
    pub fn rx_error(&self) -> Option<RxError> {
        RxError::from_code(self.error.load(Ordering::Acquire))
    }

    /*
     * rx_state - Decoder state; takes the decoder lock, so mask the interrupt
     * first on hardware.
     */
    pub fn rx_state(&self) -> RxState {
        self.decoder.lock().state()
    }

    /* try_recv - Next queued scan code, without waiting */
    pub fn try_recv(&self) -> Option<u8> {
        self.buffer.pop()
    }

    /*
     * recv_timeout - Next queued scan code, spinning up to timeout_us for one
     * to arrive.
     */
    pub fn recv_timeout<C: Clock + ?Sized>(&self, clock: &C, timeout_us: u32) -> Result<u8, TimedOut> {
        let mut byte = None;
        wait_until(clock, timeout_us, || {
            byte = self.buffer.pop();
            byte.is_some()
        })?;
        byte.ok_or(TimedOut)
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn stats(&self) -> &RxStats {
        &self.stats
    }
}

impl<const N: usize> Default for Ps2Port<N> {
    fn default() -> Self {
        Self::new()
    }
}
