/*
 * Host-to-device transfer
 *
 * The host requests to send by holding clock low, then data low, then
 * releasing clock. The device then clocks in 8 data bits (LSB first), odd
 * parity and a stop bit, and answers with an acknowledge pulse on the data
 * line. The receive interrupt is masked for the whole transfer so sending and
 * receiving never overlap.
 */

use hal::clock::{Clock, TimedOut, wait_until};
use hal::lines::{IrqMask, Ps2Lines};
use log::{debug, trace};

use crate::SCAN_BUFFER_LEN;
use crate::error::{RxError, TxError, TxStage};
use crate::odd_parity;
use crate::port::Ps2Port;

/* struct Ps2Timing - Protocol timing, all compiled in */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ps2Timing {
    /* Clock hold time that opens a request to send */
    pub request_hold_us: u32,
    /* Budget for the device to start clocking after the request */
    pub device_start_timeout_us: u32,
    /* Budget for each clock transition once clocking has started */
    pub bit_timeout_us: u32,
    /* Quiet time after every transfer before another may start */
    pub settle_ms: u32,
    /* Budget for a keyboard reply byte to show up in the ring */
    pub response_timeout_us: u32,
    /* Clock high time that marks the gap between two frames */
    pub idle_gap_us: u32,
    /* Budget for such a gap to show up before a resync is retried */
    pub idle_timeout_us: u32,
}

impl Ps2Timing {
    pub const DEFAULT: Self = Self {
        request_hold_us: 100,
        device_start_timeout_us: 15_000,
        bit_timeout_us: 2_000,
        settle_ms: 20,
        response_timeout_us: 25_000,
        idle_gap_us: 100,
        idle_timeout_us: 20_000,
    };
}

impl Default for Ps2Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/*
 * struct Ps2Host - Host end of a PS/2 link: the shared port plus the main
 * loop's handles on the lines, the interrupt mask and the clock.
 */
pub struct Ps2Host<'p, L, I, C, const N: usize = SCAN_BUFFER_LEN> {
    port: &'p Ps2Port<N>,
    lines: L,
    irq: I,
    clock: C,
    timing: Ps2Timing,
}

impl<'p, L, I, C, const N: usize> Ps2Host<'p, L, I, C, N>
where
    L: Ps2Lines,
    I: IrqMask,
    C: Clock,
{
    pub fn new(port: &'p Ps2Port<N>, lines: L, irq: I, clock: C, timing: Ps2Timing) -> Self {
        Self {
            port,
            lines,
            irq,
            clock,
            timing,
        }
    }

    pub fn port(&self) -> &'p Ps2Port<N> {
        self.port
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timing(&self) -> &Ps2Timing {
        &self.timing
    }

    pub fn enable_interrupts(&mut self) {
        self.irq.enable();
    }

    /*
     * send - Send one byte to the device. Blocks for the whole transfer plus
     * the settle delay, whether or not the transfer succeeded.
     */
    pub fn send(&mut self, byte: u8) -> Result<(), TxError> {
        self.irq.disable();
        self.port.reset_receiver();

        let result = self.clock_out(byte);
        if result.is_err() {
            self.lines.release_data();
            self.lines.release_clock();
        }

        self.irq.enable();
        self.clock.delay_ms(self.timing.settle_ms);
        trace!("ps2: sent {:#04x}: {:?}", byte, result);
        result
    }

    fn clock_out(&mut self, byte: u8) -> Result<(), TxError> {
        let lines = &mut self.lines;
        let clock = &self.clock;
        let timing = &self.timing;

        lines.pull_clock_low();
        clock.delay_us(timing.request_hold_us);
        lines.pull_data_low();
        lines.release_clock();

        let parity = odd_parity(byte);
        for bit in 0..10u8 {
            let level = match bit {
                0..=7 => (byte >> bit) & 1 != 0,
                8 => parity,
                _ => true,
            };
            let (budget, stage) = if bit == 0 {
                (timing.device_start_timeout_us, TxStage::RequestToSend)
            } else {
                (timing.bit_timeout_us, TxStage::Bit(bit))
            };

            wait_until(clock, budget, || !lines.clock_high()).map_err(|_| TxError::Timeout { stage })?;
            lines.set_data(level);
            wait_until(clock, timing.bit_timeout_us, || lines.clock_high())
                .map_err(|_| TxError::Timeout { stage: TxStage::Bit(bit) })?;
        }

        lines.release_data();

        let ack_timeout = TxError::Timeout { stage: TxStage::Ack };
        wait_until(clock, timing.bit_timeout_us, || !lines.clock_high()).map_err(|_| ack_timeout)?;
        let acked = !lines.data_high();
        wait_until(clock, timing.bit_timeout_us, || lines.clock_high() && lines.data_high())
            .map_err(|_| ack_timeout)?;

        if acked { Ok(()) } else { Err(TxError::NoAck) }
    }

    /* recv - Next received byte, without waiting */
    pub fn recv(&self) -> Option<u8> {
        self.port.try_recv()
    }

    /* recv_timeout - Next received byte, waiting up to timeout_us */
    pub fn recv_timeout(&self, timeout_us: u32) -> Result<u8, TimedOut> {
        self.port.recv_timeout(&self.clock, timeout_us)
    }

    /*
     * recover - Bring a parked receiver back to idle.
     *
     * Waits quiet_ms, then for the clock to sit high for a whole frame gap, so
     * the next falling edge is a real start bit. The reset runs with the
     * interrupt masked. Returns the error that was cleared, or None if the bus
     * never went idle and the receiver is still parked.
     */
    pub fn recover(&mut self, quiet_ms: u32) -> Option<RxError> {
        let err = self.port.rx_error()?;
        self.clock.delay_ms(quiet_ms);

        self.irq.disable();
        let idle = self.wait_bus_idle();
        if idle.is_ok() {
            self.port.reset_receiver();
        }
        self.irq.enable();

        match idle {
            Ok(()) => Some(err),
            Err(_) => {
                debug!("ps2: bus busy, receiver left parked on {}", err);
                None
            }
        }
    }

    fn wait_bus_idle(&mut self) -> Result<(), TimedOut> {
        let lines = &mut self.lines;
        let clock = &self.clock;
        let gap = self.timing.idle_gap_us as u64;
        let mut high_since: Option<u64> = None;

        wait_until(clock, self.timing.idle_timeout_us, || {
            let now = clock.now_us();
            if lines.clock_high() {
                now.wrapping_sub(*high_since.get_or_insert(now)) >= gap
            } else {
                high_since = None;
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::reply;
    use crate::receiver::RxState;
    use crate::receiver::frame_bits;
    use crate::sim::{Reply, SimKeyboard, feed_byte};
    use hal::clock::ManualClock;

    #[derive(Default)]
    struct IrqLog {
        masked: bool,
        disables: u32,
        enables: u32,
    }

    impl IrqMask for IrqLog {
        fn disable(&mut self) {
            self.masked = true;
            self.disables += 1;
        }

        fn enable(&mut self) {
            self.masked = false;
            self.enables += 1;
        }
    }

    #[test]
    fn test_send_clocks_out_byte() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        let mut irq = IrqLog::default();
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, &mut irq, &clock, Ps2Timing::DEFAULT);

        for byte in [0xEDu8, 0x00, 0x07, 0xF3, 0x7F, 0xFF] {
            assert_eq!(host.send(byte), Ok(()));
        }
        drop(host);

        assert_eq!(kbd.received(), &[0xED, 0x00, 0x07, 0xF3, 0x7F, 0xFF]);
        assert_eq!(kbd.framing_errors(), 0);
        assert!(!irq.masked);
        assert_eq!(irq.disables, 6);
        assert_eq!(irq.enables, 6);
    }

    #[test]
    fn test_send_waits_settle_delay() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        let clock = ManualClock::new(0);
        let mut host = Ps2Host::new(&port, &mut kbd, IrqLog::default(), &clock, Ps2Timing::DEFAULT);

        host.send(0xEE).unwrap();
        assert!(clock.elapsed() >= 20_000 + 100);
    }

    #[test]
    fn test_send_resets_parked_receiver() {
        let port: Ps2Port = Ps2Port::new();
        port.on_clock_falling(true);
        assert!(port.rx_error().is_some());

        let mut kbd = SimKeyboard::new(&port);
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, IrqLog::default(), &clock, Ps2Timing::DEFAULT);
        host.send(0xF4).unwrap();

        assert_eq!(port.rx_error(), None);
        //The simulated keyboard acknowledged with a reply frame
        assert_eq!(port.try_recv(), Some(reply::ACK));
    }

    #[test]
    fn test_silent_device_times_out() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        kbd.set_unplugged(true);
        let mut irq = IrqLog::default();
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, &mut irq, &clock, Ps2Timing::DEFAULT);

        assert_eq!(
            host.send(0xED),
            Err(TxError::Timeout {
                stage: TxStage::RequestToSend
            })
        );
        drop(host);
        assert!(!irq.masked);
        assert!(kbd.lines_released());
    }

    #[test]
    fn test_missing_ack_pulse() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        kbd.set_line_ack(false);
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, IrqLog::default(), &clock, Ps2Timing::DEFAULT);

        assert_eq!(host.send(0xED), Err(TxError::NoAck));
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn test_recover_clears_parked_error() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        let mut irq = IrqLog::default();
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, &mut irq, &clock, Ps2Timing::DEFAULT);

        assert_eq!(host.recover(2), None);

        port.on_clock_falling(true);
        assert_eq!(host.recover(2), Some(RxError::StartBit));
        assert_eq!(port.rx_state(), RxState::Idle);

        feed_byte(&port, 0x1E);
        assert_eq!(host.recv(), Some(0x1E));
        drop(host);
        assert_eq!(irq.disables, 1);
        assert!(!irq.masked);
    }

    #[test]
    fn test_scripted_reply_reaches_ring() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        kbd.script(&[Reply::Byte(reply::RESEND)]);
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, IrqLog::default(), &clock, Ps2Timing::DEFAULT);

        host.send(0xED).unwrap();
        assert_eq!(host.recv_timeout(1000), Ok(reply::RESEND));
        assert_eq!(host.recv_timeout(1000), Err(TimedOut));
    }

    #[test]
    fn test_recover_waits_out_frame_in_flight() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        let clock = ManualClock::default();

        //E0 with a broken parity bit parks the receiver
        let mut bad = frame_bits(0xE0);
        bad[9] = !bad[9];
        for bit in bad {
            port.on_clock_falling(bit);
        }
        assert_eq!(port.rx_error(), Some(RxError::Parity));

        //The keyboard is three bits into the next frame when recovery starts
        let next = frame_bits(0x4B);
        for &bit in &next[..3] {
            port.on_clock_falling(bit);
        }
        kbd.clock_out(&next[3..]);

        let mut host = Ps2Host::new(&port, &mut kbd, IrqLog::default(), &clock, Ps2Timing::DEFAULT);
        assert_eq!(host.recover(2), Some(RxError::Parity));
        drop(host);
        assert!(kbd.clock_out_done());

        //The tail of 4B was not taken for a frame of its own
        assert_eq!(port.pending(), 0);
        assert_eq!(port.rx_error(), None);
        feed_byte(&port, 0xCB);
        assert_eq!(port.try_recv(), Some(0xCB));
        assert_eq!(port.try_recv(), None);
    }

    #[test]
    fn test_recover_gives_up_on_busy_bus() {
        let port: Ps2Port = Ps2Port::new();
        port.on_clock_falling(true);

        let mut kbd = SimKeyboard::new(&port);
        kbd.pull_clock_low();
        let mut irq = IrqLog::default();
        let clock = ManualClock::default();
        let mut host = Ps2Host::new(&port, &mut kbd, &mut irq, &clock, Ps2Timing::DEFAULT);

        assert_eq!(host.recover(2), None);
        assert_eq!(port.rx_error(), Some(RxError::StartBit));
        drop(host);
        assert!(!irq.masked);
    }
}
