/*
 * Simulated keyboard for hosted runs
 *
 * SimKeyboard plays the device end of the two PS/2 lines: it answers a request
 * to send by clocking in the host's byte, pulses the acknowledge, records what
 * it received and then frames a reply back into the port the way the clock
 * interrupt would. Time is driven by the host polling the clock line; every
 * poll advances the device by one half clock period.
 */

use hal::lines::Ps2Lines;

use crate::command::reply;
use crate::port::Ps2Port;
use crate::receiver::frame_bits;

const HISTORY: usize = 32;
const SCRIPT: usize = 16;
const WIRE: usize = 44;

/* feed_byte - Drive one well-formed frame carrying byte into the port */
pub fn feed_byte<const N: usize>(port: &Ps2Port<N>, byte: u8) {
    for bit in frame_bits(byte) {
        port.on_clock_falling(bit);
    }
}

/* feed_bytes - Drive a run of frames into the port */
pub fn feed_bytes<const N: usize>(port: &Ps2Port<N>, bytes: &[u8]) {
    for &b in bytes {
        feed_byte(port, b);
    }
}

/* What the keyboard says after clocking in a byte */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Byte(u8),
    /* Acknowledge on the lines but never send a reply byte */
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /* Clocking in bit sampled; low is the device's clock drive */
    Clocking { sampled: u8, low: bool },
    /* All bits in; waiting for the host to let go of data */
    AwaitRelease,
    /* Acknowledge pulse in progress */
    Ack,
}

pub struct SimKeyboard<'p, const N: usize> {
    port: &'p Ps2Port<N>,
    phase: Phase,
    host_clock_low: bool,
    host_data_low: bool,
    device_data_low: bool,
    shift: u16,
    received: [u8; HISTORY],
    received_len: usize,
    framing_errors: u32,
    script: [Reply; SCRIPT],
    script_len: usize,
    script_pos: usize,
    line_ack: bool,
    unplugged: bool,
    wire: [bool; WIRE],
    wire_len: usize,
    wire_pos: usize,
    wire_low: bool,
}

impl<'p, const N: usize> SimKeyboard<'p, N> {
    pub fn new(port: &'p Ps2Port<N>) -> Self {
        Self {
            port,
            phase: Phase::Idle,
            host_clock_low: false,
            host_data_low: false,
            device_data_low: false,
            shift: 0,
            received: [0; HISTORY],
            received_len: 0,
            framing_errors: 0,
            script: [Reply::Byte(reply::ACK); SCRIPT],
            script_len: 0,
            script_pos: 0,
            line_ack: true,
            unplugged: false,
            wire: [false; WIRE],
            wire_len: 0,
            wire_pos: 0,
            wire_low: false,
        }
    }

    /*
     * script - Replies for the next transfers, in order. Once the script runs
     * out every byte is answered with ACK.
     */
    pub fn script(&mut self, replies: &[Reply]) {
        let n = replies.len().min(SCRIPT);
        self.script[..n].copy_from_slice(&replies[..n]);
        self.script_len = n;
        self.script_pos = 0;
    }

    /*
     * set_line_ack - When false the device never pulls data low in the
     * acknowledge slot and sends no reply byte.
     */
    pub fn set_line_ack(&mut self, ack: bool) {
        self.line_ack = ack;
    }

    /* set_unplugged - An unplugged device never clocks */
    pub fn set_unplugged(&mut self, unplugged: bool) {
        self.unplugged = unplugged;
    }

    /*
     * clock_out - Clock raw data levels out to the host, one per clock period,
     * as the clock line is polled. The port sees each level on the falling
     * edge, the way the clock interrupt would.
     */
    pub fn clock_out(&mut self, levels: &[bool]) {
        let n = levels.len().min(WIRE);
        self.wire[..n].copy_from_slice(&levels[..n]);
        self.wire_len = n;
        self.wire_pos = 0;
        self.wire_low = false;
    }

    /* clock_out_done - True once every level queued by clock_out has been sent */
    pub fn clock_out_done(&self) -> bool {
        self.wire_pos >= self.wire_len
    }

    /* received - Bytes clocked in so far, oldest first */
    pub fn received(&self) -> &[u8] {
        &self.received[..self.received_len]
    }

    /* framing_errors - Transfers whose parity or stop bit was wrong */
    pub fn framing_errors(&self) -> u32 {
        self.framing_errors
    }

    /* lines_released - True when the host drives neither line */
    pub fn lines_released(&self) -> bool {
        !self.host_clock_low && !self.host_data_low
    }

    fn next_reply(&mut self) -> Reply {
        if self.script_pos < self.script_len {
            let r = self.script[self.script_pos];
            self.script_pos += 1;
            r
        } else {
            Reply::Byte(reply::ACK)
        }
    }

    fn finish_transfer(&mut self) {
        let byte = (self.shift & 0xFF) as u8;
        let parity = (self.shift >> 8) & 1 != 0;
        let stop = (self.shift >> 9) & 1 != 0;
        if parity != crate::odd_parity(byte) || !stop {
            self.framing_errors += 1;
        }
        if self.received_len < HISTORY {
            self.received[self.received_len] = byte;
            self.received_len += 1;
        }
    }

    fn step_clock(&mut self) -> bool {
        match self.phase {
            Phase::Idle => {
                if self.unplugged || self.host_clock_low {
                    return !self.host_clock_low;
                }
                if self.wire_pos < self.wire_len {
                    if self.wire_low {
                        self.wire_low = false;
                        self.wire_pos += 1;
                        return true;
                    }
                    self.wire_low = true;
                    self.port.on_clock_falling(self.wire[self.wire_pos]);
                    return false;
                }
                if self.host_data_low {
                    //Request to send seen: start clocking
                    self.shift = 0;
                    self.phase = Phase::Clocking { sampled: 0, low: true };
                    return false;
                }
                true
            }
            Phase::Clocking { sampled, low } => {
                if !low {
                    self.phase = Phase::Clocking { sampled, low: true };
                    return false;
                }
                //Device samples on the rising edge
                if !self.host_data_low {
                    self.shift |= 1 << sampled;
                }
                let sampled = sampled + 1;
                if sampled == 10 {
                    self.finish_transfer();
                    self.phase = Phase::AwaitRelease;
                } else {
                    self.phase = Phase::Clocking { sampled, low: false };
                }
                true
            }
            Phase::AwaitRelease => {
                if self.host_data_low {
                    return true;
                }
                self.device_data_low = self.line_ack;
                self.phase = Phase::Ack;
                false
            }
            Phase::Ack => {
                let acked = self.device_data_low;
                self.device_data_low = false;
                self.phase = Phase::Idle;
                if acked {
                    if let Reply::Byte(b) = self.next_reply() {
                        feed_byte(self.port, b);
                    }
                }
                true
            }
        }
    }
}

impl<const N: usize> Ps2Lines for SimKeyboard<'_, N> {
    fn clock_high(&mut self) -> bool {
        self.step_clock() && !self.host_clock_low
    }

    fn data_high(&mut self) -> bool {
        !(self.host_data_low || self.device_data_low)
    }

    fn pull_clock_low(&mut self) {
        self.host_clock_low = true;
    }

    fn release_clock(&mut self) {
        self.host_clock_low = false;
    }

    fn pull_data_low(&mut self) {
        self.host_data_low = true;
    }

    fn release_data(&mut self) {
        self.host_data_low = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_bytes_fills_port() {
        let port: Ps2Port = Ps2Port::new();
        feed_bytes(&port, &[0xE1, 0x1D, 0x45]);
        assert_eq!(port.pending(), 3);
    }

    #[test]
    fn test_idle_lines_read_high() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        assert!(kbd.clock_high());
        assert!(kbd.data_high());
        kbd.pull_clock_low();
        assert!(!kbd.clock_high());
        kbd.release_clock();
        assert!(kbd.lines_released());
    }

    #[test]
    fn test_clock_out_delivers_frame() {
        let port: Ps2Port = Ps2Port::new();
        let mut kbd = SimKeyboard::new(&port);
        kbd.clock_out(&frame_bits(0x1E));
        let mut lows = 0;
        while !kbd.clock_out_done() {
            if !kbd.clock_high() {
                lows += 1;
            }
        }
        assert_eq!(lows, 11);
        assert!(kbd.clock_high());
        assert_eq!(port.try_recv(), Some(0x1E));
    }
}
