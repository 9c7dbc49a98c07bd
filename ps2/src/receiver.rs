/*
 * Device-to-host frame decoder
 *
 * A frame is 11 bits sampled on falling clock edges: start (0), eight data
 * bits LSB first, odd parity, stop (1). The decoder is driven one edge at a
 * time from the clock interrupt and never blocks.
 */

use crate::error::RxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    Idle,
    DataBits,
    Parity,
    Stop,
    /* Parked after a framing error; edges are ignored until reset */
    Failed(RxError),
}

/* Outcome of one clock edge */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pending,
    Complete(u8),
    Failed(RxError),
}

#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: RxState,
    byte: u8,
    bits: u8,
    ones: u8,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: RxState::Idle,
            byte: 0,
            bits: 0,
            ones: 0,
        }
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /*
     * fail - Park the decoder in an error state, as if the edge that caused
     * err had just been seen.
     */
    pub fn fail(&mut self, err: RxError) {
        self.state = RxState::Failed(err);
    }

    /* clock - Advance by one falling clock edge with the sampled data level */
    pub fn clock(&mut self, data: bool) -> Edge {
        let bit = data as u8;
        match self.state {
            RxState::Failed(_) => Edge::Pending,
            RxState::Idle => {
                if bit == 0 {
                    self.byte = 0;
                    self.bits = 0;
                    self.ones = 0;
                    self.state = RxState::DataBits;
                    Edge::Pending
                } else {
                    self.raise(RxError::StartBit)
                }
            }
            RxState::DataBits => {
                self.byte |= bit << self.bits;
                self.ones += bit;
                self.bits += 1;
                if self.bits == 8 {
                    self.state = RxState::Parity;
                }
                Edge::Pending
            }
            RxState::Parity => {
                if (self.ones + bit) & 1 == 1 {
                    self.state = RxState::Stop;
                    Edge::Pending
                } else {
                    self.raise(RxError::Parity)
                }
            }
            RxState::Stop => {
                if bit == 1 {
                    self.state = RxState::Idle;
                    Edge::Complete(self.byte)
                } else {
                    self.raise(RxError::StopBit)
                }
            }
        }
    }

    fn raise(&mut self, err: RxError) -> Edge {
        self.state = RxState::Failed(err);
        Edge::Failed(err)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/* frame_bits - Line levels of a well-formed frame carrying byte, in wire order */
pub const fn frame_bits(byte: u8) -> [bool; 11] {
    let mut bits = [false; 11];
    let mut i = 0;
    while i < 8 {
        bits[1 + i] = (byte >> i) & 1 != 0;
        i += 1;
    }
    bits[9] = crate::odd_parity(byte);
    bits[10] = true;
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(decoder: &mut FrameDecoder, bits: &[bool]) -> Edge {
        let mut last = Edge::Pending;
        for &b in bits {
            last = decoder.clock(b);
        }
        last
    }

    #[test]
    fn test_every_byte_decodes() {
        let mut decoder = FrameDecoder::new();
        for byte in 0..=255u8 {
            assert_eq!(run(&mut decoder, &frame_bits(byte)), Edge::Complete(byte));
            assert_eq!(decoder.state(), RxState::Idle);
        }
    }

    #[test]
    fn test_start_bit_error() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.clock(true), Edge::Failed(RxError::StartBit));
        assert_eq!(decoder.state(), RxState::Failed(RxError::StartBit));
    }

    #[test]
    fn test_even_parity_rejected() {
        for byte in [0x00u8, 0x1E, 0xAA, 0xFF] {
            let mut bits = frame_bits(byte);
            bits[9] = !bits[9];
            let mut decoder = FrameDecoder::new();
            assert_eq!(run(&mut decoder, &bits[..10]), Edge::Failed(RxError::Parity));
            //Stop bit is swallowed by the parked decoder
            assert_eq!(decoder.clock(true), Edge::Pending);
            assert_eq!(decoder.state(), RxState::Failed(RxError::Parity));
        }
    }

    #[test]
    fn test_stop_bit_error() {
        let mut bits = frame_bits(0x1C);
        bits[10] = false;
        let mut decoder = FrameDecoder::new();
        assert_eq!(run(&mut decoder, &bits), Edge::Failed(RxError::StopBit));
    }

    #[test]
    fn test_failed_ignores_edges_until_reset() {
        let mut decoder = FrameDecoder::new();
        decoder.fail(RxError::Overrun);
        assert_eq!(run(&mut decoder, &frame_bits(0x1E)), Edge::Pending);
        decoder.reset();
        assert_eq!(run(&mut decoder, &frame_bits(0x1E)), Edge::Complete(0x1E));
    }

    #[test]
    fn test_frame_bits_layout() {
        let bits = frame_bits(0x01);
        assert!(!bits[0]);
        assert!(bits[1]);
        assert!(bits[2..9].iter().all(|b| !b));
        assert!(!bits[9]);
        assert!(bits[10]);
    }
}
