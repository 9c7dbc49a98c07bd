/*
 * PS/2 device link
 *
 * Bit-level receive state machine fed from the clock interrupt, the scan code
 * ring it fills, the blocking host-to-device transmitter and the keyboard
 * command layer built on top of both.
 */

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod error;
pub mod port;
pub mod receiver;
pub mod ring;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod transmitter;

pub use command::{Leds, ScanCodeSet, Typematic};
pub use error::{CommandError, RxError, TxError, TxStage};
pub use port::{Ps2Port, RxStats};
pub use receiver::{Edge, FrameDecoder, RxState};
pub use ring::ScanBuffer;
pub use transmitter::{Ps2Host, Ps2Timing};

/* Capacity of the scan code ring */
pub const SCAN_BUFFER_LEN: usize = 32;

/*
 * odd_parity - Odd parity bit for a data byte
 *
 * Set when the byte has an even number of ones, so data plus parity always
 * carries an odd count.
 */
#[inline]
pub const fn odd_parity(byte: u8) -> bool {
    byte.count_ones() & 1 == 0
}
