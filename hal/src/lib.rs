/*
 * Hardware Abstraction Layer (HAL)
 *
 * Hardware seams of the keyboard bridge:
 * - PS/2 line, parallel bus, interrupt mask and watchdog traits
 * - Clock with bounded busy waits
 * - x86 board backend (port I/O, serial console, LPT pins, PIT, TSC)
 */

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod lines;
pub mod watchdog;

#[cfg(target_arch = "x86_64")]
pub mod cpu;
#[cfg(target_arch = "x86_64")]
pub mod io;
#[cfg(target_arch = "x86_64")]
pub mod logger;
#[cfg(target_arch = "x86_64")]
pub mod lpt;
#[cfg(target_arch = "x86_64")]
pub mod pit;
#[cfg(target_arch = "x86_64")]
pub mod serial;

pub use clock::{Clock, ManualClock, TimedOut, wait_until};
pub use lines::{IrqMask, ParallelBus, Ps2Lines, Watchdog};

#[cfg(target_arch = "x86_64")]
pub use io::*;
#[cfg(target_arch = "x86_64")]
pub use serial::init_serial;
