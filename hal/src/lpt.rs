/*
 * Parallel Port Board Backend
 *
 * Reference wiring on a standard PC parallel port:
 *
 *   Data  D0..D6  -> Apple II key code lines
 *   Data  D7      -> Apple II ^STB
 *   Status SELECT     (pin 13) <- PS/2 clock sense
 *   Status PAPER OUT  (pin 12) <- PS/2 data sense
 *   Control nINIT     (pin 16) -> PS/2 clock drive (open collector)
 *   Control nSELECTIN (pin 17) -> PS/2 data drive (open collector, inverted)
 *   Status nACK       (pin 10) <- PS/2 clock through an inverter, raises IRQ7
 *                                on every falling edge of the clock
 */

use crate::io::{inb, outb};
use crate::lines::{ParallelBus, Ps2Lines};

pub const LPT1_BASE: u16 = 0x378;
pub const LPT1_IRQ: u8 = 7;

const DATA_REG: u16 = 0;
const STATUS_REG: u16 = 1;
const CONTROL_REG: u16 = 2;

const STATUS_CLOCK: u8 = 1 << 4;
const STATUS_DATA: u8 = 1 << 5;

/* nINIT is not inverted by the port: 0 pulls the pin low */
const CTRL_CLOCK_RELEASE: u8 = 1 << 2;
/* nSELECTIN is inverted by the port: 1 pulls the pin low */
const CTRL_DATA_PULL: u8 = 1 << 3;
const CTRL_IRQ_ENABLE: u8 = 1 << 4;

/*
 * struct LptPs2Lines - PS/2 lines on the parallel port control/status pins
 * @base: port base address
 * @control: shadow of the control register (main loop only)
 */
pub struct LptPs2Lines {
	base: u16,
	control: u8,
}

impl LptPs2Lines {
	pub const fn new(base: u16) -> Self {
		Self {
			base,
			control: CTRL_CLOCK_RELEASE | CTRL_IRQ_ENABLE,
		}
	}

	/*
	 * init - Release both lines and enable the nACK interrupt
	 */
	pub unsafe fn init(&mut self) {
		self.control = CTRL_CLOCK_RELEASE | CTRL_IRQ_ENABLE;
		unsafe { self.flush() };
	}

	/*
	 * sample - Read (clock_high, data_high) without touching the shadow
	 * @base: port base address
	 *
	 * Used from the clock interrupt, which never drives the lines.
	 */
	pub fn sample(base: u16) -> (bool, bool) {
		let status = unsafe { inb(base + STATUS_REG) };
		(status & STATUS_CLOCK != 0, status & STATUS_DATA != 0)
	}

	unsafe fn flush(&self) {
		unsafe { outb(self.base + CONTROL_REG, self.control) };
	}
}

impl Ps2Lines for LptPs2Lines {
	fn clock_high(&mut self) -> bool {
		Self::sample(self.base).0
	}

	fn data_high(&mut self) -> bool {
		Self::sample(self.base).1
	}

	fn pull_clock_low(&mut self) {
		self.control &= !CTRL_CLOCK_RELEASE;
		unsafe { self.flush() };
	}

	fn release_clock(&mut self) {
		self.control |= CTRL_CLOCK_RELEASE;
		unsafe { self.flush() };
	}

	fn pull_data_low(&mut self) {
		self.control |= CTRL_DATA_PULL;
		unsafe { self.flush() };
	}

	fn release_data(&mut self) {
		self.control &= !CTRL_DATA_PULL;
		unsafe { self.flush() };
	}
}

/*
 * struct LptAppleBus - Apple II keyboard lines on the data register
 */
pub struct LptAppleBus {
	base: u16,
}

impl LptAppleBus {
	pub const fn new(base: u16) -> Self {
		Self { base }
	}
}

impl ParallelBus for LptAppleBus {
	fn write(&mut self, value: u8) {
		unsafe { outb(self.base + DATA_REG, value) };
	}
}
