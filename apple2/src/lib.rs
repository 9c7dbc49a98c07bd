/*
 * Apple II Keyboard Port Writer
 *
 * Presents a key code on the seven data lines of the Apple II keyboard
 * connector and pulses the active-low strobe. The Apple latches the code
 * on the strobe's falling edge; nothing is ever read back.
 *
 *  b7 b6 b5 b4 b3 b2 b1 b0
 *  |  +--+--+--+--+--+--+--- key code
 *  +------------------------ ^STB
 */

#![cfg_attr(not(test), no_std)]

use core::fmt;

use hal::clock::Clock;
use hal::lines::ParallelBus;
use log::trace;

pub const STROBE: u8 = 0b1000_0000;
pub const CODE_MASK: u8 = 0b0111_1111;

/*
 * struct AppleTiming - Strobe timing
 * @settle_ms: data hold time before the strobe
 * @strobe_us: strobe low time, at least 1 us
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppleTiming {
	pub settle_ms: u32,
	pub strobe_us: u32,
}

impl AppleTiming {
	pub const DEFAULT: Self = Self {
		settle_ms: 8,
		strobe_us: 2,
	};
}

impl Default for AppleTiming {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/* Only codes with bit 7 set are keys; the bit doubles as the idle strobe */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAKey(pub u8);

impl fmt::Display for NotAKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#04x} is not an Apple II key code", self.0)
	}
}

/*
 * struct ParallelOutputState - What the connector currently shows
 * @code: 7-bit code on the data lines
 * @strobe_high: strobe level, high when idle
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOutputState {
	pub code: u8,
	pub strobe_high: bool,
}

/*
 * struct AppleWriter - Sole owner of the output latch
 * @bus: the eight output lines
 * @latch: last value driven onto @bus
 */
pub struct AppleWriter<B> {
	bus: B,
	latch: u8,
	timing: AppleTiming,
}

impl<B: ParallelBus> AppleWriter<B> {
	/*
	 * new - Take over the bus with the strobe idle high and no code
	 */
	pub fn new(mut bus: B, timing: AppleTiming) -> Self {
		bus.write(STROBE);
		Self {
			bus,
			latch: STROBE,
			timing,
		}
	}

	pub fn state(&self) -> ParallelOutputState {
		ParallelOutputState {
			code: self.latch & CODE_MASK,
			strobe_high: self.latch & STROBE != 0,
		}
	}

	/*
	 * write - Present @code and strobe it into the Apple
	 * @clock: time base for the settle and strobe delays
	 * @code: Apple II key code, bit 7 set
	 *
	 * Codes without bit 7 are refused and nothing is strobed.
	 */
	pub fn write<C: Clock + ?Sized>(&mut self, clock: &C, code: u8) -> Result<(), NotAKey> {
		if code & STROBE == 0 {
			return Err(NotAKey(code));
		}

		self.latch(code);
		clock.delay_ms(self.timing.settle_ms);
		self.strobe(clock);
		trace!("apple2: wrote {:#04x}", code);
		Ok(())
	}

	fn strobe<C: Clock + ?Sized>(&mut self, clock: &C) {
		self.latch(self.latch & !STROBE);
		clock.delay_us(self.timing.strobe_us);
		self.latch(self.latch | STROBE);
	}

	fn latch(&mut self, value: u8) {
		self.latch = value;
		self.bus.write(value);
	}
}
