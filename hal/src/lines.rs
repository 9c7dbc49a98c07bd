/*
 * Hardware Line Traits
 *
 * The bridge core only touches hardware through these traits so the
 * protocol logic runs unchanged on the board and in hosted tests.
 */

/*
 * trait Ps2Lines - The two open-collector PS/2 lines (clock, data)
 *
 * Both lines are pulled up externally. The host either pulls a line low
 * or releases it and lets the pull-up (or the device) decide the level.
 */
pub trait Ps2Lines {
	/* clock_high - Sample the clock line, true when high */
	fn clock_high(&mut self) -> bool;

	/* data_high - Sample the data line, true when high */
	fn data_high(&mut self) -> bool;

	fn pull_clock_low(&mut self);
	fn release_clock(&mut self);
	fn pull_data_low(&mut self);
	fn release_data(&mut self);

	/*
	 * set_data - Present a bit on the data line
	 * @high: bit value; 1 releases the line, 0 pulls it low
	 */
	fn set_data(&mut self, high: bool) {
		if high {
			self.release_data();
		} else {
			self.pull_data_low();
		}
	}
}

/*
 * trait ParallelBus - Eight latched output lines
 *
 * Bits 0..6 carry the Apple II key code, bit 7 drives the active-low
 * strobe. Writes are latched; nothing is ever read back from the host.
 */
pub trait ParallelBus {
	fn write(&mut self, value: u8);
}

/*
 * trait IrqMask - Global enable/disable of the receive interrupt
 */
pub trait IrqMask {
	fn disable(&mut self);
	fn enable(&mut self);
}

/*
 * trait Watchdog - Hardware reset safety net
 *
 * Once started, the watchdog resets the device unless fed within
 * the configured timeout.
 */
pub trait Watchdog {
	fn start(&mut self, timeout_ms: u32);
	fn feed(&mut self);
	fn stop(&mut self);
}

impl<T: Ps2Lines + ?Sized> Ps2Lines for &mut T {
	fn clock_high(&mut self) -> bool {
		(**self).clock_high()
	}

	fn data_high(&mut self) -> bool {
		(**self).data_high()
	}

	fn pull_clock_low(&mut self) {
		(**self).pull_clock_low()
	}

	fn release_clock(&mut self) {
		(**self).release_clock()
	}

	fn pull_data_low(&mut self) {
		(**self).pull_data_low()
	}

	fn release_data(&mut self) {
		(**self).release_data()
	}
}

impl<T: ParallelBus + ?Sized> ParallelBus for &mut T {
	fn write(&mut self, value: u8) {
		(**self).write(value)
	}
}

impl<T: IrqMask + ?Sized> IrqMask for &mut T {
	fn disable(&mut self) {
		(**self).disable()
	}

	fn enable(&mut self) {
		(**self).enable()
	}
}
