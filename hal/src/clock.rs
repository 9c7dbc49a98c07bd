/*
 * Time Base
 *
 * Microsecond clock used for protocol delays and for the bounded
 * busy-waits that replace the firmware's unbounded polling loops.
 */

use core::cell::Cell;
use core::fmt;

/*
 * trait Clock - Monotonic microsecond time source
 *
 * Only now_us() is required; the delays spin on it by default.
 */
pub trait Clock {
	fn now_us(&self) -> u64;

	fn delay_us(&self, us: u32) {
		let start = self.now_us();
		while self.now_us().wrapping_sub(start) < us as u64 {
			core::hint::spin_loop();
		}
	}

	fn delay_ms(&self, ms: u32) {
		for _ in 0..ms {
			self.delay_us(1000);
		}
	}
}

impl<C: Clock + ?Sized> Clock for &C {
	fn now_us(&self) -> u64 {
		(**self).now_us()
	}

	fn delay_us(&self, us: u32) {
		(**self).delay_us(us)
	}

	fn delay_ms(&self, ms: u32) {
		(**self).delay_ms(ms)
	}
}

/* A bounded wait ran out of time */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("timed out")
	}
}

/*
 * wait_until - Spin until a condition holds or a timeout expires
 * @clock: time source
 * @timeout_us: budget in microseconds
 * @cond: polled condition
 *
 * The condition is always polled at least once, even with a zero budget.
 */
pub fn wait_until<C, F>(clock: &C, timeout_us: u32, mut cond: F) -> Result<(), TimedOut>
where
	C: Clock + ?Sized,
	F: FnMut() -> bool,
{
	let start = clock.now_us();
	loop {
		if cond() {
			return Ok(());
		}
		if clock.now_us().wrapping_sub(start) >= timeout_us as u64 {
			return Err(TimedOut);
		}
		core::hint::spin_loop();
	}
}

/*
 * struct ManualClock - Simulated clock for hosted runs
 * @now: current time in microseconds
 * @step: time that passes on every now_us() read
 *
 * Delays advance time instantly, and every read moves time forward by
 * @step so polling loops always reach their deadline.
 */
pub struct ManualClock {
	now: Cell<u64>,
	step: u64,
}

impl ManualClock {
	pub const fn new(step: u64) -> Self {
		Self {
			now: Cell::new(0),
			step,
		}
	}

	pub fn advance(&self, us: u64) {
		self.now.set(self.now.get() + us);
	}

	/* elapsed - Current time without advancing it */
	pub fn elapsed(&self) -> u64 {
		self.now.get()
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new(1)
	}
}

impl Clock for ManualClock {
	fn now_us(&self) -> u64 {
		let now = self.now.get();
		self.now.set(now + self.step);
		now
	}

	fn delay_us(&self, us: u32) {
		self.advance(us as u64);
	}

	fn delay_ms(&self, ms: u32) {
		self.advance(ms as u64 * 1000);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wait_until_immediate() {
		let clock = ManualClock::default();
		assert_eq!(wait_until(&clock, 0, || true), Ok(()));
	}

	#[test]
	fn test_wait_until_times_out() {
		let clock = ManualClock::new(10);
		let mut polls = 0;
		let result = wait_until(&clock, 100, || {
			polls += 1;
			false
		});
		assert_eq!(result, Err(TimedOut));
		assert!(clock.elapsed() >= 100);
		assert!(polls >= 10);
	}

	#[test]
	fn test_wait_until_condition_met_later() {
		let clock = ManualClock::default();
		let mut polls = 0;
		let result = wait_until(&clock, 1000, || {
			polls += 1;
			polls == 5
		});
		assert_eq!(result, Ok(()));
		assert_eq!(polls, 5);
	}

	#[test]
	fn test_manual_clock_delays() {
		let clock = ManualClock::new(0);
		clock.delay_ms(3);
		clock.delay_us(250);
		assert_eq!(clock.now_us(), 3250);
	}

	#[test]
	fn test_default_delay_spins_on_now() {
		struct Ticker(Cell<u64>);
		impl Clock for Ticker {
			fn now_us(&self) -> u64 {
				let t = self.0.get();
				self.0.set(t + 7);
				t
			}
		}

		let ticker = Ticker(Cell::new(0));
		ticker.delay_us(100);
		assert!(ticker.0.get() >= 100);
	}
}
