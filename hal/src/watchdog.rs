/*
 * Software Watchdog
 *
 * A tick-driven watchdog for boards without a usable hardware one.
 * A periodic timer interrupt calls tick(); the main loop feeds it.
 * All state lives in atomics so the timer ISR and the main loop can
 * share one static instance.
 */

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::lines::Watchdog;

/*
 * struct SoftWatchdog - Countdown reset timer
 * @armed: set by start(), cleared by stop() (main loop only)
 * @reload: ticks granted on every feed (main loop only)
 * @remaining: ticks left before expiry (timer ISR decrements)
 */
pub struct SoftWatchdog {
	armed: AtomicBool,
	reload: AtomicU32,
	remaining: AtomicU32,
	tick_ms: u32,
}

impl SoftWatchdog {
	/*
	 * new - Create a disarmed watchdog
	 * @tick_ms: period of the timer calling tick()
	 */
	pub const fn new(tick_ms: u32) -> Self {
		Self {
			armed: AtomicBool::new(false),
			reload: AtomicU32::new(0),
			remaining: AtomicU32::new(0),
			tick_ms,
		}
	}

	pub fn arm(&self, timeout_ms: u32) {
		let ticks = (timeout_ms / self.tick_ms.max(1)).max(1);
		self.reload.store(ticks, Ordering::Relaxed);
		self.remaining.store(ticks, Ordering::Relaxed);
		self.armed.store(true, Ordering::Release);
	}

	pub fn pet(&self) {
		let reload = self.reload.load(Ordering::Relaxed);
		self.remaining.store(reload, Ordering::Release);
	}

	pub fn disarm(&self) {
		self.armed.store(false, Ordering::Release);
	}

	pub fn is_armed(&self) -> bool {
		self.armed.load(Ordering::Acquire)
	}

	/*
	 * tick - Advance the countdown by one timer period
	 *
	 * Returns true once the countdown has run out; the caller is
	 * expected to reset the machine.
	 */
	pub fn tick(&self) -> bool {
		if !self.armed.load(Ordering::Acquire) {
			return false;
		}
		let left = self.remaining.load(Ordering::Acquire);
		if left <= 1 {
			self.remaining.store(0, Ordering::Release);
			return true;
		}
		self.remaining.store(left - 1, Ordering::Release);
		false
	}
}

impl Watchdog for &SoftWatchdog {
	fn start(&mut self, timeout_ms: u32) {
		self.arm(timeout_ms);
	}

	fn feed(&mut self) {
		self.pet();
	}

	fn stop(&mut self) {
		self.disarm();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_disarmed_never_expires() {
		let wd = SoftWatchdog::new(1);
		for _ in 0..1000 {
			assert!(!wd.tick());
		}
	}

	#[test]
	fn test_expires_without_feed() {
		let wd = SoftWatchdog::new(1);
		wd.arm(5);
		for _ in 0..4 {
			assert!(!wd.tick());
		}
		assert!(wd.tick());
	}

	#[test]
	fn test_feed_reloads_countdown() {
		let wd = SoftWatchdog::new(10);
		let mut handle = &wd;
		handle.start(50);
		for _ in 0..20 {
			assert!(!wd.tick());
			assert!(!wd.tick());
			handle.feed();
		}
		handle.stop();
		assert!(!wd.is_armed());
	}
}
