/*
 * CPU Control Functions
 *
 * Halt, interrupt flag control, machine reset and the TSC time base.
 */

use crate::clock::Clock;
use crate::io::outb;
use crate::lines::IrqMask;
use x86_64::instructions::{hlt, interrupts};

/* 8042 controller command port and its "pulse reset line" command */
const KBC_COMMAND: u16 = 0x64;
const KBC_PULSE_RESET: u8 = 0xFE;

/*
 * halt - Halt the CPU until next interrupt
 */
#[inline(always)]
pub fn halt() {
	hlt();
}

/*
 * enable_interrupts - Set the interrupt flag (IF) in RFLAGS
 */
#[inline(always)]
pub fn enable_interrupts() {
	interrupts::enable();
}

/*
 * disable_interrupts - Clear the interrupt flag (IF) in RFLAGS
 */
#[inline(always)]
pub fn disable_interrupts() {
	interrupts::disable();
}

/*
 * halt_loop - Park the CPU for good
 */
pub fn halt_loop() -> ! {
	loop {
		disable_interrupts();
		halt();
	}
}

/*
 * reset_system - Hard reset through the 8042 reset line
 *
 * Falls back to parking the CPU if the controller ignores the pulse.
 */
pub fn reset_system() -> ! {
	disable_interrupts();
	unsafe {
		outb(KBC_COMMAND, KBC_PULSE_RESET);
	}
	halt_loop();
}

/*
 * struct CpuIrqMask - IrqMask backed by the CPU interrupt flag
 */
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuIrqMask;

impl IrqMask for CpuIrqMask {
	fn disable(&mut self) {
		disable_interrupts();
	}

	fn enable(&mut self) {
		enable_interrupts();
	}
}

/*
 * struct TscClock - Clock derived from the time stamp counter
 * @ticks_per_us: TSC frequency in MHz (invariant TSC assumed)
 */
#[derive(Debug, Clone, Copy)]
pub struct TscClock {
	ticks_per_us: u64,
}

impl TscClock {
	pub const fn new(tsc_mhz: u64) -> Self {
		Self {
			ticks_per_us: if tsc_mhz == 0 { 1 } else { tsc_mhz },
		}
	}
}

impl Clock for TscClock {
	fn now_us(&self) -> u64 {
		let ticks = unsafe { core::arch::x86_64::_rdtsc() };
		ticks / self.ticks_per_us
	}
}
