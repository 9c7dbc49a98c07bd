/*
 * 8254 Programmable Interval Timer
 *
 * Channel 0 provides the periodic tick that drives the software
 * watchdog.
 */

use crate::io::outb;

const PIT_CHANNEL0: u16 = 0x40;
const PIT_COMMAND: u16 = 0x43;

/* Channel 0, lobyte/hibyte access, mode 3 (square wave), binary */
const PIT_CH0_SQUARE_WAVE: u8 = 0x36;

pub const PIT_BASE_HZ: u32 = 1_193_182;

/*
 * divisor_for - Reload value for a tick rate
 * @hz: requested tick rate
 *
 * Clamped to the 16-bit counter; 0 stands for 65536 in hardware.
 */
pub const fn divisor_for(hz: u32) -> u16 {
	if hz == 0 {
		return 0;
	}
	let div = PIT_BASE_HZ / hz;
	if div > 0xFFFF {
		0
	} else if div == 0 {
		1
	} else {
		div as u16
	}
}

/*
 * init_periodic - Program channel 0 to fire IRQ0 at @hz
 */
pub unsafe fn init_periodic(hz: u32) {
	let divisor = divisor_for(hz);
	unsafe {
		outb(PIT_COMMAND, PIT_CH0_SQUARE_WAVE);
		outb(PIT_CHANNEL0, (divisor & 0xFF) as u8);
		outb(PIT_CHANNEL0, (divisor >> 8) as u8);
	}
}
