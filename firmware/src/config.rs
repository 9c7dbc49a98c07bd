/*
 * Compiled-in bridge configuration
 */

use apple2::AppleTiming;
use ps2::{Leds, Ps2Timing, Typematic};

#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
    /* Wait for the keyboard's power-on self test before talking to it */
    pub power_on_delay_ms: u32,
    /* How long each LED stays lit during the startup LED test */
    pub led_test_step_ms: u32,
    pub typematic: Typematic,
    pub scan_code_set: u8,
    /* LEDs left on after startup as a power indicator */
    pub power_leds: Leds,
    pub watchdog_timeout_ms: u32,
    /* Quiet time before a receiver parked on an error is reset */
    pub resync_quiet_ms: u32,
    /* Budget for each follow-up byte of an E0/E1 sequence */
    pub escape_timeout_us: u32,
    pub ps2: Ps2Timing,
    pub apple: AppleTiming,
    /* Parallel port the board is wired to */
    pub lpt_base: u16,
    /* TSC frequency used as the microsecond time base */
    pub tsc_mhz: u64,
}

impl BridgeConfig {
    pub const DEFAULT: Self = Self {
        power_on_delay_ms: 1000,
        led_test_step_ms: 200,
        typematic: Typematic::SLOWEST,
        scan_code_set: 1,
        power_leds: Leds::CAPS_LOCK,
        watchdog_timeout_ms: 500,
        resync_quiet_ms: 2,
        escape_timeout_us: 20_000,
        ps2: Ps2Timing::DEFAULT,
        apple: AppleTiming::DEFAULT,
        lpt_base: 0x378,
        tsc_mhz: 2_000,
    };
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
