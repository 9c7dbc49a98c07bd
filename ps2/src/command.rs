/*
 * Keyboard configuration commands
 *
 * Every command is a two-phase exchange: command byte, reply; and, only if the
 * reply was ACK, parameter byte, reply. The caller gets the last reply byte to
 * inspect.
 */

use bitflags::bitflags;
use hal::clock::Clock;
use hal::lines::{IrqMask, Ps2Lines};
use log::debug;

use crate::error::CommandError;
use crate::transmitter::Ps2Host;

/* Host-to-keyboard command bytes */
pub mod cmd {
    pub const SET_LEDS: u8 = 0xED;
    pub const ECHO: u8 = 0xEE;
    pub const SCAN_CODE_SET: u8 = 0xF0;
    pub const TYPEMATIC: u8 = 0xF3;
    pub const ENABLE: u8 = 0xF4;
    pub const DISABLE: u8 = 0xF5;
    pub const SET_DEFAULTS: u8 = 0xF6;
    pub const RESEND: u8 = 0xFE;
    pub const RESET: u8 = 0xFF;
}

/* Keyboard-to-host reply bytes */
pub mod reply {
    pub const KEY_ERROR_SET23: u8 = 0x00;
    pub const BAT_OK: u8 = 0xAA;
    pub const ECHO: u8 = 0xEE;
    pub const BREAK_PREFIX: u8 = 0xF0;
    pub const ACK: u8 = 0xFA;
    pub const BAT_FAILED: u8 = 0xFC;
    pub const RESEND: u8 = 0xFE;
    pub const KEY_ERROR_SET1: u8 = 0xFF;
}

bitflags! {
    /* LED mask carried by SET_LEDS */
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Leds: u8 {
        const SCROLL_LOCK = 0b001;
        const NUM_LOCK = 0b010;
        const CAPS_LOCK = 0b100;
    }
}

/*
 * struct Typematic - Typematic rate/delay byte
 *
 * Bits 0..4 pick the repeat rate (0 = 30 Hz .. 31 = 2 Hz), bits 5..6 the delay
 * before repeat starts (0 = 250 ms .. 3 = 1000 ms). Bit 7 must be zero.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typematic {
    rate: u8,
    delay: u8,
}

impl Typematic {
    /* 1 s delay, 2 Hz repeat */
    pub const SLOWEST: Self = Self { rate: 0x1F, delay: 0x03 };

    pub const fn new(rate: u8, delay: u8) -> Self {
        Self {
            rate: rate & 0x1F,
            delay: delay & 0x03,
        }
    }

    /* from_bits - Decode a raw byte; bit 7 is dropped */
    pub const fn from_bits(bits: u8) -> Self {
        Self::new(bits, bits >> 5)
    }

    pub const fn bits(self) -> u8 {
        (self.delay << 5) | self.rate
    }

    pub const fn rate(self) -> u8 {
        self.rate
    }

    pub const fn delay(self) -> u8 {
        self.delay
    }

    pub const fn delay_ms(self) -> u32 {
        (self.delay as u32 + 1) * 250
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanCodeSet {
    Set1 = 1,
    Set2 = 2,
    Set3 = 3,
}

impl TryFrom<u8> for ScanCodeSet {
    type Error = CommandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ScanCodeSet::Set1),
            2 => Ok(ScanCodeSet::Set2),
            3 => Ok(ScanCodeSet::Set3),
            _ => Err(CommandError::InvalidParameter {
                command: cmd::SCAN_CODE_SET,
                value,
            }),
        }
    }
}

/* Order the LED self test lights the LEDs in */
pub const LED_TEST_SEQUENCE: [Leds; 5] = [
    Leds::SCROLL_LOCK,
    Leds::CAPS_LOCK,
    Leds::NUM_LOCK,
    Leds::CAPS_LOCK,
    Leds::SCROLL_LOCK,
];

impl<L, I, C, const N: usize> Ps2Host<'_, L, I, C, N>
where
    L: Ps2Lines,
    I: IrqMask,
    C: Clock,
{
    /* command - Run one command/parameter exchange and return the last reply */
    pub fn command(&mut self, command: u8, param: u8) -> Result<u8, CommandError> {
        let timeout = self.timing().response_timeout_us;

        self.send(command)?;
        let first = self
            .recv_timeout(timeout)
            .map_err(|_| CommandError::NoResponse { command })?;
        if first != reply::ACK {
            debug!("ps2: command {:#04x} answered {:#04x}", command, first);
            return Ok(first);
        }

        self.send(param)?;
        let second = self
            .recv_timeout(timeout)
            .map_err(|_| CommandError::NoResponse { command })?;
        debug!("ps2: command {:#04x} {:#04x} -> {:#04x}", command, param, second);
        Ok(second)
    }

    pub fn set_leds(&mut self, leds: Leds) -> Result<u8, CommandError> {
        self.command(cmd::SET_LEDS, leds.bits() & 0x07)
    }

    pub fn set_typematic(&mut self, typematic: Typematic) -> Result<u8, CommandError> {
        self.command(cmd::TYPEMATIC, typematic.bits() & 0x7F)
    }

    /*
     * set_scan_code_set - Select a scan code set. Anything but 1, 2 or 3 is
     * refused before the lines are touched.
     */
    pub fn set_scan_code_set(&mut self, set: u8) -> Result<u8, CommandError> {
        let set = ScanCodeSet::try_from(set)?;
        self.command(cmd::SCAN_CODE_SET, set as u8)
    }

    /*
     * led_test - Light the LEDs one after another, step_ms each, with all LEDs
     * off between steps and at the end.
     *
     * Every step runs even if an earlier one failed; the first failure is
     * returned.
     */
    pub fn led_test(&mut self, step_ms: u32) -> Result<(), CommandError> {
        let mut first_error = None;
        for leds in LED_TEST_SEQUENCE {
            for step in [leds, Leds::empty()] {
                if let Err(err) = self.set_leds(step) {
                    first_error.get_or_insert(err);
                }
                if !step.is_empty() {
                    self.clock().delay_ms(step_ms);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
