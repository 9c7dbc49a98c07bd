/*
 * Scan code set 1 to Apple II key code translation
 *
 * The translator reduces any PS/2 keyboard to the 83-key layout the Apple II
 * understands: E0 duplicates are folded away, the Pause sequence is swallowed,
 * shift and ctrl are tracked, and only make codes of keys with an Apple
 * equivalent produce output.
 */

#![cfg_attr(not(test), no_std)]

pub mod table;

use bitflags::bitflags;
use log::trace;

use table::{APPLE_CODES, LEFT_ARROW_SLOT, RIGHT_ARROW_SLOT};

pub const PREFIX_E0: u8 = 0xE0;
pub const PREFIX_E1: u8 = 0xE1;

pub const CTRL_MAKE: u8 = 0x1D;
pub const CTRL_BREAK: u8 = 0x9D;
pub const LSHIFT_MAKE: u8 = 0x2A;
pub const RSHIFT_MAKE: u8 = 0x36;
pub const LSHIFT_BREAK: u8 = 0xAA;
pub const RSHIFT_BREAK: u8 = 0xB6;

const E0_LEFT: u8 = 0x4B;
const E0_RIGHT: u8 = 0x4D;

bitflags! {
    /* Modifier keys held down; the bits double as the table row index */
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 0b01;
        const SHIFT = 0b10;
    }
}

/* Where the translator pulls scan codes from */
pub trait ScanSource {
    /* poll - Next code if one is queued */
    fn poll(&mut self) -> Option<u8>;

    /*
     * wait - Next code of a sequence already under way. None means it never
     * arrived and the sequence is abandoned.
     */
    fn wait(&mut self) -> Option<u8>;
}

/*
 * is_discarded - Codes dropped after modifier handling: backspace, tab,
 * brackets, quote, backtick, backslash, and everything from caps lock up,
 * which includes every break code.
 */
pub const fn is_discarded(code: u8) -> bool {
    matches!(code, 14 | 15 | 26 | 27 | 40 | 41 | 43 | 58..=255)
}

/*
 * lookup - Apple code for a make code under the given modifiers, or None when
 * the table has no mapping.
 */
pub fn lookup(modifiers: Modifiers, code: u8) -> Option<u8> {
    let row = &APPLE_CODES[modifiers.bits() as usize & 0x03];
    let entry = *row.get(code as usize)?;
    (entry & 0x80 != 0).then_some(entry)
}

#[derive(Debug, Default)]
pub struct Translator {
    modifiers: Modifiers,
}

impl Translator {
    pub const fn new() -> Self {
        Self {
            modifiers: Modifiers::empty(),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /*
     * poll - Pull the next key event from source and translate it. Returns
     * None when nothing is queued or the event produces no Apple code.
     */
    pub fn poll<S: ScanSource + ?Sized>(&mut self, source: &mut S) -> Option<u8> {
        let first = source.poll()?;
        self.translate(first, source)
    }

    /*
     * translate - Translate the event starting with first, reading any
     * follow-up bytes of an escape sequence from source.
     */
    pub fn translate<S: ScanSource + ?Sized>(&mut self, first: u8, source: &mut S) -> Option<u8> {
        let mut code = first;

        if code == PREFIX_E1 {
            code = source.wait()?;
            if code == CTRL_MAKE || code == CTRL_BREAK {
                let last = source.wait();
                trace!("kbd: dropped E1 {:#04x} {:?}", code, last);
                return None;
            }
        }

        if code == PREFIX_E0 {
            code = match source.wait()? {
                //Right ctrl behaves as left ctrl
                c @ (CTRL_MAKE | CTRL_BREAK) => c,
                E0_LEFT => LEFT_ARROW_SLOT,
                E0_RIGHT => RIGHT_ARROW_SLOT,
                other => {
                    trace!("kbd: dropped E0 {:#04x}", other);
                    return None;
                }
            };
        }

        match code {
            CTRL_MAKE => {
                self.modifiers.insert(Modifiers::CTRL);
                return None;
            }
            CTRL_BREAK => {
                self.modifiers.remove(Modifiers::CTRL);
                return None;
            }
            LSHIFT_MAKE | RSHIFT_MAKE => {
                self.modifiers.insert(Modifiers::SHIFT);
                return None;
            }
            LSHIFT_BREAK | RSHIFT_BREAK => {
                self.modifiers.remove(Modifiers::SHIFT);
                return None;
            }
            _ => {}
        }

        if code == 0 || is_discarded(code) {
            return None;
        }

        lookup(self.modifiers, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use table::{NO_KEY, SCAN_CODES};

    //Queue of codes; wait behaves like poll on an already filled buffer
    struct Codes(VecDeque<u8>);

    impl Codes {
        fn new(codes: &[u8]) -> Self {
            Codes(codes.iter().copied().collect())
        }
    }

    impl ScanSource for Codes {
        fn poll(&mut self) -> Option<u8> {
            self.0.pop_front()
        }

        fn wait(&mut self) -> Option<u8> {
            self.0.pop_front()
        }
    }

    /* run - Translate everything queued, collecting the output */
    fn run(translator: &mut Translator, codes: &[u8]) -> Vec<u8> {
        let mut src = Codes::new(codes);
        let mut out = Vec::new();
        while !src.0.is_empty() {
            if let Some(b) = translator.poll(&mut src) {
                out.push(b);
            }
        }
        out
    }

    #[test]
    fn test_plain_letters() {
        let mut t = Translator::new();
        //A down, A up, Z down, Z up
        assert_eq!(run(&mut t, &[0x1E, 0x9E, 0x2C, 0xAC]), vec![0xC1, 0xDA]);
    }

    #[test]
    fn test_normal_and_shift_rows() {
        let mut t = Translator::new();
        assert_eq!(run(&mut t, &[0x1E]), vec![APPLE_CODES[0][0x1E]]);
        assert_eq!(run(&mut t, &[0x2A, 0x1E, 0xAA]), vec![APPLE_CODES[2][0x1E]]);
        //'2' gives '"' with shift on the Apple layout
        assert_eq!(run(&mut t, &[0x03]), vec![0xB2]);
        assert_eq!(run(&mut t, &[0x36, 0x03, 0xB6]), vec![0xA2]);
        assert_eq!(t.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_ctrl_rows() {
        let mut t = Translator::new();
        //Ctrl-C, then right ctrl (E0 1D) + shift + P gives Ctrl-@
        assert_eq!(run(&mut t, &[0x1D, 0x2E, 0x9D]), vec![0x83]);
        assert_eq!(
            run(&mut t, &[0xE0, 0x1D, 0x2A, 0x19, 0xAA, 0xE0, 0x9D]),
            vec![0x80]
        );
        assert_eq!(t.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_arrows_ignore_modifiers() {
        for held in [
            &[][..],
            &[LSHIFT_MAKE][..],
            &[CTRL_MAKE][..],
            &[CTRL_MAKE, RSHIFT_MAKE][..],
        ] {
            let mut t = Translator::new();
            run(&mut t, held);
            assert_eq!(run(&mut t, &[0xE0, 0x4B]), vec![0x88]);
            assert_eq!(run(&mut t, &[0xE0, 0x4D]), vec![0x95]);
            for row in 0..4 {
                assert_eq!(APPLE_CODES[row][55], 0x88);
                assert_eq!(APPLE_CODES[row][56], 0x95);
            }
        }
    }

    #[test]
    fn test_e0_break_and_keypad_duplicates_dropped() {
        let mut t = Translator::new();
        //Arrow breaks, keypad enter, PrintScreen make and break
        let codes = [
            0xE0, 0xCB, 0xE0, 0xCD, 0xE0, 0x1C, 0xE0, 0x2A, 0xE0, 0x37, 0xE0, 0xB7, 0xE0, 0xAA,
        ];
        assert!(run(&mut t, &codes).is_empty());
        //The fake shift inside PrintScreen must not stick
        assert_eq!(t.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_pause_sequence_swallowed() {
        let mut t = Translator::new();
        for seq in [[0xE1u8, 0x1D, 0x45], [0xE1, 0x9D, 0xC5], [0xE1, 0x1D, 0x1E]] {
            let mut src = Codes::new(&seq);
            assert_eq!(t.poll(&mut src), None);
            assert!(src.0.is_empty());
        }
        assert_eq!(t.modifiers(), Modifiers::empty());
        //Full six-byte Pause make: E1 1D 45 E1 9D C5
        assert!(run(&mut t, &[0xE1, 0x1D, 0x45, 0xE1, 0x9D, 0xC5]).is_empty());
        assert_eq!(run(&mut t, &[0x1E]), vec![0xC1]);
    }

    #[test]
    fn test_e1_with_other_byte_continues() {
        let mut t = Translator::new();
        assert_eq!(run(&mut t, &[0xE1, 0x1E]), vec![0xC1]);
    }

    #[test]
    fn test_truncated_sequences_abandoned() {
        let mut t = Translator::new();
        assert_eq!(run(&mut t, &[0xE0]), Vec::<u8>::new());
        assert_eq!(run(&mut t, &[0xE1]), Vec::<u8>::new());
        assert_eq!(run(&mut t, &[0xE1, 0x1D]), Vec::<u8>::new());
        assert_eq!(run(&mut t, &[0x1E]), vec![0xC1]);
    }

    #[test]
    fn test_modifier_break_idempotent() {
        let mut t = Translator::new();
        run(&mut t, &[CTRL_MAKE, LSHIFT_MAKE]);
        run(&mut t, &[LSHIFT_BREAK]);
        assert_eq!(t.modifiers(), Modifiers::CTRL);
        run(&mut t, &[RSHIFT_BREAK]);
        assert_eq!(t.modifiers(), Modifiers::CTRL);
        run(&mut t, &[CTRL_BREAK, CTRL_BREAK]);
        assert_eq!(t.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_blocklist_and_breaks() {
        let mut t = Translator::new();
        let blocked = [14u8, 15, 26, 27, 40, 41, 43];
        assert!(run(&mut t, &blocked).is_empty());
        let high: Vec<u8> = (58..=255u8)
            .filter(|c| ![PREFIX_E0, PREFIX_E1, CTRL_BREAK, LSHIFT_BREAK, RSHIFT_BREAK].contains(c))
            .collect();
        assert!(run(&mut t, &high).is_empty());
        assert!(run(&mut t, &[0x00]).is_empty());
        assert_eq!(t.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_every_output_has_high_bit() {
        for mods in 0..4u8 {
            let mods = Modifiers::from_bits_truncate(mods);
            for code in 0..SCAN_CODES as u8 {
                match lookup(mods, code) {
                    Some(b) => assert!(b & 0x80 != 0),
                    None => assert_eq!(APPLE_CODES[mods.bits() as usize][code as usize], NO_KEY),
                }
            }
            assert_eq!(lookup(mods, SCAN_CODES as u8), None);
        }
    }
}
