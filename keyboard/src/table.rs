/*
 * AT scan code set 1 to Apple II key codes
 *
 * One row per modifier combination, indexed by Modifiers::bits(): normal,
 * ctrl, shift, shift + ctrl. Columns are make codes 0..57, with 55 and 56
 * reused for the E0-prefixed left/right arrows. Every Apple code has bit 7
 * set; NO_KEY marks codes with no Apple equivalent.
 */

pub const NO_KEY: u8 = 0x00;

pub const SCAN_CODES: usize = 58;

/* Slot the E0 4B (left arrow) sequence is looked up under */
pub const LEFT_ARROW_SLOT: u8 = 55;
/* Slot the E0 4D (right arrow) sequence is looked up under */
pub const RIGHT_ARROW_SLOT: u8 = 56;

const NA: u8 = NO_KEY;

pub static APPLE_CODES: [[u8; SCAN_CODES]; 4] = [
    //Normal
    [
        NA, // 0x00
        0x9b, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, // 0x01-0x0A esc 1-9
        0xb0, 0xad, 0xba, NA, NA, 0xd1, 0xd7, 0xc5, 0xd2, 0xd4, // 0x0B-0x14 0 - : bs tab q w e r t
        0xd9, 0xd5, 0xc9, 0xcf, 0xd0, NA, NA, 0x8d, NA, 0xc1, // 0x15-0x1E y u i o p [ ] ret ctrl a
        0xd3, 0xc4, 0xc6, 0xc7, 0xc8, 0xca, 0xcb, 0xcc, 0xbb, NA, // 0x1F-0x28 s d f g h j k l ; '
        NA, NA, NA, 0xda, 0xd8, 0xc3, 0xd6, 0xc2, 0xce, 0xcd, // 0x29-0x32 ` lshift \ z x c v b n m
        0xac, 0xae, 0xaf, NA, 0x88, 0x95, 0xa0, // 0x33-0x39 , . / rshift left right space
    ],
    //Ctrl
    [
        NA, //
        0x9b, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, //
        0xb0, 0xad, 0xba, NA, NA, 0x91, 0x97, 0x85, 0x92, 0x94, //
        0x99, 0x95, 0x89, 0x8f, 0x90, NA, NA, 0x8d, NA, 0x81, //
        0x93, 0x84, 0x86, 0x87, 0x88, 0x8a, 0x8b, 0x8c, 0xbb, NA, //
        NA, NA, NA, 0x9a, 0x98, 0x83, 0x96, 0x82, 0x8e, 0x8d, //
        0xac, 0xae, 0xaf, NA, 0x88, 0x95, 0xa0, //
    ],
    //Shift
    [
        NA, //
        0x9b, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, //
        0xb0, 0xbd, 0xaa, NA, NA, 0xd1, 0xd7, 0xc5, 0xd2, 0xd4, //
        0xd9, 0xd5, 0xc9, 0xcf, 0xc0, NA, NA, 0x8d, NA, 0xc1, //
        0xd3, 0xc4, 0xc6, 0xc7, 0xc8, 0xca, 0xcb, 0xcc, 0xab, NA, //
        NA, NA, NA, 0xda, 0xd8, 0xc3, 0xd6, 0xc2, 0xde, 0xdd, //
        0xbc, 0xbe, 0xbf, NA, 0x88, 0x95, 0xa0, //
    ],
    //Shift + Ctrl
    [
        NA, //
        0x9b, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, //
        0xb0, 0xbd, 0xaa, NA, NA, 0x91, 0x97, 0x85, 0x92, 0x94, //
        0x99, 0x95, 0x89, 0x8f, 0x80, NA, NA, 0x8d, NA, 0x81, //
        0x93, 0x84, 0x86, 0x87, 0x88, 0x8a, 0x8b, 0x8c, 0xab, NA, //
        NA, NA, NA, 0x9a, 0x98, 0x83, 0x96, 0x82, 0x9e, 0x94, //
        0xbc, 0xbe, 0xbf, NA, 0x88, 0x95, 0xa0, //
    ],
];
