/*
 * Character ROM Transforms
 *
 * The clone board's character generator has its data lines wired in a
 * scrambled order. fix_bits() rearranges a stock ROM image to match it,
 * restore_bits() undoes that, and the glyph helpers draw ROM bytes as
 * text so a dump can be checked by eye.
 */

#![cfg_attr(not(test), no_std)]

use core::fmt;

/* Destination bit for each source bit, indexed by source bit */
const FIX_MAP: [u8; 8] = [2, 7, 6, 5, 4, 3, 1, 0];

/* Bit tested for each glyph column, left to right */
pub const GLYPH_COLUMNS: [u8; 7] = [0x02, 0x08, 0x10, 0x20, 0x40, 0x80, 0x04];

/* Glyph rows per character cell */
pub const CELL_ROWS: usize = 8;

pub const PIXEL_ON: u8 = b'#';
pub const PIXEL_OFF: u8 = b' ';

/*
 * fix_bits - Permute a ROM byte to the clone board's wiring
 * @byte: byte from a stock ROM image
 */
pub const fn fix_bits(byte: u8) -> u8 {
	let mut fixed = 0;
	let mut bit = 0;
	while bit < 8 {
		if byte & (1 << bit) != 0 {
			fixed |= 1 << FIX_MAP[bit];
		}
		bit += 1;
	}
	fixed
}

/*
 * restore_bits - Inverse of fix_bits()
 * @byte: byte from a fixed ROM image
 */
pub const fn restore_bits(byte: u8) -> u8 {
	let mut restored = 0;
	let mut bit = 0;
	while bit < 8 {
		if byte & (1 << FIX_MAP[bit]) != 0 {
			restored |= 1 << bit;
		}
		bit += 1;
	}
	restored
}

/* Apply fix_bits() to a whole image in place */
pub fn fix_image(image: &mut [u8]) {
	for b in image.iter_mut() {
		*b = fix_bits(*b);
	}
}

/* Apply restore_bits() to a whole image in place */
pub fn restore_image(image: &mut [u8]) {
	for b in image.iter_mut() {
		*b = restore_bits(*b);
	}
}

/*
 * glyph_row - Draw one ROM byte as seven pixel columns
 * @byte: one row of a character cell
 */
pub const fn glyph_row(byte: u8) -> [u8; 7] {
	let mut row = [PIXEL_OFF; 7];
	let mut col = 0;
	while col < GLYPH_COLUMNS.len() {
		if byte & GLYPH_COLUMNS[col] != 0 {
			row[col] = PIXEL_ON;
		}
		col += 1;
	}
	row
}

/*
 * render_glyphs - Draw a ROM dump as text
 * @bytes: ROM bytes, one glyph row each
 * @out: destination
 *
 * Every row ends in a newline; each complete character cell is followed
 * by one blank line pair.
 */
pub fn render_glyphs<W: fmt::Write + ?Sized>(bytes: &[u8], out: &mut W) -> fmt::Result {
	for (i, &byte) in bytes.iter().enumerate() {
		for pixel in glyph_row(byte) {
			out.write_char(pixel as char)?;
		}
		out.write_char('\n')?;
		if (i + 1) % CELL_ROWS == 0 {
			out.write_str("\n\n")?;
		}
	}
	Ok(())
}
