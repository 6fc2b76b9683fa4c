/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel formats stored in IMAGE and PALETTE blocks

use crate::errors::GimDecoderErrors;

/// The pixel format code of a data sub-header
///
/// Codes 0 to 7 are the closed set GIM defines, anything else
/// can only be represented by [`GimPixelFormat::Unsupported`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GimPixelFormat {
    Rgb565,
    Rgba5551,
    Rgba4444,
    Rgba8888,
    Index4,
    Index8,
    Index16,
    Index32,
    Unsupported(u16)
}

impl GimPixelFormat {
    pub const fn from_u16(code: u16) -> GimPixelFormat {
        match code {
            0 => GimPixelFormat::Rgb565,
            1 => GimPixelFormat::Rgba5551,
            2 => GimPixelFormat::Rgba4444,
            3 => GimPixelFormat::Rgba8888,
            4 => GimPixelFormat::Index4,
            5 => GimPixelFormat::Index8,
            6 => GimPixelFormat::Index16,
            7 => GimPixelFormat::Index32,
            _ => GimPixelFormat::Unsupported(code)
        }
    }

    pub const fn to_u16(self) -> u16 {
        match self {
            GimPixelFormat::Rgb565 => 0,
            GimPixelFormat::Rgba5551 => 1,
            GimPixelFormat::Rgba4444 => 2,
            GimPixelFormat::Rgba8888 => 3,
            GimPixelFormat::Index4 => 4,
            GimPixelFormat::Index8 => 5,
            GimPixelFormat::Index16 => 6,
            GimPixelFormat::Index32 => 7,
            GimPixelFormat::Unsupported(code) => code
        }
    }

    /// Formats storing colours directly, the only ones a palette may use
    pub const fn is_color(self) -> bool {
        matches!(
            self,
            GimPixelFormat::Rgb565
                | GimPixelFormat::Rgba5551
                | GimPixelFormat::Rgba4444
                | GimPixelFormat::Rgba8888
        )
    }

    pub const fn is_indexed(self) -> bool {
        matches!(
            self,
            GimPixelFormat::Index4
                | GimPixelFormat::Index8
                | GimPixelFormat::Index16
                | GimPixelFormat::Index32
        )
    }

    /// Whether pixels of this format can be decoded
    pub const fn is_supported(self) -> bool {
        !matches!(
            self,
            GimPixelFormat::Index16 | GimPixelFormat::Index32 | GimPixelFormat::Unsupported(_)
        )
    }

    /// Bytes a single colour entry occupies, `None` for indexed
    /// and unsupported formats
    pub const fn color_stride(self) -> Option<usize> {
        match self {
            GimPixelFormat::Rgb565 | GimPixelFormat::Rgba5551 | GimPixelFormat::Rgba4444 => {
                Some(2)
            }
            GimPixelFormat::Rgba8888 => Some(4),
            _ => None
        }
    }

    /// Bits of an index, `None` for colour and unsupported formats
    pub const fn index_bits(self) -> Option<u8> {
        match self {
            GimPixelFormat::Index4 => Some(4),
            GimPixelFormat::Index8 => Some(8),
            _ => None
        }
    }

    /// Bytes a row of `width` pixels occupies in the source data
    ///
    /// Two 4 bit pixels share a byte and the byte count is rounded down,
    /// an odd trailing pixel has no storage of its own. Returns `None` for
    /// formats that cannot be decoded or if the computation overflows.
    pub fn row_bytes(self, width: usize) -> Option<usize> {
        match self {
            GimPixelFormat::Rgb565 | GimPixelFormat::Rgba5551 | GimPixelFormat::Rgba4444 => {
                width.checked_mul(2)
            }
            GimPixelFormat::Rgba8888 => width.checked_mul(4),
            GimPixelFormat::Index4 => Some(width / 2),
            GimPixelFormat::Index8 => Some(width),
            GimPixelFormat::Index16 | GimPixelFormat::Index32 | GimPixelFormat::Unsupported(_) => {
                None
            }
        }
    }
}

/// A decoded colour, always 8 bits per channel
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Color {
    pub red:   u8,
    pub green: u8,
    pub blue:  u8,
    pub alpha: u8
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
        Color {
            red,
            green,
            blue,
            alpha
        }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Scale a five bit channel to eight bits, truncating
#[inline(always)]
const fn scale5(value: u16) -> u8 {
    ((value * 255) / 31) as u8
}

/// Scale a six bit channel to eight bits, truncating
#[inline(always)]
const fn scale6(value: u16) -> u8 {
    ((value * 255) / 63) as u8
}

/// Blue in the low five bits, red in the high five
fn rgb565(pixel: [u8; 2]) -> Color {
    let v = u16::from_le_bytes(pixel);

    Color::new(
        scale5((v >> 11) & 0x1F),
        scale6((v >> 5) & 0x3F),
        scale5(v & 0x1F),
        255
    )
}

fn rgba5551(pixel: [u8; 2]) -> Color {
    let v = u16::from_le_bytes(pixel);
    let alpha = if v >> 15 != 0 { 255 } else { 0 };

    Color::new(
        scale5((v >> 10) & 0x1F),
        scale5((v >> 5) & 0x1F),
        scale5(v & 0x1F),
        alpha
    )
}

/// Nibbles are doubled, not rescaled, so channels end up in `0..=30`
fn rgba4444(pixel: [u8; 2]) -> Color {
    let [low, high] = pixel;

    Color::new(
        (high & 0x0F) * 2,
        (low >> 4) * 2,
        (low & 0x0F) * 2,
        (high >> 4) * 2
    )
}

/// The four bytes are reversed and read as a little endian ARGB word,
/// which leaves alpha in the first byte
fn rgba8888(pixel: [u8; 4]) -> Color {
    let mut reversed = pixel;
    reversed.reverse();

    let v = u32::from_le_bytes(reversed);

    Color::new((v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8)
}

/// Decode the colour stored at the start of `bytes`
pub fn decode_color(format: GimPixelFormat, bytes: &[u8]) -> Result<Color, GimDecoderErrors> {
    let too_short = GimDecoderErrors::GenericStatic("Not enough bytes for a colour entry");

    match format {
        GimPixelFormat::Rgb565 | GimPixelFormat::Rgba5551 | GimPixelFormat::Rgba4444 => {
            let pixel: [u8; 2] = bytes
                .get(..2)
                .and_then(|b| b.try_into().ok())
                .ok_or(too_short)?;

            Ok(match format {
                GimPixelFormat::Rgb565 => rgb565(pixel),
                GimPixelFormat::Rgba5551 => rgba5551(pixel),
                _ => rgba4444(pixel)
            })
        }
        GimPixelFormat::Rgba8888 => {
            let pixel: [u8; 4] = bytes
                .get(..4)
                .and_then(|b| b.try_into().ok())
                .ok_or(too_short)?;

            Ok(rgba8888(pixel))
        }
        GimPixelFormat::Index4
        | GimPixelFormat::Index8
        | GimPixelFormat::Index16
        | GimPixelFormat::Index32
        | GimPixelFormat::Unsupported(_) => {
            Err(GimDecoderErrors::UnsupportedPixelFormat(format.to_u16()))
        }
    }
}

/// Decode a row of colour pixels into RGBA8888
///
/// `out` holds four bytes per pixel, decoding stops when either
/// `input` or `out` runs out.
///
/// RGBA4444 is the one format whose output is exactly twice its input,
/// every source byte expands into two output bytes.
pub(crate) fn decode_color_row(
    format: GimPixelFormat, input: &[u8], out: &mut [u8]
) -> Result<(), GimDecoderErrors> {
    let stride = format
        .color_stride()
        .ok_or(GimDecoderErrors::UnsupportedPixelFormat(format.to_u16()))?;

    for (pixel, rgba) in input.chunks_exact(stride).zip(out.chunks_exact_mut(4)) {
        rgba.copy_from_slice(&decode_color(format, pixel)?.to_rgba());
    }
    Ok(())
}

/// Split packed indices into one byte per pixel
///
/// 4 bit indices are stored two to a byte, low nibble first.
/// `out.len()` is the number of pixels in the row.
pub(crate) fn expand_index_row(
    format: GimPixelFormat, input: &[u8], out: &mut [u8]
) -> Result<(), GimDecoderErrors> {
    match format {
        GimPixelFormat::Index8 => {
            for (index, value) in out.iter_mut().zip(input) {
                *index = *value;
            }
        }
        GimPixelFormat::Index4 => {
            let pairs = out.len() / 2;
            let mut out_iter = out.chunks_exact_mut(2);

            for (pair, value) in (&mut out_iter).zip(input) {
                pair[0] = value & 0x0F;
                pair[1] = value >> 4;
            }
            // odd width, the last pixel is index 0 unless a byte is left for it
            if let [last] = out_iter.into_remainder() {
                *last = input.get(pairs).map_or(0, |value| value & 0x0F);
            }
        }
        _ => return Err(GimDecoderErrors::UnsupportedPixelFormat(format.to_u16()))
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_color, decode_color_row, expand_index_row, Color, GimPixelFormat};
    use crate::errors::GimDecoderErrors;

    #[test]
    fn format_codes_are_a_closed_set() {
        for code in 0..8 {
            let format = GimPixelFormat::from_u16(code);
            assert!(!matches!(format, GimPixelFormat::Unsupported(_)));
            assert_eq!(format.to_u16(), code);
        }
        assert_eq!(GimPixelFormat::from_u16(8), GimPixelFormat::Unsupported(8));
        assert_eq!(GimPixelFormat::from_u16(0xFFFF).to_u16(), 0xFFFF);
    }

    #[test]
    fn row_bytes_per_format() {
        assert_eq!(GimPixelFormat::Rgb565.row_bytes(3), Some(6));
        assert_eq!(GimPixelFormat::Rgba8888.row_bytes(3), Some(12));
        assert_eq!(GimPixelFormat::Index4.row_bytes(4), Some(2));
        assert_eq!(GimPixelFormat::Index4.row_bytes(5), Some(2));
        assert_eq!(GimPixelFormat::Index4.row_bytes(1), Some(0));
        assert_eq!(GimPixelFormat::Index8.row_bytes(5), Some(5));
        assert_eq!(GimPixelFormat::Index16.row_bytes(5), None);
        assert_eq!(GimPixelFormat::Unsupported(9).row_bytes(5), None);
    }

    #[test]
    fn rgb565_extremes() {
        let black = decode_color(GimPixelFormat::Rgb565, &[0x00, 0x00]).unwrap();
        assert_eq!(black, Color::new(0, 0, 0, 255));

        let white = decode_color(GimPixelFormat::Rgb565, &[0xFF, 0xFF]).unwrap();
        assert_eq!(white, Color::new(255, 255, 255, 255));
    }

    #[test]
    fn rgb565_truncates() {
        // blue = 1, green = 1, red = 1
        let v: u16 = (1 << 11) | (1 << 5) | 1;
        let color = decode_color(GimPixelFormat::Rgb565, &v.to_le_bytes()).unwrap();
        // 255 / 31 = 8.22, 255 / 63 = 4.04
        assert_eq!(color, Color::new(8, 4, 8, 255));
    }

    #[test]
    fn rgba5551_alpha_bit() {
        let opaque_red: u16 = (1 << 15) | (31 << 10);
        let color = decode_color(GimPixelFormat::Rgba5551, &opaque_red.to_le_bytes()).unwrap();
        assert_eq!(color, Color::new(255, 0, 0, 255));

        let clear_blue: u16 = 31;
        let color = decode_color(GimPixelFormat::Rgba5551, &clear_blue.to_le_bytes()).unwrap();
        assert_eq!(color, Color::new(0, 0, 255, 0));
    }

    #[test]
    fn rgba4444_doubles_nibbles() {
        let color = decode_color(GimPixelFormat::Rgba4444, &[0xFF, 0xFF]).unwrap();
        assert_eq!(color, Color::new(30, 30, 30, 30));

        // blue 1, green 2, red 3, alpha 4
        let color = decode_color(GimPixelFormat::Rgba4444, &[0x21, 0x43]).unwrap();
        assert_eq!(color, Color::new(6, 4, 2, 8));
    }

    #[test]
    fn rgba8888_reverses_bytes() {
        let color = decode_color(GimPixelFormat::Rgba8888, &[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(color, Color::new(0x22, 0x33, 0x44, 0x11));
    }

    #[test]
    fn indexed_and_unknown_formats_have_no_colour() {
        for format in [
            GimPixelFormat::Index4,
            GimPixelFormat::Index8,
            GimPixelFormat::Index16,
            GimPixelFormat::Index32,
            GimPixelFormat::Unsupported(42)
        ] {
            assert!(matches!(
                decode_color(format, &[0; 4]),
                Err(GimDecoderErrors::UnsupportedPixelFormat(_))
            ));
        }
    }

    #[test]
    fn rgba4444_row_doubles_in_size() {
        let input = [0xFF, 0xFF, 0x00, 0x00];
        let mut out = [0xAA; 8];
        decode_color_row(GimPixelFormat::Rgba4444, &input, &mut out).unwrap();
        assert_eq!(out, [30, 30, 30, 30, 0, 0, 0, 0]);
    }

    #[test]
    fn index4_low_nibble_first() {
        let mut out = [0; 3];
        expand_index_row(GimPixelFormat::Index4, &[0x10, 0x32], &mut out).unwrap();
        assert_eq!(out, [0, 1, 2]);

        // a row of width 3 only stores one byte, the last pixel is index 0
        let mut out = [9; 3];
        expand_index_row(GimPixelFormat::Index4, &[0x21], &mut out).unwrap();
        assert_eq!(out, [1, 2, 0]);

        let mut out = [0; 4];
        expand_index_row(GimPixelFormat::Index4, &[0x10, 0x32], &mut out).unwrap();
        assert_eq!(out, [0, 1, 2, 3]);
    }
}
