/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Rebuilding raster images from IMAGE blocks
//!
//! Rows are read one after another starting at the resolved pixel data
//! start. After every row the decoder skips `row_bytes % pitch` bytes
//! (zero when the pitch is zero) before reading the next one.
//!
//! Colour formats decode straight to RGBA8888, indexed formats keep their
//! indices next to a colour table with room for every possible index.

use alloc::vec;
use alloc::vec::Vec;

use log::{trace, warn};
use zune_core::bytestream::ZByteReaderTrait;
use zune_core::options::DecoderOptions;

use crate::block::BlockRecord;
use crate::cursor::BlockCursor;
use crate::errors::GimDecoderErrors;
use crate::palette::Palette;
use crate::pixels::{decode_color_row, expand_index_row, Color, GimPixelFormat};
use crate::subheader::DataSubHeader;

/// Pixels of a decoded image
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RasterPixels {
    /// RGBA8888 rows, `width * 4` bytes each
    TrueColor(Vec<u8>),
    /// One index byte per pixel and a colour table of `2^bits` entries
    Indexed {
        bits:    u8,
        indices: Vec<u8>,
        palette: Vec<Color>
    }
}

/// An image decoded from an IMAGE block
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RasterImage {
    width:            usize,
    height:           usize,
    format:           GimPixelFormat,
    pixels:           RasterPixels,
    fallback_palette: bool
}

impl RasterImage {
    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    /// Pixel format of the source data
    pub const fn source_format(&self) -> GimPixelFormat {
        self.format
    }
    pub const fn pixels(&self) -> &RasterPixels {
        &self.pixels
    }
    /// Whether this is an indexed image that had no palette to go with it,
    /// its colours then come from the grey ramp of [`fallback_palette`]
    pub const fn used_fallback_palette(&self) -> bool {
        self.fallback_palette
    }

    /// Flatten the image to RGBA8888, resolving indices through the
    /// colour table
    pub fn to_rgba8(&self) -> Vec<u8> {
        match &self.pixels {
            RasterPixels::TrueColor(rgba) => rgba.clone(),
            RasterPixels::Indexed {
                indices, palette, ..
            } => {
                let mut out = Vec::with_capacity(indices.len() * 4);

                for index in indices {
                    let color = palette.get(usize::from(*index)).copied().unwrap_or_default();
                    out.extend_from_slice(&color.to_rgba());
                }
                out
            }
        }
    }
}

/// The colour table used for indices the palette does not define
///
/// A grey ramp from black to white over `capacity` opaque entries.
pub fn fallback_palette(capacity: usize) -> Vec<Color> {
    let last = capacity.saturating_sub(1).max(1);

    (0..capacity)
        .map(|i| {
            let grey = (i * 255 / last).min(255) as u8;
            Color::new(grey, grey, grey, 255)
        })
        .collect()
}

/// Build a colour table with room for every `bits` wide index
///
/// Palette entries past the capacity are dropped, missing ones
/// come from the fallback table.
fn color_table(bits: u8, palette: Option<&Palette>) -> Vec<Color> {
    let capacity = 1_usize << bits;
    let mut table = fallback_palette(capacity);

    if let Some(palette) = palette {
        if palette.len() > capacity {
            trace!(
                "Palette has {} entries, keeping the first {capacity}",
                palette.len()
            );
        }
        for (slot, color) in table.iter_mut().zip(palette.colors()) {
            *slot = *color;
        }
    }
    table
}

/// Decode the image stored in `leaf`
///
/// `palette` resolves indexed formats, when absent the fallback table is
/// used and the result reports it through
/// [`RasterImage::used_fallback_palette`].
pub(crate) fn decode_image<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, leaf: &BlockRecord, palette: Option<&Palette>,
    options: &DecoderOptions
) -> Result<RasterImage, GimDecoderErrors> {
    let header = DataSubHeader::read(cursor, leaf)?;
    let format = header.format;

    if !format.is_supported() {
        return Err(GimDecoderErrors::UnsupportedPixelFormat(format.to_u16()));
    }

    let width = usize::from(header.width);
    let height = usize::from(header.height);

    if width == 0 || height == 0 {
        return Err(GimDecoderErrors::ZeroDimensions(width, height));
    }
    if width > options.max_width() {
        return Err(GimDecoderErrors::TooLargeDimensions(
            "width",
            options.max_width(),
            width
        ));
    }
    if height > options.max_height() {
        return Err(GimDecoderErrors::TooLargeDimensions(
            "height",
            options.max_height(),
            height
        ));
    }

    let row_bytes = format
        .row_bytes(width)
        .ok_or(GimDecoderErrors::OverFlowOccurred)?;

    let pitch = usize::from(header.pitch);
    let padding = if pitch == 0 { 0 } else { row_bytes % pitch };
    let row_step = (row_bytes + padding) as u64;

    // the last row needs no padding after it
    let source_size = (row_step * (height as u64 - 1))
        .checked_add(row_bytes as u64)
        .and_then(|size| usize::try_from(size).ok())
        .ok_or(GimDecoderErrors::OverFlowOccurred)?;

    let window = leaf.payload_window();
    // fail before allocating anything sized by the header
    window.check(header.pixels_start, source_size)?;

    trace!(
        "Image: {width}x{height} {format:?}, {row_bytes} bytes per row, pitch {pitch}, skip {padding}"
    );

    let out_per_pixel = if format.is_indexed() { 1 } else { 4 };
    let out_stride = width * out_per_pixel;
    let out_size = out_stride
        .checked_mul(height)
        .ok_or(GimDecoderErrors::OverFlowOccurred)?;

    let mut out = vec![0_u8; out_size];
    let mut row = vec![0_u8; row_bytes];
    let mut position = header.pixels_start;

    for out_row in out.chunks_exact_mut(out_stride) {
        cursor.read_at(position, &mut row, window)?;

        if format.is_indexed() {
            expand_index_row(format, &row, out_row)?;
        } else {
            decode_color_row(format, &row, out_row)?;
        }
        position += row_step;
    }

    let (pixels, fallback) = match format.index_bits() {
        Some(bits) => {
            if palette.is_none() {
                warn!("Indexed image at {:#x} has no palette", leaf.start_offset());
            }
            let pixels = RasterPixels::Indexed {
                bits,
                indices: out,
                palette: color_table(bits, palette)
            };
            (pixels, palette.is_none())
        }
        None => (RasterPixels::TrueColor(out), false)
    };

    Ok(RasterImage {
        width,
        height,
        format,
        pixels,
        fallback_palette: fallback
    })
}
