/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use log::trace;
use zune_core::bytestream::ZByteReaderTrait;

use crate::block::BlockRecord;
use crate::cursor::BlockCursor;
use crate::errors::GimDecoderErrors;
use crate::pixels::{decode_color, Color, GimPixelFormat};
use crate::subheader::DataSubHeader;

/// Colour table decoded from a PALETTE block
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    format: GimPixelFormat,
    colors: Vec<Color>
}

impl Palette {
    pub fn new(format: GimPixelFormat, colors: Vec<Color>) -> Palette {
        Palette { format, colors }
    }
    /// Pixel format the entries were stored in
    pub const fn format(&self) -> GimPixelFormat {
        self.format
    }
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
    pub fn len(&self) -> usize {
        self.colors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Decode the palette stored in `leaf`, one entry per unit of width
pub(crate) fn decode_palette<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, leaf: &BlockRecord
) -> Result<Palette, GimDecoderErrors> {
    let header = DataSubHeader::read(cursor, leaf)?;
    let format = header.format;

    if format.is_indexed() {
        return Err(GimDecoderErrors::IndexedPaletteSource(format));
    }
    let stride = format
        .color_stride()
        .ok_or(GimDecoderErrors::UnsupportedPixelFormat(format.to_u16()))?;

    let entries = usize::from(header.width);
    let size = entries
        .checked_mul(stride)
        .ok_or(GimDecoderErrors::OverFlowOccurred)?;

    let raw = cursor.read_vec_at(header.pixels_start, size, leaf.payload_window())?;

    let colors = raw
        .chunks_exact(stride)
        .map(|entry| decode_color(format, entry))
        .collect::<Result<Vec<Color>, GimDecoderErrors>>()?;

    trace!("Palette: {} entries in {:?}", colors.len(), format);

    Ok(Palette { format, colors })
}
