/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::ZByteReaderTrait;

use crate::block::BlockRecord;
use crate::cursor::BlockCursor;
use crate::errors::GimDecoderErrors;
use crate::pixels::GimPixelFormat;

/// Bytes of the data sub-header the decoder reads fields from
const SUB_HEADER_FIELDS_SIZE: usize = 0x30;

/// The header at the start of every IMAGE and PALETTE payload
///
/// Pixel data offsets are stored relative to the payload start, they are
/// resolved to absolute stream positions when the header is read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DataSubHeader {
    /// Declared length of the sub-header, itself included
    pub header_len:   u16,
    pub format:       GimPixelFormat,
    pub width:        u16,
    pub height:       u16,
    /// Bytes per row in the source data as declared by the file
    pub pitch:        u16,
    /// Absolute position of the first pixel byte
    pub pixels_start: u64,
    /// Absolute position one past the last pixel byte
    pub pixels_end:   u64,
    pub plane_mask:   i32,
    pub level_type:   i16,
    pub mip_count:    i16,
    pub frame_type:   i16,
    pub frame_count:  i16
}

impl DataSubHeader {
    /// Read the sub-header at the payload of `leaf`
    ///
    /// Every field is checked to lie inside both the declared sub-header
    /// length and the leaf.
    pub(crate) fn read<T: ZByteReaderTrait>(
        cursor: &mut BlockCursor<T>, leaf: &BlockRecord
    ) -> Result<DataSubHeader, GimDecoderErrors> {
        let window = leaf.payload_window();
        let base = leaf.payload_offset();

        let header_len = u16::from_le_bytes(cursor.read_fixed_at::<2>(base, window)?);

        if usize::from(header_len) < SUB_HEADER_FIELDS_SIZE {
            return Err(GimDecoderErrors::FieldOutOfBounds {
                offset: base + u64::from(header_len),
                len:    SUB_HEADER_FIELDS_SIZE - usize::from(header_len),
                start:  base,
                end:    base + u64::from(header_len)
            });
        }
        // the declared length must fit the leaf even if we only need a part of it
        window.check(base, usize::from(header_len))?;

        let fields = cursor.read_fixed_at::<SUB_HEADER_FIELDS_SIZE>(base, window)?;

        let u16_at = |pos: usize| u16::from_le_bytes([fields[pos], fields[pos + 1]]);
        let i16_at = |pos: usize| i16::from_le_bytes([fields[pos], fields[pos + 1]]);
        let i32_at = |pos: usize| {
            i32::from_le_bytes([fields[pos], fields[pos + 1], fields[pos + 2], fields[pos + 3]])
        };

        let resolve = |field: i32| -> Result<u64, GimDecoderErrors> {
            // offsets count from the end of the sub-header once its length is removed
            let after_header = base + u64::from(header_len);
            let relative = i64::from(field) - i64::from(header_len);

            let absolute = i64::try_from(after_header)
                .unwrap_or(i64::MAX)
                .saturating_add(relative);

            u64::try_from(absolute).map_err(|_| GimDecoderErrors::DataOffsetOutOfBounds {
                block:  leaf.start_offset(),
                offset: absolute
            })
        };

        Ok(DataSubHeader {
            header_len,
            format: GimPixelFormat::from_u16(u16_at(0x04)),
            width: u16_at(0x08),
            height: u16_at(0x0A),
            pitch: u16_at(0x0E),
            pixels_start: resolve(i32_at(0x1C))?,
            pixels_end: resolve(i32_at(0x20))?,
            plane_mask: i32_at(0x24),
            level_type: i16_at(0x28),
            mip_count: i16_at(0x2A),
            frame_type: i16_at(0x2C),
            frame_count: i16_at(0x2E)
        })
    }
}
