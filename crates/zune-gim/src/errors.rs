/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::block::BlockType;
use crate::pixels::GimPixelFormat;

/// GIM errors that can occur during decoding
///
/// Errors fall in two groups, format errors which mean the
/// byte stream cannot be trusted and recoverable errors which only
/// affect a single leaf, see [`is_recoverable`](Self::is_recoverable)
#[non_exhaustive]
pub enum GimDecoderErrors {
    /// The file/bytes do not start with `MIG.00.1PSP\0`
    InvalidMagicBytes,
    /// The first block of the file is not a ROOT block
    WrongRootType(BlockType),
    /// Fewer than 16 bytes remain for a block header at this offset
    TruncatedHeader(u64),
    /// A block declares a size smaller than its own header
    InvalidBlockSize { offset: u64, size: u32 },
    /// A sibling block points back at or before itself
    NonAdvancingSibling { offset: u64, next: u64 },
    /// A block offset or size escapes the block (or buffer) containing it
    OffsetOutOfBounds {
        offset: u64,
        start:  u64,
        end:    u64
    },
    /// A data sub-header offset of the block at `block` resolves
    /// to `offset`, before the start of the file
    DataOffsetOutOfBounds { block: u64, offset: i64 },
    /// A read of `len` bytes at `offset` falls outside of `[start, end)`
    FieldOutOfBounds {
        offset: u64,
        len:    usize,
        start:  u64,
        end:    u64
    },
    /// Containers are nested deeper than the decoder allows
    TooDeep(usize),
    /// Pixel format code is not one the decoder can handle
    UnsupportedPixelFormat(u16),
    /// A palette leaf carries an indexed pixel format
    IndexedPaletteSource(GimPixelFormat),
    /// Too large dimensions for a given width or
    /// height
    TooLargeDimensions(&'static str, usize, usize),
    /// Width or height is zero
    ZeroDimensions(usize, usize),
    /// A calculation overflowed
    OverFlowOccurred,
    /// Generic message
    GenericStatic(&'static str),
    /// Generic allocated message
    Generic(String),
    IoErrors(ZByteIoError)
}

impl GimDecoderErrors {
    /// Whether this error only invalidates the artifact being produced
    /// and processing of sibling blocks may continue
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPixelFormat(_)
                | Self::IndexedPaletteSource(_)
                | Self::DataOffsetOutOfBounds { .. }
                | Self::FieldOutOfBounds { .. }
                | Self::TooLargeDimensions(..)
                | Self::ZeroDimensions(..)
                | Self::OverFlowOccurred
        )
    }
}

impl Debug for GimDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, file does not start with MIG.00.1PSP")
            }
            Self::WrongRootType(kind) => {
                writeln!(f, "First block is {kind:?}, expected the ROOT block")
            }
            Self::TruncatedHeader(offset) => {
                writeln!(f, "Truncated block header at {offset:#x}")
            }
            Self::InvalidBlockSize { offset, size } => {
                writeln!(
                    f,
                    "Block at {offset:#x} declares size {size:#x}, smaller than its 16 byte header"
                )
            }
            Self::NonAdvancingSibling { offset, next } => {
                writeln!(
                    f,
                    "Block at {offset:#x} points to next block at {next:#x} which does not advance"
                )
            }
            Self::OffsetOutOfBounds { offset, start, end } => {
                writeln!(
                    f,
                    "Offset {offset:#x} is outside of the enclosing range [{start:#x}, {end:#x})"
                )
            }
            Self::DataOffsetOutOfBounds { block, offset } => {
                writeln!(
                    f,
                    "Data offset of block at {block:#x} resolves to {offset}, before the start of the file"
                )
            }
            Self::FieldOutOfBounds {
                offset,
                len,
                start,
                end
            } => {
                writeln!(
                    f,
                    "Reading {len} bytes at {offset:#x} exceeds block bounds [{start:#x}, {end:#x})"
                )
            }
            Self::TooDeep(depth) => {
                writeln!(f, "Blocks nested too deep, depth {depth} exceeds the limit")
            }
            Self::UnsupportedPixelFormat(code) => {
                writeln!(f, "Unsupported pixel format {code:#x}")
            }
            Self::IndexedPaletteSource(format) => {
                writeln!(
                    f,
                    "Palette block uses indexed pixel format {format:?}, indexed palette source invalid"
                )
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            Self::ZeroDimensions(width, height) => {
                writeln!(f, "Image dimensions {width}x{height} contain a zero, invalid image")
            }
            Self::OverFlowOccurred => {
                writeln!(f, "Overflow occurred")
            }
            Self::GenericStatic(header) => {
                writeln!(f, "{}", header)
            }
            Self::Generic(message) => {
                writeln!(f, "{}", message)
            }
            Self::IoErrors(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl Display for GimDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GimDecoderErrors {}

impl From<ZByteIoError> for GimDecoderErrors {
    fn from(value: ZByteIoError) -> Self {
        GimDecoderErrors::IoErrors(value)
    }
}

impl From<&'static str> for GimDecoderErrors {
    fn from(r: &'static str) -> Self {
        Self::GenericStatic(r)
    }
}
