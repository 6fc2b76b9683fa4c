/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A GIM container decoder and splitter
//!
//! GIM is the raster image container used by PSP and PS3 titles. A file is a
//! tree of blocks, PICTURE blocks hold IMAGE and PALETTE blocks which carry
//! the pixels.
//!
//! This crate reads the block tree, decodes images to RGBA or indexed
//! rasters and can re-pack every PICTURE into a standalone GIM file.
//!
//! # Features
//! - `no_std` with the `alloc` crate
//! - Every read is bounds checked against the block it belongs to
//! - Broken images are skipped, the rest of the file is still decoded
//!
//! # Supported formats
//! - RGB565, RGBA5551, RGBA4444 and RGBA8888
//! - 4 bit and 8 bit indexed images
//!
//! # Unsupported formats
//! - 16 bit and 32 bit indexed images
//! - Compressed (DXT) pixel data
//!
//! # Example
//! ```no_run
//! use zune_core::bytestream::{ZByteIoError, ZCursor};
//! use zune_gim::{GimDecoder, GimEvent, GimSink, GimSplitOptions, RasterImage};
//!
//! struct Count(usize);
//!
//! impl GimSink for Count {
//!     fn write_image(&mut self, _: usize, _: &RasterImage) -> Result<(), ZByteIoError> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//!     fn write_container(&mut self, _: usize, _: &[u8]) -> Result<(), ZByteIoError> {
//!         Ok(())
//!     }
//!     fn diagnostic(&mut self, event: GimEvent) {
//!         eprintln!("{event:?}");
//!     }
//! }
//!
//! let data = std::fs::read("a.gim").unwrap();
//! let mut decoder = GimDecoder::new(ZCursor::new(&data));
//! let mut sink = Count(0);
//! decoder.split(&mut sink, &GimSplitOptions::default(), 1).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;
extern crate core;

pub use zune_core;

pub use crate::block::{
    probe_gim, BlockRecord, BlockType, BLOCK_HEADER_SIZE, GIM_MAGIC, GIM_PLATFORM,
    GIM_SIGNATURE_SIZE, MAX_BLOCK_DEPTH
};
pub use crate::decoder::{GimDecoder, GimEvent, GimSink, GimSplitOptions};
pub use crate::errors::GimDecoderErrors;
pub use crate::palette::Palette;
pub use crate::pixels::{decode_color, Color, GimPixelFormat};
pub use crate::raster::{fallback_palette, RasterImage, RasterPixels};
pub use crate::subheader::DataSubHeader;

mod block;
mod cursor;
mod decoder;
mod errors;
mod export;
mod palette;
mod pixels;
mod raster;
mod subheader;
