/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{debug, trace, warn};
use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait};
use zune_core::options::DecoderOptions;

use crate::block::{parse_container, BlockRecord, BlockType};
use crate::cursor::BlockCursor;
use crate::errors::GimDecoderErrors;
use crate::export::export_picture;
use crate::palette::{decode_palette, Palette};
use crate::raster::{decode_image, RasterImage};
use crate::subheader::DataSubHeader;

/// Structured diagnostics reported while splitting a file
#[derive(Debug)]
#[non_exhaustive]
pub enum GimEvent {
    /// The input does not start with the GIM signature
    BadMagic,
    /// The first block has this type code instead of ROOT
    WrongRootType(u16),
    /// An IMAGE or PALETTE used a pixel format that cannot be decoded
    UnsupportedPixelFormat(u16),
    /// An indexed image had no PALETTE sibling, it was decoded with
    /// the fallback colour table
    MissingPalette,
    /// Strings carried by a FILEINFO block
    FileInfo(Vec<String>),
    /// The block at `block_offset` produced no artifact
    LeafSkipped {
        block_offset: u64,
        error:        GimDecoderErrors
    }
}

/// Receiver of everything [`GimDecoder::split`] produces
///
/// `index` is the artifact counter, shared between images and containers.
pub trait GimSink {
    fn write_image(&mut self, index: usize, image: &RasterImage) -> Result<(), ZByteIoError>;

    fn write_container(&mut self, index: usize, bytes: &[u8]) -> Result<(), ZByteIoError>;

    fn diagnostic(&mut self, event: GimEvent);
}

/// Which artifacts [`GimDecoder::split`] emits
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GimSplitOptions {
    /// Decode IMAGE blocks into raster images
    pub images:     bool,
    /// Re-pack PICTURE blocks into standalone containers
    pub containers: bool
}

impl Default for GimSplitOptions {
    fn default() -> Self {
        GimSplitOptions {
            images:     true,
            containers: true
        }
    }
}

/// A GIM decoder
///
/// The block tree is parsed once by [`decode_headers`](Self::decode_headers),
/// individual blocks of it can then be decoded, or the whole file split
/// into its images and pictures with [`split`](Self::split).
///
/// Block accessors borrow the decoder, clone the tree to decode leaves of it
///
/// ```no_run
/// use zune_core::bytestream::ZCursor;
/// use zune_gim::{BlockType, GimDecoder};
///
/// let data = std::fs::read("a.gim").unwrap();
/// let mut decoder = GimDecoder::new(ZCursor::new(&data));
/// decoder.decode_headers().unwrap();
///
/// let root = decoder.root().unwrap().clone();
/// for picture in root.children_of(BlockType::Picture) {
///     for image in picture.children_of(BlockType::Image) {
///         let raster = decoder.decode_image(image, None).unwrap();
///         println!("{}x{}", raster.width(), raster.height());
///     }
/// }
/// ```
pub struct GimDecoder<T: ZByteReaderTrait> {
    cursor:  BlockCursor<T>,
    options: DecoderOptions,
    root:    Option<BlockRecord>
}

impl<T: ZByteReaderTrait> GimDecoder<T> {
    /// Create a new decoder with default options
    pub fn new(data: T) -> GimDecoder<T> {
        GimDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with the given options
    ///
    /// Maximum width and height apply to every IMAGE block.
    pub fn new_with_options(data: T, options: DecoderOptions) -> GimDecoder<T> {
        GimDecoder {
            cursor: BlockCursor::new(data),
            options,
            root: None
        }
    }

    /// Parse the block tree
    ///
    /// Calling it again after a success does nothing
    pub fn decode_headers(&mut self) -> Result<(), GimDecoderErrors> {
        if self.root.is_some() {
            return Ok(());
        }
        let root = parse_container(&mut self.cursor)?;

        debug!("Root: {root}");
        debug!("Top level blocks: {}", root.children().len());

        self.root = Some(root);
        Ok(())
    }

    /// The ROOT block, or `None` if headers have not been decoded
    pub const fn root(&self) -> Option<&BlockRecord> {
        self.root.as_ref()
    }

    pub const fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Read the data sub-header of an IMAGE or PALETTE block
    pub fn sub_header(&mut self, leaf: &BlockRecord) -> Result<DataSubHeader, GimDecoderErrors> {
        DataSubHeader::read(&mut self.cursor, leaf)
    }

    /// Decode the colour table of a PALETTE block
    pub fn decode_palette(&mut self, leaf: &BlockRecord) -> Result<Palette, GimDecoderErrors> {
        if leaf.kind() != BlockType::Palette {
            return Err(GimDecoderErrors::GenericStatic("Block is not a PALETTE"));
        }
        decode_palette(&mut self.cursor, leaf)
    }

    /// Decode an IMAGE block, indexed formats resolve through `palette`
    /// or the fallback colour table when it is `None`
    pub fn decode_image(
        &mut self, leaf: &BlockRecord, palette: Option<&Palette>
    ) -> Result<RasterImage, GimDecoderErrors> {
        if leaf.kind() != BlockType::Image {
            return Err(GimDecoderErrors::GenericStatic("Block is not an IMAGE"));
        }
        decode_image(&mut self.cursor, leaf, palette, &self.options)
    }

    /// Re-pack a PICTURE block into a standalone GIM file
    pub fn export_picture(&mut self, picture: &BlockRecord) -> Result<Vec<u8>, GimDecoderErrors> {
        self.decode_headers()?;

        let root_flags = self.root.as_ref().map_or(0, |root| root.flags());
        export_picture(&mut self.cursor, picture, root_flags)
    }

    /// Decode the strings of a FILEINFO block
    ///
    /// The payload is split on NUL bytes, empty strings are dropped and
    /// invalid UTF-8 is replaced.
    pub fn file_info(&mut self, leaf: &BlockRecord) -> Result<Vec<String>, GimDecoderErrors> {
        file_info(&mut self.cursor, leaf)
    }

    /// Split the file into images and standalone pictures
    ///
    /// Each PICTURE among the root's children gives one image per IMAGE
    /// child, decoded with the first PALETTE child, followed by the
    /// re-packed picture. Artifacts are numbered from `first_index` and the
    /// next unused index is returned.
    ///
    /// Errors that are [recoverable](GimDecoderErrors::is_recoverable) are
    /// reported to the sink and the block is skipped, any other error or a
    /// failing sink stops the split.
    pub fn split<S: GimSink>(
        &mut self, sink: &mut S, options: &GimSplitOptions, first_index: usize
    ) -> Result<usize, GimDecoderErrors> {
        if let Err(err) = self.decode_headers() {
            match &err {
                GimDecoderErrors::InvalidMagicBytes => sink.diagnostic(GimEvent::BadMagic),
                GimDecoderErrors::WrongRootType(kind) => {
                    sink.diagnostic(GimEvent::WrongRootType(kind.to_u16()));
                }
                _ => ()
            }
            return Err(err);
        }

        let GimDecoder {
            cursor,
            options: decoder_options,
            root
        } = self;

        let root = root
            .as_ref()
            .ok_or(GimDecoderErrors::GenericStatic("Headers not decoded"))?;

        let mut splitter = Splitter {
            cursor,
            decoder_options,
            sink,
            options,
            root_flags: root.flags(),
            index: first_index
        };

        for block in root.children() {
            match block.kind() {
                BlockType::Picture => splitter.picture(block)?,
                BlockType::FileInfo => splitter.file_info(block)?,
                kind => trace!("Skipping {} block at {:#x}", kind.name(), block.start_offset())
            }
        }
        Ok(splitter.index)
    }
}

fn file_info<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, leaf: &BlockRecord
) -> Result<Vec<String>, GimDecoderErrors> {
    if leaf.kind() != BlockType::FileInfo {
        return Err(GimDecoderErrors::GenericStatic("Block is not a FILEINFO"));
    }
    let len = usize::try_from(leaf.end_offset() - leaf.payload_offset())
        .map_err(|_| GimDecoderErrors::OverFlowOccurred)?;
    let payload = cursor.read_vec_at(leaf.payload_offset(), len, leaf.payload_window())?;

    let text = String::from_utf8_lossy(&payload);

    Ok(text
        .split('\0')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect())
}

/// State threaded through a single [`GimDecoder::split`] call
struct Splitter<'a, T: ZByteReaderTrait, S: GimSink> {
    cursor:          &'a mut BlockCursor<T>,
    decoder_options: &'a DecoderOptions,
    sink:            &'a mut S,
    options:         &'a GimSplitOptions,
    root_flags:      u16,
    index:           usize
}

impl<'a, T: ZByteReaderTrait, S: GimSink> Splitter<'a, T, S> {
    fn skip(
        &mut self, block: &BlockRecord, error: GimDecoderErrors
    ) -> Result<(), GimDecoderErrors> {
        if !error.is_recoverable() {
            return Err(error);
        }
        warn!(
            "Skipping {} block at {:#x}: {:?}",
            block.kind().name(),
            block.start_offset(),
            error
        );
        if let GimDecoderErrors::UnsupportedPixelFormat(code) = &error {
            self.sink.diagnostic(GimEvent::UnsupportedPixelFormat(*code));
        }
        self.sink.diagnostic(GimEvent::LeafSkipped {
            block_offset: block.start_offset(),
            error
        });
        Ok(())
    }

    fn file_info(&mut self, block: &BlockRecord) -> Result<(), GimDecoderErrors> {
        match file_info(self.cursor, block) {
            Ok(strings) => {
                debug!("File info: {strings:?}");
                self.sink.diagnostic(GimEvent::FileInfo(strings));
                Ok(())
            }
            Err(err) => self.skip(block, err)
        }
    }

    fn picture(&mut self, picture: &BlockRecord) -> Result<(), GimDecoderErrors> {
        trace!("{picture}");

        if self.options.images {
            let palette = match picture.children_of(BlockType::Palette).next() {
                Some(leaf) => match decode_palette(self.cursor, leaf) {
                    Ok(palette) => Some(palette),
                    Err(err) => {
                        self.skip(leaf, err)?;
                        None
                    }
                },
                None => None
            };

            for leaf in picture.children_of(BlockType::Image) {
                match decode_image(self.cursor, leaf, palette.as_ref(), self.decoder_options) {
                    Ok(image) => {
                        if image.used_fallback_palette() {
                            self.sink.diagnostic(GimEvent::MissingPalette);
                        }
                        self.sink.write_image(self.index, &image)?;
                        debug!(
                            "Image {}: {}x{} {:?}",
                            self.index,
                            image.width(),
                            image.height(),
                            image.source_format()
                        );
                        self.index += 1;
                    }
                    Err(err) => self.skip(leaf, err)?
                }
            }
        }

        for leaf in picture.children_of(BlockType::FileInfo) {
            self.file_info(leaf)?;
        }

        if self.options.containers {
            match export_picture(self.cursor, picture, self.root_flags) {
                Ok(bytes) => {
                    self.sink.write_container(self.index, &bytes)?;
                    debug!("Container {}: {} bytes", self.index, bytes.len());
                    self.index += 1;
                }
                Err(err) => self.skip(picture, err)?
            }
        }
        Ok(())
    }
}
