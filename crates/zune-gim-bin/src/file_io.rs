/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::ZByteIoError;
use zune_core::colorspace::ColorSpace;
use zune_core::options::EncoderOptions;
use zune_gim::{GimEvent, GimSink, RasterImage};
use zune_png::PngEncoder;

/// Writes artifacts as `<stem>-<index>.<ext>` into a directory
pub struct FileSink {
    out_dir: PathBuf,
    stem:    String,
    written: Vec<PathBuf>
}

impl FileSink {
    pub fn new(out_dir: PathBuf, stem: String) -> FileSink {
        FileSink {
            out_dir,
            stem,
            written: vec![]
        }
    }

    /// Name of the output with the given index and extension
    pub fn output_path(&self, index: usize, extension: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}-{}.{}", self.stem, index, extension))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn create(&mut self, path: &Path) -> Result<BufWriter<File>, ZByteIoError> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)?;

        self.written.push(path.to_path_buf());
        Ok(BufWriter::new(file))
    }
}

impl GimSink for FileSink {
    fn write_image(&mut self, index: usize, image: &RasterImage) -> Result<(), ZByteIoError> {
        let path = self.output_path(index, "png");
        let pixels = image.to_rgba8();

        let options = EncoderOptions::new(
            image.width(),
            image.height(),
            ColorSpace::RGBA,
            BitDepth::Eight
        );
        let mut writer = self.create(&path)?;

        PngEncoder::new(&pixels, options).encode(&mut writer)?;
        writer.flush()?;

        info!("Wrote {:?}", path);
        Ok(())
    }

    fn write_container(&mut self, index: usize, bytes: &[u8]) -> Result<(), ZByteIoError> {
        let path = self.output_path(index, "gim");
        let mut writer = self.create(&path)?;

        writer.write_all(bytes)?;
        writer.flush()?;

        info!("Wrote {:?}", path);
        Ok(())
    }

    fn diagnostic(&mut self, event: GimEvent) {
        match event {
            GimEvent::BadMagic => error!("Invalid magic bytes, not a GIM file"),
            GimEvent::WrongRootType(code) => {
                error!("Expected the ROOT block, found block type {code:#x}")
            }
            GimEvent::UnsupportedPixelFormat(code) => {
                warn!("Unsupported pixel format {code}")
            }
            GimEvent::MissingPalette => {
                warn!("Indexed image has no palette, using a grey ramp")
            }
            GimEvent::FileInfo(strings) => {
                for line in strings {
                    println!("{line}");
                }
            }
            GimEvent::LeafSkipped {
                block_offset,
                error
            } => warn!("Skipped block at {block_offset:#x}: {error:?}"),
            other => warn!("{other:?}")
        }
    }
}
