/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![allow(dead_code)]

//! Hand built GIM files for tests

use zune_core::bytestream::{ZByteIoError, ZCursor};
use zune_gim::{GimDecoder, GimEvent, GimSink, GimSplitOptions, RasterImage};

pub const ROOT: u16 = 0x02;
pub const PICTURE: u16 = 0x03;
pub const IMAGE: u16 = 0x04;
pub const PALETTE: u16 = 0x05;
pub const FILEINFO: u16 = 0xFF;

/// Length of the data sub-header written by [`data_payload`]
pub const SUB_HEADER_LEN: u16 = 0x40;

pub struct Block {
    kind:     u16,
    flags:    u16,
    body:     Vec<u8>,
    children: Vec<Block>
}

impl Block {
    pub fn leaf(kind: u16, body: Vec<u8>) -> Block {
        Block {
            kind,
            flags: 0,
            body,
            children: Vec::new()
        }
    }

    pub fn container(kind: u16, children: Vec<Block>) -> Block {
        Block {
            kind,
            flags: 0,
            body: Vec::new(),
            children
        }
    }

    pub fn picture(children: Vec<Block>) -> Block {
        Block::container(PICTURE, children)
    }

    pub fn flags(mut self, flags: u16) -> Block {
        self.flags = flags;
        self
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut inner = Vec::new();
        for child in &self.children {
            child.encode(&mut inner);
        }
        inner.extend_from_slice(&self.body);

        let size = 16 + inner.len() as u32;
        // containers point at their first child, leaves past themselves
        let next = if self.children.is_empty() { size } else { 16 };

        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        out.extend_from_slice(&16_u32.to_le_bytes());
        out.extend_from_slice(&inner);
    }
}

pub fn signature() -> Vec<u8> {
    let mut out = b"MIG.00.1PSP\0".to_vec();
    out.extend_from_slice(&[0; 4]);
    out
}

/// A complete file whose ROOT holds `children`
pub fn gim(children: Vec<Block>) -> Vec<u8> {
    let mut out = signature();
    Block::container(ROOT, children).encode(&mut out);
    out
}

/// An IMAGE or PALETTE payload, sub-header followed by `pixels`
pub fn data_payload(format: u16, width: u16, height: u16, pitch: u16, pixels: &[u8]) -> Vec<u8> {
    let len = usize::from(SUB_HEADER_LEN);
    let mut out = vec![0_u8; len];

    out[0..2].copy_from_slice(&SUB_HEADER_LEN.to_le_bytes());
    out[4..6].copy_from_slice(&format.to_le_bytes());
    out[8..10].copy_from_slice(&width.to_le_bytes());
    out[10..12].copy_from_slice(&height.to_le_bytes());
    out[14..16].copy_from_slice(&pitch.to_le_bytes());

    let start = i32::from(SUB_HEADER_LEN);
    let end = start + pixels.len() as i32;
    out[0x1C..0x20].copy_from_slice(&start.to_le_bytes());
    out[0x20..0x24].copy_from_slice(&end.to_le_bytes());
    // one mip level, one frame
    out[0x2A..0x2C].copy_from_slice(&1_i16.to_le_bytes());
    out[0x2E..0x30].copy_from_slice(&1_i16.to_le_bytes());

    out.extend_from_slice(pixels);
    out
}

pub fn image(format: u16, width: u16, height: u16, pitch: u16, pixels: &[u8]) -> Block {
    Block::leaf(IMAGE, data_payload(format, width, height, pitch, pixels))
}

/// A palette of RGBA5551 entries
pub fn palette_5551(entries: &[u16]) -> Block {
    let bytes: Vec<u8> = entries.iter().flat_map(|e| e.to_le_bytes()).collect();
    Block::leaf(
        PALETTE,
        data_payload(1, entries.len() as u16, 1, 0, &bytes)
    )
}

/// Sink recording everything it is handed
#[derive(Default)]
pub struct Collect {
    pub images:     Vec<(usize, RasterImage)>,
    pub containers: Vec<(usize, Vec<u8>)>,
    pub events:     Vec<GimEvent>
}

impl GimSink for Collect {
    fn write_image(&mut self, index: usize, image: &RasterImage) -> Result<(), ZByteIoError> {
        self.images.push((index, image.clone()));
        Ok(())
    }

    fn write_container(&mut self, index: usize, bytes: &[u8]) -> Result<(), ZByteIoError> {
        self.containers.push((index, bytes.to_vec()));
        Ok(())
    }

    fn diagnostic(&mut self, event: GimEvent) {
        self.events.push(event);
    }
}

/// Split `data` with default options, starting at index 1
pub fn split(data: &[u8]) -> (Collect, usize) {
    split_with(data, GimSplitOptions::default())
}

pub fn split_with(data: &[u8], options: GimSplitOptions) -> (Collect, usize) {
    let mut sink = Collect::default();
    let mut decoder = GimDecoder::new(ZCursor::new(data));
    let next = decoder.split(&mut sink, &options, 1).unwrap();
    (sink, next)
}
