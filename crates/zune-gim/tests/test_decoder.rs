/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::ZCursor;
use zune_core::options::DecoderOptions;
use zune_gim::{probe_gim, BlockType, GimDecoder, GimDecoderErrors, GimPixelFormat, RasterPixels};

mod common;

use common::*;

#[test]
fn probe_detects_signature() {
    let data = gim(vec![]);
    assert!(probe_gim(&data));
    assert!(!probe_gim(b"MIG.00.1PS"));
    assert!(!probe_gim(b"\x89PNG\r\n\x1a\n\0\0\0\0"));
}

#[test]
fn sub_header_fields_are_resolved() {
    let data = gim(vec![Block::picture(vec![image(2, 3, 2, 6, &[0; 12])])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = &root.children()[0].children()[0];
    let header = decoder.sub_header(leaf).unwrap();

    assert_eq!(header.header_len, SUB_HEADER_LEN);
    assert_eq!(header.format, GimPixelFormat::Rgba4444);
    assert_eq!((header.width, header.height, header.pitch), (3, 2, 6));
    assert_eq!(header.pixels_start, leaf.payload_offset() + 0x40);
    assert_eq!(header.pixels_end, leaf.payload_offset() + 0x40 + 12);
    assert_eq!(header.mip_count, 1);
    assert_eq!(header.frame_count, 1);
}

#[test]
fn short_sub_header_is_rejected() {
    let mut body = data_payload(0, 1, 1, 2, &[0, 0]);
    body[0] = 0x10;
    let data = gim(vec![Block::picture(vec![Block::leaf(IMAGE, body)])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = &root.children()[0].children()[0];
    assert!(matches!(
        decoder.decode_image(leaf, None),
        Err(GimDecoderErrors::FieldOutOfBounds { .. })
    ));
}

#[test]
fn row_padding_uses_remainder_of_pitch() {
    // three RGB565 pixels take six bytes, pitch 4 skips 6 % 4 = 2 bytes
    let pixels = [
        0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xAA, 0xAA, //
        0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00
    ];
    let data = gim(vec![Block::picture(vec![image(0, 3, 2, 4, &pixels)])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = &root.children()[0].children()[0];
    let raster = decoder.decode_image(leaf, None).unwrap();

    let white = [255, 255, 255, 255];
    let black = [0, 0, 0, 255];
    let expected: Vec<u8> = [white, black, white, black, white, black].concat();

    assert_eq!(raster.to_rgba8(), expected);
    assert!(matches!(raster.pixels(), RasterPixels::TrueColor(_)));
    assert!(!raster.used_fallback_palette());
}

#[test]
fn odd_width_4bpp_rows_round_down() {
    // width 3 stores one byte per row, the third pixel of each row is index 0
    let data = gim(vec![Block::picture(vec![image(
        4,
        3,
        2,
        1,
        &[0x21, 0x43, 0x65, 0x87]
    )])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let raster = decoder
        .decode_image(&root.children()[0].children()[0], None)
        .unwrap();

    match raster.pixels() {
        RasterPixels::Indexed { bits, indices, .. } => {
            assert_eq!(*bits, 4);
            assert_eq!(indices, &[1, 2, 0, 3, 4, 0]);
        }
        other => panic!("expected indexed pixels, got {other:?}")
    }
}

#[test]
fn rgba4444_never_reaches_full_intensity() {
    let data = gim(vec![Block::picture(vec![image(2, 1, 1, 2, &[0xFF, 0xFF])])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let raster = decoder
        .decode_image(&root.children()[0].children()[0], None)
        .unwrap();
    assert_eq!(raster.to_rgba8(), vec![30, 30, 30, 30]);
}

#[test]
fn dimensions_are_limited_by_options() {
    let data = gim(vec![Block::picture(vec![image(5, 8, 1, 8, &[0; 8])])]);

    let options = DecoderOptions::default().set_max_width(4);
    let mut decoder = GimDecoder::new_with_options(ZCursor::new(&data[..]), options);
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = &root.children()[0].children()[0];
    assert!(matches!(
        decoder.decode_image(leaf, None),
        Err(GimDecoderErrors::TooLargeDimensions("width", 4, 8))
    ));
}

#[test]
fn zero_dimensions_are_rejected() {
    let data = gim(vec![Block::picture(vec![image(0, 0, 4, 0, &[])])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = &root.children()[0].children()[0];
    let err = decoder.decode_image(leaf, None).unwrap_err();
    assert!(matches!(err, GimDecoderErrors::ZeroDimensions(0, 4)));
    assert!(err.is_recoverable());
}

#[test]
fn palette_entries_follow_width() {
    let data = gim(vec![Block::picture(vec![palette_5551(&[
        0x8000 | 31,
        0,
        0xFFFF
    ])])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let leaf = root.children()[0]
        .children_of(BlockType::Palette)
        .next()
        .unwrap();
    let palette = decoder.decode_palette(leaf).unwrap();

    assert_eq!(palette.len(), 3);
    assert_eq!(palette.format(), GimPixelFormat::Rgba5551);
    assert_eq!(palette.colors()[0].to_rgba(), [0, 0, 255, 255]);
    assert_eq!(palette.colors()[1].to_rgba(), [0, 0, 0, 0]);
    assert_eq!(palette.colors()[2].to_rgba(), [255, 255, 255, 255]);
}

#[test]
fn leaf_kinds_are_checked() {
    let data = gim(vec![Block::picture(vec![image(0, 1, 1, 2, &[0, 0])])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let root = decoder.root().unwrap().clone();

    let picture = &root.children()[0];
    let leaf = &picture.children()[0];

    assert!(decoder.decode_palette(leaf).is_err());
    assert!(decoder.decode_image(picture, None).is_err());
    assert!(decoder.export_picture(leaf).is_err());
    assert!(decoder.export_picture(picture).is_ok());
}

#[test]
fn decode_headers_is_idempotent() {
    let data = gim(vec![Block::picture(vec![])]);

    let mut decoder = GimDecoder::new(ZCursor::new(&data[..]));
    decoder.decode_headers().unwrap();
    let first = decoder.root().cloned();
    decoder.decode_headers().unwrap();

    assert_eq!(first.as_ref(), decoder.root());
}
