/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![no_main]

use libfuzzer_sys::fuzz_target;
use zune_gim::zune_core::bytestream::{ZByteIoError, ZCursor};
use zune_gim::{GimDecoder, GimEvent, GimSink, GimSplitOptions, RasterImage};

struct Discard;

impl GimSink for Discard {
    fn write_image(&mut self, _: usize, image: &RasterImage) -> Result<(), ZByteIoError> {
        let _ = image.to_rgba8();
        Ok(())
    }

    fn write_container(&mut self, _: usize, bytes: &[u8]) -> Result<(), ZByteIoError> {
        // re-packed pictures must parse again
        let mut decoder = GimDecoder::new(ZCursor::new(bytes));
        let _ = decoder.decode_headers();
        Ok(())
    }

    fn diagnostic(&mut self, _: GimEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut decoder = GimDecoder::new(ZCursor::new(data));
    let _ = decoder.split(&mut Discard, &GimSplitOptions::default(), 1);
});
