/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::collections::BTreeMap;
use std::ffi::OsStr;

use log::warn;
use zune_core::bytestream::ZCursor;
use zune_core::options::DecoderOptions;
use zune_gim::{BlockRecord, BlockType, GimDecoder, GimDecoderErrors};

use crate::serde::Metadata;

/// Collect the data sub-headers of every IMAGE and PALETTE below `root`
fn collect_sub_headers(
    decoder: &mut GimDecoder<ZCursor<&[u8]>>, root: &BlockRecord
) -> BTreeMap<u64, zune_gim::DataSubHeader> {
    let mut headers = BTreeMap::new();
    let mut pending = vec![root];

    while let Some(block) = pending.pop() {
        if matches!(block.kind(), BlockType::Image | BlockType::Palette) {
            match decoder.sub_header(block) {
                Ok(header) => {
                    headers.insert(block.start_offset(), header);
                }
                Err(err) => warn!(
                    "Could not read data header at {:#x}: {:?}",
                    block.start_offset(),
                    err
                )
            }
        }
        pending.extend(block.children());
    }
    headers
}

/// Parse the block tree of `data` and print it to standard output as JSON
pub fn probe_input_file(file: &OsStr, data: &[u8]) -> Result<(), GimDecoderErrors> {
    // only headers are read, limits do not matter
    let options = DecoderOptions::default()
        .set_max_width(usize::MAX)
        .set_max_height(usize::MAX);

    let mut decoder = GimDecoder::new_with_options(ZCursor::new(data), options);
    decoder.decode_headers()?;

    let root = decoder
        .root()
        .cloned()
        .ok_or(GimDecoderErrors::GenericStatic("No ROOT block"))?;

    let sub_headers = collect_sub_headers(&mut decoder, &root);
    let metadata = Metadata::new(file.to_os_string(), data.len() as u64, &root, &sub_headers);

    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|err| GimDecoderErrors::Generic(err.to_string()))?;

    println!("{json}");
    Ok(())
}
