/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Re-packing a PICTURE block into a standalone GIM file
//!
//! The output is the signature, a synthetic ROOT header, the PICTURE header
//! and each direct child of the picture laid out back to back
//!
//! ```text
//! 0x00  MIG.00.1 PSP\0 0000
//! 0x10  ROOT     next = payload = 0x10
//! 0x20  PICTURE  size and flags of the source
//! 0x30  child 0  header, then its body copied from the source
//! ....  child 1  ...
//! ```
//!
//! Any bytes the source PICTURE keeps between its header and its first
//! child are copied along, so the declared size still holds. Child headers
//! keep their type, flags, size and their header relative next and payload
//! offsets, so their bodies stay valid wherever they land.

use alloc::vec::Vec;

use log::{debug, warn};
use zune_core::bytestream::ZByteReaderTrait;

use crate::block::{BlockRecord, BlockType, BLOCK_HEADER_SIZE, GIM_MAGIC, GIM_PLATFORM};
use crate::cursor::BlockCursor;
use crate::errors::GimDecoderErrors;

fn write_header(
    out: &mut Vec<u8>, kind: BlockType, flags: u16, size: u32, next: u32, payload: u32
) {
    out.extend_from_slice(&kind.to_u16().to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&next.to_le_bytes());
    out.extend_from_slice(&payload.to_le_bytes());
}

fn to_u32(value: u64) -> Result<u32, GimDecoderErrors> {
    u32::try_from(value).map_err(|_| GimDecoderErrors::OverFlowOccurred)
}

/// Re-pack `picture` and its direct children into a standalone file
///
/// `root_flags` are written to the synthetic ROOT header.
pub(crate) fn export_picture<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, picture: &BlockRecord, root_flags: u16
) -> Result<Vec<u8>, GimDecoderErrors> {
    if picture.kind() != BlockType::Picture {
        return Err(GimDecoderErrors::GenericStatic(
            "Only PICTURE blocks can be exported"
        ));
    }
    let header_size = BLOCK_HEADER_SIZE as u32;
    let body_start = picture.start_offset() + BLOCK_HEADER_SIZE;

    // bytes between the header and the first child
    let lead_len = usize::try_from(picture.next_offset().saturating_sub(body_start))
        .map_err(|_| GimDecoderErrors::OverFlowOccurred)?;

    let children_size = picture
        .children()
        .iter()
        .try_fold(0_u64, |acc, child| acc.checked_add(u64::from(child.size())))
        .ok_or(GimDecoderErrors::OverFlowOccurred)?;

    let mut picture_size = picture.size();
    let packed_size = to_u32(BLOCK_HEADER_SIZE + lead_len as u64 + children_size)?;

    if packed_size != picture_size {
        // children overlap the picture header, only the packed layout parses
        warn!(
            "PICTURE at {:#x} declares size {:#x} but its children pack into {:#x}",
            picture.start_offset(),
            picture_size,
            packed_size
        );
        picture_size = packed_size;
    }
    let root_size = to_u32(BLOCK_HEADER_SIZE + u64::from(picture_size))?;
    let picture_next = to_u32(BLOCK_HEADER_SIZE + lead_len as u64)?;
    let picture_payload =
        to_u32(picture.payload_offset() - picture.start_offset())?.min(picture_size);

    let mut out = Vec::with_capacity(16 + root_size as usize);

    out.extend_from_slice(GIM_MAGIC);
    out.extend_from_slice(GIM_PLATFORM);
    out.extend_from_slice(&[0; 4]);

    write_header(
        &mut out,
        BlockType::Root,
        root_flags,
        root_size,
        header_size,
        header_size
    );
    write_header(
        &mut out,
        BlockType::Picture,
        picture.flags(),
        picture_size,
        picture_next,
        picture_payload
    );

    let lead = cursor.read_vec_at(body_start, lead_len, picture.block_window())?;
    out.extend_from_slice(&lead);

    for child in picture.children() {
        let start = child.start_offset();
        let next = to_u32(child.next_offset() - start)?;
        let payload = to_u32(child.payload_offset() - start)?;

        write_header(
            &mut out,
            child.kind(),
            child.flags(),
            child.size(),
            next,
            payload
        );

        let body_len = usize::try_from(u64::from(child.size()) - BLOCK_HEADER_SIZE)
            .map_err(|_| GimDecoderErrors::OverFlowOccurred)?;
        let body =
            cursor.read_vec_at(start + BLOCK_HEADER_SIZE, body_len, child.block_window())?;

        out.extend_from_slice(&body);
    }

    debug!(
        "Exported PICTURE at {:#x}, {} children, {} bytes",
        picture.start_offset(),
        picture.children().len(),
        out.len()
    );
    Ok(out)
}
