/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The GIM block tree
//!
//! A GIM file is a 16 byte signature followed by a ROOT block. Every block
//! starts with a 16 byte header
//!
//! ```text
//! +------+-------+------+-------------+----------------+
//! | type | flags | size | next offset | payload offset |
//! | u16  | u16   | u32  | u32         | u32            |
//! +------+-------+------+-------------+----------------+
//! ```
//!
//! `size` covers the header itself, both offsets are relative to the start of
//! the header. ROOT and PICTURE blocks hold further blocks, their first child
//! sits at the next offset and children continue until the container ends.
//!
//! Reading happens in two passes, first the headers are scanned into a flat
//! pre-order list with resolved absolute offsets, then the list is folded into
//! the owning tree. Neither pass recurses.

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use log::trace;
use zune_core::bytestream::ZByteReaderTrait;

use crate::cursor::{BlockCursor, Window};
use crate::errors::GimDecoderErrors;

/// First eight bytes of every GIM file
pub const GIM_MAGIC: &[u8; 8] = b"MIG.00.1";
/// Platform tag following the magic bytes
pub const GIM_PLATFORM: &[u8; 4] = b"PSP\0";
/// Signature, platform tag and four reserved bytes
pub const GIM_SIGNATURE_SIZE: u64 = 16;
/// Size of a block header
pub const BLOCK_HEADER_SIZE: u64 = 16;
/// Deepest nesting of container blocks the reader accepts
pub const MAX_BLOCK_DEPTH: usize = 32;

/// Probe some bytes to see
/// if they consist of a GIM file
pub fn probe_gim(bytes: &[u8]) -> bool {
    if let Some(signature) = bytes.get(0..12) {
        return &signature[..8] == GIM_MAGIC && &signature[8..] == GIM_PLATFORM;
    }
    false
}

/// Kind of a block, taken from the first two bytes of its header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockType {
    Root,
    Picture,
    Image,
    Palette,
    FileInfo,
    /// Any other code, the block is kept but never inspected
    Unknown(u16)
}

impl BlockType {
    pub const fn from_u16(code: u16) -> BlockType {
        match code {
            0x02 => BlockType::Root,
            0x03 => BlockType::Picture,
            0x04 => BlockType::Image,
            0x05 => BlockType::Palette,
            0xFF => BlockType::FileInfo,
            _ => BlockType::Unknown(code)
        }
    }

    pub const fn to_u16(self) -> u16 {
        match self {
            BlockType::Root => 0x02,
            BlockType::Picture => 0x03,
            BlockType::Image => 0x04,
            BlockType::Palette => 0x05,
            BlockType::FileInfo => 0xFF,
            BlockType::Unknown(code) => code
        }
    }

    /// Whether blocks of this type own child blocks
    pub const fn is_container(self) -> bool {
        matches!(self, BlockType::Root | BlockType::Picture)
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockType::Root => "ROOT",
            BlockType::Picture => "PICTURE",
            BlockType::Image => "IMAGE",
            BlockType::Palette => "PALETTE",
            BlockType::FileInfo => "FILEINFO",
            BlockType::Unknown(_) => "UNKNOWN"
        }
    }
}

/// A parsed block header with its offsets made absolute
/// and, for containers, the blocks it owns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockRecord {
    kind:     BlockType,
    flags:    u16,
    size:     u32,
    start:    u64,
    end:      u64,
    next:     u64,
    payload:  u64,
    children: Vec<BlockRecord>
}

impl BlockRecord {
    pub const fn kind(&self) -> BlockType {
        self.kind
    }
    /// The second header field, carried through untouched
    pub const fn flags(&self) -> u16 {
        self.flags
    }
    /// Declared size in bytes, header included
    pub const fn size(&self) -> u32 {
        self.size
    }
    /// Absolute offset of the block header
    pub const fn start_offset(&self) -> u64 {
        self.start
    }
    /// Absolute offset one past the last byte of the block
    pub const fn end_offset(&self) -> u64 {
        self.end
    }
    /// Absolute offset of the next block, for containers this is
    /// where their first child lives
    pub const fn next_offset(&self) -> u64 {
        self.next
    }
    /// Absolute offset of the block payload
    pub const fn payload_offset(&self) -> u64 {
        self.payload
    }
    pub fn children(&self) -> &[BlockRecord] {
        &self.children
    }

    /// Range of the payload, from the payload offset to the block end
    pub(crate) const fn payload_window(&self) -> Window {
        Window::new(self.payload, self.end)
    }
    /// Range of the whole block, header included
    pub(crate) const fn block_window(&self) -> Window {
        Window::new(self.start, self.end)
    }

    /// Iterate over direct children of a given type
    pub fn children_of(&self, kind: BlockType) -> impl Iterator<Item = &BlockRecord> {
        self.children.iter().filter(move |child| child.kind == kind)
    }
}

impl Display for BlockRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Type {}, size {:x}, End loc {:x}, Next block at {:x}, Data at {:x}",
            self.kind.name(),
            self.size,
            self.end,
            self.next,
            self.payload
        )
    }
}

/// Read the 16 byte block header at `offset`, resolving the relative
/// next and payload offsets to absolute positions
pub(crate) fn read_header<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, offset: u64
) -> Result<BlockRecord, GimDecoderErrors> {
    let whole = cursor.whole()?;

    if whole.check(offset, BLOCK_HEADER_SIZE as usize).is_err() {
        return Err(GimDecoderErrors::TruncatedHeader(offset));
    }
    let header = cursor.read_fixed_at::<16>(offset, whole)?;

    let kind = u16::from_le_bytes([header[0], header[1]]);
    let flags = u16::from_le_bytes([header[2], header[3]]);
    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    let next = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    let payload = u32::from_le_bytes([header[12], header[13], header[14], header[15]]);

    if u64::from(size) < BLOCK_HEADER_SIZE {
        return Err(GimDecoderErrors::InvalidBlockSize { offset, size });
    }

    let record = BlockRecord {
        kind: BlockType::from_u16(kind),
        flags,
        size,
        start: offset,
        end: offset + u64::from(size),
        next: offset + u64::from(next),
        payload: offset + u64::from(payload),
        children: Vec::new()
    };

    for position in [record.next, record.payload] {
        if position > record.end {
            return Err(GimDecoderErrors::OffsetOutOfBounds {
                offset: position,
                start:  record.start,
                end:    record.end
            });
        }
    }
    Ok(record)
}

/// First pass, walk the sibling chains in `[start, container_end)` and
/// every container below them, returning each header with its depth
/// (direct children have depth one) in pre-order.
pub(crate) fn scan_headers<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, start: u64, container_end: u64
) -> Result<Vec<(usize, BlockRecord)>, GimDecoderErrors> {
    struct Frame {
        position: u64,
        end:      u64
    }

    let mut headers = Vec::new();
    let mut frames = Vec::with_capacity(4);

    frames.push(Frame {
        position: start,
        end:      container_end
    });

    loop {
        let depth = frames.len();
        let Some(frame) = frames.last_mut() else {
            break;
        };
        if frame.position >= frame.end {
            frames.pop();
            continue;
        }
        let offset = frame.position;
        let record = read_header(cursor, offset)?;

        if record.end > frame.end {
            return Err(GimDecoderErrors::OffsetOutOfBounds {
                offset: record.end,
                start:  offset,
                end:    frame.end
            });
        }
        if record.next <= offset {
            return Err(GimDecoderErrors::NonAdvancingSibling {
                offset,
                next: record.next
            });
        }
        trace!("{:>width$}{record}", "", width = depth * 2);

        // siblings resume past the block, children of a container
        // are walked first
        frame.position = record.end;

        if record.kind.is_container() {
            if depth >= MAX_BLOCK_DEPTH {
                return Err(GimDecoderErrors::TooDeep(depth + 1));
            }
            frames.push(Frame {
                position: record.next,
                end:      record.end
            });
        }
        headers.push((depth, record));
    }
    Ok(headers)
}

/// Second pass, fold a pre-order list of `(depth, header)` into
/// the list of depth one blocks owning everything below them
pub(crate) fn assemble_tree(headers: Vec<(usize, BlockRecord)>) -> Vec<BlockRecord> {
    fn close(open: &mut Vec<BlockRecord>, top: &mut Vec<BlockRecord>) {
        if let Some(done) = open.pop() {
            match open.last_mut() {
                Some(parent) => parent.children.push(done),
                None => top.push(done)
            }
        }
    }

    let mut top = Vec::new();
    let mut open: Vec<BlockRecord> = Vec::new();

    for (depth, record) in headers {
        // blocks at this depth or deeper are complete
        while open.len() >= depth && !open.is_empty() {
            close(&mut open, &mut top);
        }
        open.push(record);
    }
    while !open.is_empty() {
        close(&mut open, &mut top);
    }
    top
}

/// Read every block in `[start, container_end)` into an ordered list of
/// siblings, containers owning their children
pub(crate) fn build_children<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>, start: u64, container_end: u64
) -> Result<Vec<BlockRecord>, GimDecoderErrors> {
    let headers = scan_headers(cursor, start, container_end)?;
    Ok(assemble_tree(headers))
}

/// Parse a whole GIM stream into its ROOT block
pub(crate) fn parse_container<T: ZByteReaderTrait>(
    cursor: &mut BlockCursor<T>
) -> Result<BlockRecord, GimDecoderErrors> {
    let whole = cursor.whole()?;

    let signature = cursor
        .read_fixed_at::<16>(0, whole)
        .map_err(|_| GimDecoderErrors::InvalidMagicBytes)?;

    if !probe_gim(&signature) {
        return Err(GimDecoderErrors::InvalidMagicBytes);
    }
    // last four bytes of the signature are reserved

    let mut root = read_header(cursor, GIM_SIGNATURE_SIZE)?;

    if root.kind != BlockType::Root {
        return Err(GimDecoderErrors::WrongRootType(root.kind));
    }
    if root.end > whole.end {
        return Err(GimDecoderErrors::OffsetOutOfBounds {
            offset: root.end,
            start:  root.start,
            end:    whole.end
        });
    }
    trace!("{root}");

    root.children = build_children(cursor, root.next, root.end)?;

    Ok(root)
}
