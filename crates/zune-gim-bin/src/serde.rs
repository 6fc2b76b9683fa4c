/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::collections::BTreeMap;
use std::ffi::OsString;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use zune_gim::{BlockRecord, DataSubHeader};

/// Block tree of a file together with the data sub-headers
/// of its IMAGE and PALETTE blocks, keyed by block offset
pub struct Metadata<'a> {
    file:        OsString,
    size:        u64,
    root:        &'a BlockRecord,
    sub_headers: &'a BTreeMap<u64, DataSubHeader>
}

impl<'a> Metadata<'a> {
    pub fn new(
        file: OsString, size: u64, root: &'a BlockRecord,
        sub_headers: &'a BTreeMap<u64, DataSubHeader>
    ) -> Metadata<'a> {
        Metadata {
            file,
            size,
            root,
            sub_headers
        }
    }
}

impl<'a> Serialize for Metadata<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("GimMetadata", 3)?;

        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field(
            "root",
            &Block {
                record:      self.root,
                sub_headers: self.sub_headers
            }
        )?;

        state.end()
    }
}

struct Block<'a> {
    record:      &'a BlockRecord,
    sub_headers: &'a BTreeMap<u64, DataSubHeader>
}

impl<'a> Serialize for Block<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let record = self.record;
        let children: Vec<Block> = record
            .children()
            .iter()
            .map(|child| Block {
                record:      child,
                sub_headers: self.sub_headers
            })
            .collect();

        let mut state = serializer.serialize_struct("Block", 9)?;

        state.serialize_field("type", record.kind().name())?;
        state.serialize_field("code", &record.kind().to_u16())?;
        state.serialize_field("flags", &record.flags())?;
        state.serialize_field("size", &record.size())?;
        state.serialize_field("start", &record.start_offset())?;
        state.serialize_field("next", &record.next_offset())?;
        state.serialize_field("payload", &record.payload_offset())?;
        state.serialize_field(
            "data",
            &self.sub_headers.get(&record.start_offset()).map(SubHeader)
        )?;
        state.serialize_field("children", &children)?;

        state.end()
    }
}

struct SubHeader<'a>(&'a DataSubHeader);

impl<'a> Serialize for SubHeader<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let header = self.0;
        let mut state = serializer.serialize_struct("DataSubHeader", 13)?;

        state.serialize_field("header_len", &header.header_len)?;
        state.serialize_field("format", &format!("{:?}", header.format))?;
        state.serialize_field("format_code", &header.format.to_u16())?;
        state.serialize_field("width", &header.width)?;
        state.serialize_field("height", &header.height)?;
        state.serialize_field("pitch", &header.pitch)?;
        state.serialize_field("pixels_start", &header.pixels_start)?;
        state.serialize_field("pixels_end", &header.pixels_end)?;
        state.serialize_field("plane_mask", &header.plane_mask)?;
        state.serialize_field("level_type", &header.level_type)?;
        state.serialize_field("mip_count", &header.mip_count)?;
        state.serialize_field("frame_type", &header.frame_type)?;
        state.serialize_field("frame_count", &header.frame_count)?;

        state.end()
    }
}
