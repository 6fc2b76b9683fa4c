/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Bounds checked random access over the input stream
//!
//! Every read names the window it is allowed to touch, a read that
//! would leave the window fails with [`GimDecoderErrors::FieldOutOfBounds`]
//! before the underlying reader is asked for anything.

use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};

use crate::errors::GimDecoderErrors;

/// A half open byte range `[start, end)` of the input
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Window {
    pub start: u64,
    pub end:   u64
}

impl Window {
    pub const fn new(start: u64, end: u64) -> Window {
        Window { start, end }
    }

    pub fn check(&self, offset: u64, len: usize) -> Result<(), GimDecoderErrors> {
        let fits = offset >= self.start
            && offset
                .checked_add(len as u64)
                .map_or(false, |read_end| read_end <= self.end);

        if !fits {
            return Err(GimDecoderErrors::FieldOutOfBounds {
                offset,
                len,
                start: self.start,
                end: self.end
            });
        }
        Ok(())
    }
}

pub(crate) struct BlockCursor<T: ZByteReaderTrait> {
    reader: ZReader<T>,
    len:    Option<u64>
}

impl<T: ZByteReaderTrait> BlockCursor<T> {
    pub fn new(source: T) -> BlockCursor<T> {
        BlockCursor {
            reader: ZReader::new(source),
            len:    None
        }
    }

    /// Total length of the underlying stream
    pub fn len(&mut self) -> Result<u64, GimDecoderErrors> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.reader.seek(ZSeekFrom::End(0))?;
        self.reader.set_position(0)?;
        self.len = Some(len);
        Ok(len)
    }

    /// The window covering the whole stream
    pub fn whole(&mut self) -> Result<Window, GimDecoderErrors> {
        Ok(Window::new(0, self.len()?))
    }

    /// Fill `buf` with the bytes at `offset`, which must lie in `window`
    /// and in the stream
    pub fn read_at(
        &mut self, offset: u64, buf: &mut [u8], window: Window
    ) -> Result<(), GimDecoderErrors> {
        window.check(offset, buf.len())?;
        // the window may be wider than the data we actually have
        self.whole()?.check(offset, buf.len())?;

        let position = usize::try_from(offset).map_err(|_| GimDecoderErrors::OverFlowOccurred)?;

        self.reader.set_position(position)?;
        self.reader.read_exact_bytes(buf)?;
        Ok(())
    }

    pub fn read_fixed_at<const N: usize>(
        &mut self, offset: u64, window: Window
    ) -> Result<[u8; N], GimDecoderErrors> {
        let mut bytes = [0; N];
        self.read_at(offset, &mut bytes, window)?;
        Ok(bytes)
    }

    pub fn read_vec_at(
        &mut self, offset: u64, len: usize, window: Window
    ) -> Result<Vec<u8>, GimDecoderErrors> {
        // check before allocating, `len` may come straight from the file
        window.check(offset, len)?;
        let mut bytes = vec![0; len];
        self.read_at(offset, &mut bytes, window)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use zune_core::bytestream::ZCursor;

    use super::{BlockCursor, Window};
    use crate::errors::GimDecoderErrors;

    #[test]
    fn reads_inside_window() {
        let data = [0_u8, 1, 2, 3, 4, 5, 6, 7];
        let mut cursor = BlockCursor::new(ZCursor::new(&data[..]));

        let bytes = cursor.read_fixed_at::<3>(2, Window::new(2, 5)).unwrap();
        assert_eq!(bytes, [2, 3, 4]);
        assert_eq!(cursor.len().unwrap(), 8);
    }

    #[test]
    fn rejects_reads_leaving_window() {
        let data = [0_u8; 8];
        let mut cursor = BlockCursor::new(ZCursor::new(&data[..]));

        let err = cursor.read_fixed_at::<4>(2, Window::new(0, 4)).unwrap_err();
        assert!(matches!(
            err,
            GimDecoderErrors::FieldOutOfBounds {
                offset: 2,
                len: 4,
                ..
            }
        ));
    }

    #[test]
    fn rejects_reads_past_stream_end() {
        let data = [0_u8; 8];
        let mut cursor = BlockCursor::new(ZCursor::new(&data[..]));

        // window claims more than the stream holds
        let err = cursor.read_vec_at(6, 4, Window::new(0, 64)).unwrap_err();
        assert!(matches!(err, GimDecoderErrors::FieldOutOfBounds { .. }));
    }
}
