// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;

use byteorder::{BigEndian, ByteOrder};

use crate::core::store::DataInput;
use crate::core::util::byte_block_pool::{
    ByteBlockPool, BYTE_BLOCK_MASK, BYTE_BLOCK_SHIFT, BYTE_BLOCK_SIZE, FIRST_LEVEL_SIZE,
    LEVEL_SIZE_ARRAY, NEXT_LEVEL_ARRAY,
};

/// The sliced reader: decodes the bytes of one sliced stream between a begin
/// and an end offset, following forwarding addresses from slice to slice.
pub struct ByteSliceReader<'a> {
    pool: &'a ByteBlockPool,
    buffer_upto: usize,
    upto: usize,
    limit: usize,
    level: usize,
    buffer_offset: usize,
    end_index: usize,
}

impl<'a> ByteSliceReader<'a> {
    pub fn new(pool: &'a ByteBlockPool, start_index: usize, end_index: usize) -> Self {
        debug_assert!(end_index >= start_index);

        let buffer_upto = start_index >> BYTE_BLOCK_SHIFT;
        let buffer_offset = buffer_upto * BYTE_BLOCK_SIZE;
        let upto = start_index & BYTE_BLOCK_MASK;

        let limit = if start_index + FIRST_LEVEL_SIZE >= end_index {
            // The stream fits in this single slice.
            end_index & BYTE_BLOCK_MASK
        } else {
            upto + FIRST_LEVEL_SIZE - 4
        };

        ByteSliceReader {
            pool,
            buffer_upto,
            upto,
            limit,
            level: 0,
            buffer_offset,
            end_index,
        }
    }

    pub fn eof(&self) -> bool {
        debug_assert!(self.upto + self.buffer_offset <= self.end_index);
        self.upto + self.buffer_offset == self.end_index
    }

    fn next_slice(&mut self) {
        // The forwarding address occupies the last four bytes of the slice.
        let buffer = &self.pool.buffers[self.buffer_upto];
        let next_index = BigEndian::read_u32(&buffer[self.limit..self.limit + 4]) as usize;

        self.level = NEXT_LEVEL_ARRAY[self.level];
        let new_size = LEVEL_SIZE_ARRAY[self.level];

        self.buffer_upto = next_index >> BYTE_BLOCK_SHIFT;
        self.buffer_offset = self.buffer_upto * BYTE_BLOCK_SIZE;
        self.upto = next_index & BYTE_BLOCK_MASK;

        if next_index + new_size >= self.end_index {
            // Advancing into the final slice.
            debug_assert!(self.end_index >= next_index);
            self.limit = self.end_index - self.buffer_offset;
        } else {
            self.limit = self.upto + new_size - 4;
        }
    }
}

impl<'a> io::Read for ByteSliceReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut len = buf.len();
        let mut offset = 0;
        while len > 0 {
            if self.eof() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read past the end of a byte slice stream",
                ));
            }
            let num_left = self.limit - self.upto;
            if num_left < len {
                buf[offset..offset + num_left].copy_from_slice(
                    &self.pool.buffers[self.buffer_upto][self.upto..self.upto + num_left],
                );
                offset += num_left;
                len -= num_left;
                self.next_slice();
            } else {
                buf[offset..offset + len].copy_from_slice(
                    &self.pool.buffers[self.buffer_upto][self.upto..self.upto + len],
                );
                self.upto += len;
                break;
            }
        }
        Ok(buf.len())
    }
}

impl<'a> DataInput for ByteSliceReader<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::DataOutput;
    use crate::core::util::SliceWriter;

    #[test]
    fn test_vint_roundtrip_through_slices() {
        let mut pool = ByteBlockPool::new();
        let start = pool.alloc_slice();
        let mut out = SliceWriter::new(&mut pool, start);
        for i in 0..1000u32 {
            out.write_vint(i * i).unwrap();
        }
        let end = out.pool_offset();

        let mut reader = ByteSliceReader::new(&pool, start, end);
        for i in 0..1000u32 {
            assert_eq!(reader.read_vint().unwrap(), i * i);
        }
        assert!(reader.eof());
    }

    #[test]
    fn test_read_past_eof_fails() {
        let mut pool = ByteBlockPool::new();
        let start = pool.alloc_slice();
        let mut out = SliceWriter::new(&mut pool, start);
        out.write_byte(7).unwrap();
        let end = out.pool_offset();

        let mut reader = ByteSliceReader::new(&pool, start, end);
        assert_eq!(reader.read_byte().unwrap(), 7);
        assert!(reader.eof());
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn test_empty_stream_is_eof() {
        let mut pool = ByteBlockPool::new();
        let start = pool.alloc_slice();
        let reader = ByteSliceReader::new(&pool, start, start);
        assert!(reader.eof());
    }
}
