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

use crate::core::store::DataOutput;
use crate::core::util::fill_slice;

pub const BYTE_BLOCK_SHIFT: usize = 15;
pub const BYTE_BLOCK_SIZE: usize = 1 << BYTE_BLOCK_SHIFT;
pub const BYTE_BLOCK_MASK: usize = BYTE_BLOCK_SIZE - 1;

/// Slice sizes per level. A posting stream starts in a level-0 slice and
/// chains into progressively larger slices; the last level is
/// self-referential.
pub const LEVEL_SIZE_ARRAY: [usize; 10] = [9, 18, 18, 36, 36, 72, 72, 144, 144, 200];

/// Index into [`LEVEL_SIZE_ARRAY`] for the slice following a slice of the
/// given level.
pub const NEXT_LEVEL_ARRAY: [usize; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 9];

pub const FIRST_LEVEL_SIZE: usize = LEVEL_SIZE_ARRAY[0];

/// High nibble of the marker byte closing every slice. The low nibble holds
/// the slice level. Slices are zero filled, so a writer knows it reached the
/// end of its slice when it lands on a non-zero byte; a filled slice's last
/// four bytes are overwritten with the forwarding address of its successor.
const LEVEL_MARKER: u8 = 0x10;

/// An append-only pool of fixed-size byte blocks shared by all field
/// accumulators of one in-memory segment.
///
/// Positions in the pool are *absolute offsets* into the conceptual
/// concatenation of all blocks; an offset decomposes into
/// `(offset >> BYTE_BLOCK_SHIFT, offset & BYTE_BLOCK_MASK)`.
///
/// Besides raw appends (term bytes) the pool hosts *sliced streams*: linked
/// lists of slices of geometrically growing sizes. Each slice ends in a
/// one-byte level marker; when a writer fills a slice, the marker and the
/// three data bytes before it are replaced by the absolute offset of a
/// freshly allocated successor slice (the displaced data bytes move to the
/// head of the successor). The bytes logically belonging to a stream are
/// therefore the union of its slices minus the forward pointers.
pub struct ByteBlockPool {
    /// Blocks currently allocated by the pool. Do not modify outside of this
    /// module and the slice reader.
    pub buffers: Vec<Vec<u8>>,
    /// Index of the block currently used as the head.
    pub buffer_upto: isize,
    /// Write position within the head block.
    pub byte_upto: usize,
    /// Absolute offset of the head block.
    pub byte_offset: isize,
}

impl Default for ByteBlockPool {
    fn default() -> Self {
        ByteBlockPool {
            buffers: Vec::new(),
            buffer_upto: -1,
            byte_upto: BYTE_BLOCK_SIZE,
            byte_offset: -(BYTE_BLOCK_SIZE as isize),
        }
    }
}

impl ByteBlockPool {
    pub fn new() -> Self {
        Default::default()
    }

    /// Resets the pool to its initial state, reusing the first block.
    ///
    /// The retained block is zero filled again, so a subsequent ingestion
    /// writes byte-identical content to a fresh pool.
    pub fn reset(&mut self) {
        if self.buffer_upto > -1 {
            fill_slice(&mut self.buffers[0], 0);
            self.buffers.truncate(1);
            self.buffer_upto = 0;
            self.byte_upto = 0;
            self.byte_offset = 0;
        }
    }

    /// Advances the pool to its next block.
    pub fn next_buffer(&mut self) {
        let idx = (self.buffer_upto + 1) as usize;
        if idx == self.buffers.len() {
            self.buffers.push(vec![0u8; BYTE_BLOCK_SIZE]);
        }
        self.buffer_upto += 1;
        self.byte_upto = 0;
        self.byte_offset += BYTE_BLOCK_SIZE as isize;
    }

    /// Mints the head slice of a new sliced stream and returns its absolute
    /// offset.
    pub fn alloc_slice(&mut self) -> usize {
        if self.byte_upto > BYTE_BLOCK_SIZE - FIRST_LEVEL_SIZE {
            self.next_buffer();
        }
        let upto = self.byte_upto;
        self.byte_upto += FIRST_LEVEL_SIZE;
        self.buffers[self.buffer_upto as usize][self.byte_upto - 1] = LEVEL_MARKER;
        (upto as isize + self.byte_offset) as usize
    }

    /// Allocates the successor of the filled slice whose marker sits at the
    /// absolute offset `cursor`, links it through the forward pointer and
    /// returns the absolute offset where the next stream byte goes.
    pub(crate) fn alloc_next_slice(&mut self, cursor: usize) -> usize {
        let idx = cursor >> BYTE_BLOCK_SHIFT;
        let upto = cursor & BYTE_BLOCK_MASK;

        let level = (self.buffers[idx][upto] & 0x0f) as usize;
        let new_level = NEXT_LEVEL_ARRAY[level];
        let new_size = LEVEL_SIZE_ARRAY[new_level];

        if self.byte_upto > BYTE_BLOCK_SIZE - new_size {
            self.next_buffer();
        }

        let new_upto = self.byte_upto;
        let offset = (new_upto as isize + self.byte_offset) as usize;
        self.byte_upto += new_size;

        // Carry the last three data bytes forward; they are about to be
        // overwritten with the forwarding address.
        let head = self.buffer_upto as usize;
        self.buffers[head][new_upto] = self.buffers[idx][upto - 3];
        self.buffers[head][new_upto + 1] = self.buffers[idx][upto - 2];
        self.buffers[head][new_upto + 2] = self.buffers[idx][upto - 1];

        BigEndian::write_u32(
            &mut self.buffers[idx][upto - 3..upto + 1],
            offset as u32,
        );

        self.buffers[head][self.byte_upto - 1] = LEVEL_MARKER | new_level as u8;

        offset + 3
    }

    /// Appends `bytes` as one contiguous run (advancing to the next block if
    /// the head block cannot hold it) and returns its absolute offset.
    pub fn add_bytes(&mut self, bytes: &[u8]) -> usize {
        debug_assert!(bytes.len() <= BYTE_BLOCK_SIZE);
        if self.byte_upto + bytes.len() > BYTE_BLOCK_SIZE {
            self.next_buffer();
        }
        let upto = self.byte_upto;
        self.buffers[self.buffer_upto as usize][upto..upto + bytes.len()].copy_from_slice(bytes);
        self.byte_upto += bytes.len();
        (upto as isize + self.byte_offset) as usize
    }

    /// The contiguous run of `len` bytes at the given absolute offset. Only
    /// valid for runs written through [`ByteBlockPool::add_bytes`].
    pub fn bytes_at(&self, offset: usize, len: usize) -> &[u8] {
        let idx = offset >> BYTE_BLOCK_SHIFT;
        let pos = offset & BYTE_BLOCK_MASK;
        &self.buffers[idx][pos..pos + len]
    }

    pub fn read_byte(&self, offset: usize) -> u8 {
        self.buffers[offset >> BYTE_BLOCK_SHIFT][offset & BYTE_BLOCK_MASK]
    }
}

/// The sliced inserter: appends bytes to a sliced stream through an absolute
/// cursor, transparently allocating and linking continuation slices.
pub struct SliceWriter<'a> {
    pool: &'a mut ByteBlockPool,
    cursor: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(pool: &'a mut ByteBlockPool, cursor: usize) -> Self {
        SliceWriter { pool, cursor }
    }

    /// The absolute cursor after all writes so far; stored back as the
    /// stream's end offset.
    pub fn pool_offset(&self) -> usize {
        self.cursor
    }

    fn write_slice_byte(&mut self, b: u8) {
        let mut idx = self.cursor >> BYTE_BLOCK_SHIFT;
        let mut pos = self.cursor & BYTE_BLOCK_MASK;
        if self.pool.buffers[idx][pos] != 0 {
            // Hit the level marker; jump into a fresh slice.
            self.cursor = self.pool.alloc_next_slice(self.cursor);
            idx = self.cursor >> BYTE_BLOCK_SHIFT;
            pos = self.cursor & BYTE_BLOCK_MASK;
        }
        self.pool.buffers[idx][pos] = b;
        self.cursor += 1;
    }
}

impl<'a> io::Write for SliceWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for b in buf {
            self.write_slice_byte(*b);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> DataOutput for SliceWriter<'a> {}
