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

use crate::core::util::fill_slice;

pub const INT_BLOCK_SHIFT: usize = 13;
pub const INT_BLOCK_SIZE: usize = 1 << INT_BLOCK_SHIFT;
pub const INT_BLOCK_MASK: usize = INT_BLOCK_SIZE - 1;

/// An append-only pool of fixed-size `u32` blocks, addressed by absolute
/// offset like [`ByteBlockPool`](crate::core::util::ByteBlockPool) but not
/// sliced. It stores, per term, the write cursors and begin offsets of the
/// term's posting streams in the byte pool.
pub struct IntBlockPool {
    pub buffers: Vec<Vec<u32>>,
    pub buffer_upto: isize,
    pub int_upto: usize,
    pub int_offset: isize,
}

impl Default for IntBlockPool {
    fn default() -> Self {
        IntBlockPool {
            buffers: Vec::new(),
            buffer_upto: -1,
            int_upto: INT_BLOCK_SIZE,
            int_offset: -(INT_BLOCK_SIZE as isize),
        }
    }
}

impl IntBlockPool {
    pub fn new() -> Self {
        Default::default()
    }

    /// Resets the pool to its initial state, reusing the first block.
    pub fn reset(&mut self) {
        if self.buffer_upto > -1 {
            fill_slice(&mut self.buffers[0], 0);
            self.buffers.truncate(1);
            self.buffer_upto = 0;
            self.int_upto = 0;
            self.int_offset = 0;
        }
    }

    fn next_buffer(&mut self) {
        let idx = (self.buffer_upto + 1) as usize;
        if idx == self.buffers.len() {
            self.buffers.push(vec![0u32; INT_BLOCK_SIZE]);
        }
        self.buffer_upto += 1;
        self.int_upto = 0;
        self.int_offset += INT_BLOCK_SIZE as isize;
    }

    /// Absolute offset the next [`IntBlockPool::push`] will write to.
    pub fn offset(&self) -> usize {
        (self.int_upto as isize + self.int_offset) as usize
    }

    pub fn push(&mut self, value: u32) {
        if self.int_upto == INT_BLOCK_SIZE {
            self.next_buffer();
        }
        self.buffers[self.buffer_upto as usize][self.int_upto] = value;
        self.int_upto += 1;
    }

    pub fn get(&self, offset: usize) -> u32 {
        self.buffers[offset >> INT_BLOCK_SHIFT][offset & INT_BLOCK_MASK]
    }

    pub fn set(&mut self, offset: usize, value: u32) {
        self.buffers[offset >> INT_BLOCK_SHIFT][offset & INT_BLOCK_MASK] = value;
    }
}
