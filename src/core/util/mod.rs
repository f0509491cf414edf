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

pub mod bit_util;

mod byte_block_pool;
pub use self::byte_block_pool::*;

mod byte_ref;
pub use self::byte_ref::*;

mod byte_slice_reader;
pub use self::byte_slice_reader::*;

mod int_block_pool;
pub use self::int_block_pool::*;

/// Document id. `0` is reserved as the invalid id, `u32::MAX` is the EOF
/// sentinel; valid ids start at [`doc_limits::MIN`].
pub type DocId = u32;

/// Limits and sentinels for document ids.
pub mod doc_limits {
    use super::DocId;

    pub const INVALID: DocId = 0;
    pub const MIN: DocId = 1;
    pub const EOF: DocId = ::std::u32::MAX;

    #[inline]
    pub fn valid(doc: DocId) -> bool {
        doc != INVALID
    }

    #[inline]
    pub fn eof(doc: DocId) -> bool {
        doc == EOF
    }
}

/// Limits and sentinels for token positions. The last valid position is
/// `u32::MAX - 1`.
pub mod pos_limits {
    pub const INVALID: u32 = ::std::u32::MAX;
    pub const EOF: u32 = ::std::u32::MAX;
}

pub fn fill_slice<T: Copy>(array: &mut [T], value: T) {
    for i in array {
        *i = value;
    }
}
