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

//! Multiplexing of a boolean flag into the low bit of an integer, so that
//! the pair encodes as a single variable-length integer.

#[inline]
pub fn shift_pack_32(value: u32, flag: bool) -> u32 {
    (value << 1) | flag as u32
}

#[inline]
pub fn shift_unpack_32(packed: u32) -> (bool, u32) {
    (packed & 1 != 0, packed >> 1)
}

#[inline]
pub fn shift_pack_64(value: u64, flag: bool) -> u64 {
    (value << 1) | flag as u64
}

#[inline]
pub fn shift_unpack_64(packed: u64) -> (bool, u64) {
    (packed & 1 != 0, packed >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_pack_32() {
        assert_eq!(shift_pack_32(0, false), 0);
        assert_eq!(shift_pack_32(0, true), 1);
        assert_eq!(shift_pack_32(5, true), 11);
        assert_eq!(shift_unpack_32(11), (true, 5));
        assert_eq!(shift_unpack_32(10), (false, 5));
    }

    #[test]
    fn test_shift_pack_64() {
        let packed = shift_pack_64(u64::from(::std::u32::MAX), true);
        assert_eq!(shift_unpack_64(packed), (true, u64::from(::std::u32::MAX)));
        let packed = shift_pack_64(42, false);
        assert_eq!(shift_unpack_64(packed), (false, 42));
    }
}
