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

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::Result;

/// Write operations for the low-level data types of the index.
pub trait DataOutput: Write {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_all(&[b])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }

    /// Variable-length unsigned 32-bit integer: seven bits per byte, low
    /// septet first, high bit set on continuation bytes.
    fn write_vint(&mut self, value: u32) -> Result<()> {
        let mut v = value;
        while v & !0x7f != 0 {
            self.write_byte(((v & 0x7f) | 0x80) as u8)?;
            v >>= 7;
        }
        self.write_byte(v as u8)
    }

    /// Variable-length unsigned 64-bit integer.
    fn write_vlong(&mut self, value: u64) -> Result<()> {
        let mut v = value;
        while v & !0x7f != 0 {
            self.write_byte(((v & 0x7f) | 0x80) as u8)?;
            v >>= 7;
        }
        self.write_byte(v as u8)
    }

    fn write_int(&mut self, value: u32) -> Result<()> {
        self.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    fn write_long(&mut self, value: u64) -> Result<()> {
        self.write_u64::<BigEndian>(value)?;
        Ok(())
    }
}

impl DataOutput for Vec<u8> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vint_encoding() {
        let mut out: Vec<u8> = vec![];
        out.write_vint(0).unwrap();
        out.write_vint(127).unwrap();
        out.write_vint(128).unwrap();
        out.write_vint(16384).unwrap();
        assert_eq!(out, vec![0, 0x7f, 0x80, 0x01, 0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_vlong_max_uses_ten_bytes() {
        let mut out: Vec<u8> = vec![];
        out.write_vlong(::std::u64::MAX).unwrap();
        assert_eq!(out.len(), 10);
    }
}
