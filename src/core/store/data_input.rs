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

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{ErrorKind, Result};

/// Read operations for the low-level data types of the index; the strict
/// inverse of [`DataOutput`](crate::core::store::DataOutput).
pub trait DataInput: Read {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_exact(buf)?;
        Ok(())
    }

    fn read_vint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let b = self.read_byte()?;
            if shift == 28 && b & 0xf0 != 0 {
                bail!(ErrorKind::IllegalState("invalid vint detected".into()));
            }
            value |= u32::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                bail!(ErrorKind::IllegalState("invalid vint detected".into()));
            }
        }
    }

    fn read_vlong(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let b = self.read_byte()?;
            if shift == 63 && b & 0xfe != 0 {
                bail!(ErrorKind::IllegalState("invalid vlong detected".into()));
            }
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                bail!(ErrorKind::IllegalState("invalid vlong detected".into()));
            }
        }
    }

    fn read_int(&mut self) -> Result<u32> {
        Ok(self.read_u32::<BigEndian>()?)
    }

    fn read_long(&mut self) -> Result<u64> {
        Ok(self.read_u64::<BigEndian>()?)
    }
}

impl<'a> DataInput for &'a [u8] {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::DataOutput;

    #[test]
    fn test_vint_roundtrip() {
        let values = [0u32, 1, 127, 128, 300, 16383, 16384, ::std::u32::MAX];
        let mut out: Vec<u8> = vec![];
        for v in &values {
            out.write_vint(*v).unwrap();
        }
        let mut input: &[u8] = &out;
        for v in &values {
            assert_eq!(input.read_vint().unwrap(), *v);
        }
    }

    #[test]
    fn test_vlong_roundtrip() {
        let values = [
            0u64,
            127,
            128,
            1 << 35,
            ::std::u64::MAX - 1,
            ::std::u64::MAX,
        ];
        let mut out: Vec<u8> = vec![];
        for v in &values {
            out.write_vlong(*v).unwrap();
        }
        let mut input: &[u8] = &out;
        for v in &values {
            assert_eq!(input.read_vlong().unwrap(), *v);
        }
    }

    #[test]
    fn test_overlong_vint_is_rejected() {
        let bytes = [0xffu8, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut input: &[u8] = &bytes;
        assert!(input.read_vint().is_err());
    }
}
