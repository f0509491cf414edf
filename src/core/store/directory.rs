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

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::mem;
use std::sync::{Arc, RwLock};

use crate::core::store::{DataInput, DataOutput};
use crate::error::{ErrorKind, Result};

/// Output stream backing one directory file.
pub trait IndexOutput: DataOutput {
    /// Makes the written content visible to the directory; the output must
    /// not be used afterwards.
    fn close(&mut self) -> Result<()>;
}

/// Input stream over one directory file.
pub trait IndexInput: DataInput {
    fn len(&self) -> u64;
}

/// A flat directory of write-once/read-many files. The core only consumes
/// this interface; persistence formats are the field writer's concern.
pub trait Directory {
    fn list(&self) -> Result<Vec<String>>;

    fn exists(&self, name: &str) -> Result<bool>;

    fn length(&self, name: &str) -> Result<u64>;

    fn create(&self, name: &str) -> Result<Box<dyn IndexOutput>>;

    fn open(&self, name: &str) -> Result<Box<dyn IndexInput>>;

    fn remove(&self, name: &str) -> Result<()>;

    fn rename(&self, src: &str, dst: &str) -> Result<()>;

    /// Ensures all modifications to the file have been persisted.
    fn sync(&self, name: &str) -> Result<()>;
}

type FileMap = Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>;

/// A heap-backed [`Directory`].
#[derive(Default)]
pub struct RamDirectory {
    files: FileMap,
}

impl RamDirectory {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Directory for RamDirectory {
    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.files.read()?.contains_key(name))
    }

    fn length(&self, name: &str) -> Result<u64> {
        match self.files.read()?.get(name) {
            Some(data) => Ok(data.len() as u64),
            None => bail!(ErrorKind::IllegalArgument(format!("no such file: {}", name))),
        }
    }

    fn create(&self, name: &str) -> Result<Box<dyn IndexOutput>> {
        Ok(Box::new(RamOutput {
            name: name.to_string(),
            files: Arc::clone(&self.files),
            data: Vec::new(),
        }))
    }

    fn open(&self, name: &str) -> Result<Box<dyn IndexInput>> {
        match self.files.read()?.get(name) {
            Some(data) => Ok(Box::new(RamInput {
                data: Arc::clone(data),
                position: 0,
            })),
            None => bail!(ErrorKind::IllegalArgument(format!("no such file: {}", name))),
        }
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.files.write()?.remove(name);
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let mut files = self.files.write()?;
        match files.remove(src) {
            Some(data) => {
                files.insert(dst.to_string(), data);
                Ok(())
            }
            None => bail!(ErrorKind::IllegalArgument(format!("no such file: {}", src))),
        }
    }

    fn sync(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

struct RamOutput {
    name: String,
    files: FileMap,
    data: Vec<u8>,
}

impl Write for RamOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DataOutput for RamOutput {}

impl IndexOutput for RamOutput {
    fn close(&mut self) -> Result<()> {
        let data = mem::replace(&mut self.data, Vec::new());
        self.files
            .write()?
            .insert(self.name.clone(), Arc::new(data));
        Ok(())
    }
}

struct RamInput {
    data: Arc<Vec<u8>>,
    position: usize,
}

impl Read for RamInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.position;
        let count = remaining.min(buf.len());
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl DataInput for RamInput {}

impl IndexInput for RamInput {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }
}
