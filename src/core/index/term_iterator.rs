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

use crate::core::codec::DocMap;
use crate::core::index::{
    DocIterator, Features, FieldData, Posting, Postings, SortingDocIterator,
};
use crate::core::util::{ByteBlockPool, ByteSliceReader, IntBlockPool};
use crate::error::Result;

/// Walks the term dictionary of one field in sorted order and materializes
/// the postings replay of the current term on demand.
pub struct TermIterator<'a> {
    entries: Vec<(&'a [u8], &'a Posting)>,
    features: Features,
    byte_pool: &'a ByteBlockPool,
    int_pool: &'a IntBlockPool,
    doc_map: Option<&'a dyn DocMap>,
    upto: usize,
}

impl<'a> TermIterator<'a> {
    pub fn new(field: &'a FieldData, doc_map: Option<&'a dyn DocMap>) -> Self {
        TermIterator {
            entries: field.terms().iter().collect(),
            features: field.meta().features(),
            byte_pool: field.byte_pool(),
            int_pool: field.int_pool(),
            doc_map,
            upto: 0,
        }
    }

    /// Smallest term of the field, `None` when the field is empty.
    pub fn min(&self) -> Option<&'a [u8]> {
        self.entries.first().map(|entry| entry.0)
    }

    /// Largest term of the field, `None` when the field is empty.
    pub fn max(&self) -> Option<&'a [u8]> {
        self.entries.last().map(|entry| entry.0)
    }

    pub fn next(&mut self) -> bool {
        if self.upto <= self.entries.len() {
            self.upto += 1;
        }
        self.upto <= self.entries.len()
    }

    /// The current term, `None` before the first `next` or after exhaustion.
    pub fn term(&self) -> Option<&'a [u8]> {
        if self.upto >= 1 && self.upto <= self.entries.len() {
            Some(self.entries[self.upto - 1].0)
        } else {
            None
        }
    }

    /// A fresh postings replay for the current term, built from the four
    /// stream cursors recorded at the term's int-pool block.
    pub fn postings(&self) -> Result<Postings<'a>> {
        debug_assert!(self.upto >= 1 && self.upto <= self.entries.len());
        let posting = self.entries[self.upto - 1].1;

        let freq_end = self.int_pool.get(posting.int_start) as usize;
        let prox_end = self.int_pool.get(posting.int_start + 1) as usize;
        let freq_begin = self.int_pool.get(posting.int_start + 2) as usize;
        let prox_begin = self.int_pool.get(posting.int_start + 3) as usize;

        let freq_in = ByteSliceReader::new(self.byte_pool, freq_begin, freq_end);
        let prox_in = ByteSliceReader::new(self.byte_pool, prox_begin, prox_end);

        let mut it = DocIterator::new(self.features, posting, freq_in, prox_in);
        match self.doc_map {
            Some(doc_map) => Ok(Postings::Sorted(SortingDocIterator::new(&mut it, doc_map)?)),
            None => Ok(Postings::Streamed(it)),
        }
    }
}
