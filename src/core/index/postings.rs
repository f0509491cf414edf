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

use std::collections::BTreeMap;

use crate::core::util::{doc_limits, ByteBlockPool, BytesRef, DocId, BYTE_BLOCK_SIZE};

/// Terms longer than this cannot be interned (they would not fit one pool
/// block) and are rejected by the dictionary.
pub const MAX_TERM_LEN: usize = BYTE_BLOCK_SIZE - 2;

/// Per-term accumulation state. The four ints at `int_start` in the int pool
/// hold, in order: freq-stream write cursor, prox-stream write cursor,
/// freq-stream begin, prox-stream begin (absolute byte-pool offsets).
pub struct Posting {
    /// Base offset of the term's cursor block in the int pool.
    pub int_start: usize,
    /// Pending encoded doc delta for the most recent document; flushed to
    /// the freq stream only when the term advances to a later document.
    pub doc_code: u64,
    /// Last document id this term was seen in.
    pub doc: DocId,
    /// Term frequency within the current document.
    pub freq: u32,
    /// Last written position within the current document.
    pub pos: u32,
    /// Last written start offset within the current document.
    pub offs: u32,
}

impl Posting {
    fn new() -> Self {
        Posting {
            int_start: 0,
            doc_code: 0,
            doc: doc_limits::INVALID,
            freq: 0,
            pos: 0,
            offs: 0,
        }
    }
}

/// Ordered term dictionary of one field: term bytes to posting, compared as
/// unsigned byte sequences with shorter keys first on ties.
///
/// Key bytes are copied into the byte pool on first emplace; the map only
/// holds references into the pool. The dictionary must be cleared before the
/// pool is reset.
pub struct TermDict {
    map: BTreeMap<BytesRef, usize>,
    postings: Vec<Posting>,
}

impl TermDict {
    pub fn new() -> Self {
        TermDict {
            map: BTreeMap::new(),
            postings: Vec::new(),
        }
    }

    /// Returns the posting index for `term`, interning the term on first
    /// sight; the flag is `true` for a fresh term. `None` means the term
    /// cannot be interned (degenerate length) and must be skipped.
    pub fn emplace(&mut self, term: &[u8], pool: &mut ByteBlockPool) -> Option<(usize, bool)> {
        if let Some(&index) = self.map.get(&BytesRef::new(term)) {
            return Some((index, false));
        }
        if term.len() > MAX_TERM_LEN {
            return None;
        }

        let offset = pool.add_bytes(term);
        let stored = BytesRef::new(pool.bytes_at(offset, term.len()));
        let index = self.postings.len();
        self.postings.push(Posting::new());
        self.map.insert(stored, index);
        Some((index, true))
    }

    pub fn posting(&self, index: usize) -> &Posting {
        &self.postings[index]
    }

    pub fn posting_mut(&mut self, index: usize) -> &mut Posting {
        &mut self.postings[index]
    }

    /// Terms in sorted order with their postings.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Posting)> {
        self.map
            .iter()
            .map(move |(term, &index)| (term.bytes(), &self.postings[index]))
    }

    pub fn min_term(&self) -> Option<&[u8]> {
        self.map.keys().next().map(BytesRef::bytes)
    }

    pub fn max_term(&self) -> Option<&[u8]> {
        self.map.keys().next_back().map(BytesRef::bytes)
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emplace_interns_once() {
        let mut pool = ByteBlockPool::new();
        let mut dict = TermDict::new();

        let (a, fresh) = dict.emplace(b"apple", &mut pool).unwrap();
        assert!(fresh);
        let (a2, fresh) = dict.emplace(b"apple", &mut pool).unwrap();
        assert!(!fresh);
        assert_eq!(a, a2);

        let (b, fresh) = dict.emplace(b"pear", &mut pool).unwrap();
        assert!(fresh);
        assert_ne!(a, b);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut pool = ByteBlockPool::new();
        let mut dict = TermDict::new();
        for term in &[&b"pear"[..], b"apple", b"ap", b"b"] {
            dict.emplace(term, &mut pool).unwrap();
        }

        let terms: Vec<&[u8]> = dict.iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec![&b"ap"[..], b"apple", b"b", b"pear"]);
        assert_eq!(dict.min_term(), Some(&b"ap"[..]));
        assert_eq!(dict.max_term(), Some(&b"pear"[..]));
    }

    #[test]
    fn test_degenerate_term_is_rejected() {
        let mut pool = ByteBlockPool::new();
        let mut dict = TermDict::new();
        let huge = vec![7u8; MAX_TERM_LEN + 1];
        assert!(dict.emplace(&huge, &mut pool).is_none());
        assert!(dict.is_empty());
    }
}
