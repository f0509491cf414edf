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
use crate::core::index::{Features, Posting};
use crate::core::store::DataInput;
use crate::core::util::bit_util::{shift_unpack_32, shift_unpack_64};
use crate::core::util::{doc_limits, pos_limits, ByteSliceReader, DocId};
use crate::error::Result;

/// Decodes the accumulated documents of one term.
///
/// The freq stream holds every document except the most recent one, whose
/// encoded delta is still pending in the posting record; the iterator
/// streams the former and emits the pending pair once the stream is
/// exhausted, which preserves strictly increasing document ids.
pub struct DocIterator<'a> {
    freq_in: ByteSliceReader<'a>,
    pending: Option<(DocId, u32)>,
    doc: DocId,
    freq: u32,
    has_freq: bool,
    pos: Option<PosIterator<'a>>,
}

impl<'a> DocIterator<'a> {
    pub(crate) fn new(
        features: Features,
        posting: &Posting,
        freq_in: ByteSliceReader<'a>,
        prox_in: ByteSliceReader<'a>,
    ) -> Self {
        let has_freq = features.check(Features::FREQUENCY);
        let pos = if has_freq && features.check(Features::POSITION) {
            Some(PosIterator::new(prox_in, features))
        } else {
            None
        };

        DocIterator {
            freq_in,
            pending: Some((posting.doc, posting.freq)),
            doc: doc_limits::INVALID,
            freq: 0,
            has_freq,
            pos,
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        if self.freq_in.eof() {
            match self.pending.take() {
                Some((doc, freq)) => {
                    self.doc = doc;
                    if self.has_freq {
                        self.freq = freq;
                    }
                }
                None => return Ok(false),
            }
        } else if self.has_freq {
            let (freq_is_one, delta) = shift_unpack_64(self.freq_in.read_vlong()?);
            self.freq = if freq_is_one {
                1
            } else {
                self.freq_in.read_vint()?
            };
            debug_assert!(delta < u64::from(doc_limits::EOF));
            self.doc += delta as DocId;
        } else {
            self.doc += self.freq_in.read_vint()?;
        }

        if let Some(ref mut pos) = self.pos {
            pos.begin_doc(self.freq)?;
        }
        Ok(true)
    }

    /// Linear advance until a document `>= target` or exhaustion.
    pub fn seek(&mut self, target: DocId) -> Result<DocId> {
        while self.doc < target {
            if !self.next()? {
                return Ok(doc_limits::EOF);
            }
        }
        Ok(self.doc)
    }

    pub fn doc(&self) -> DocId {
        self.doc
    }

    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// The position iterator for the current document, when positions are
    /// tracked.
    pub fn positions(&mut self) -> Option<&mut PosIterator<'a>> {
        self.pos.as_mut()
    }
}

/// Decodes the per-occurrence data (position, payload, offsets) of one term
/// within the current document of its [`DocIterator`].
pub struct PosIterator<'a> {
    prox_in: ByteSliceReader<'a>,
    freq: u32,
    upto: u32,
    value: u32,
    payload: Vec<u8>,
    offs_start: u32,
    offs_end: u32,
    has_offs: bool,
}

impl<'a> PosIterator<'a> {
    fn new(prox_in: ByteSliceReader<'a>, features: Features) -> Self {
        PosIterator {
            prox_in,
            freq: 0,
            upto: 0,
            value: 0,
            payload: Vec::new(),
            offs_start: 0,
            offs_end: 0,
            has_offs: features.check(Features::OFFSET),
        }
    }

    /// Re-arms the iterator for the next document. Positions left unread in
    /// the previous document are drained so the prox stream stays aligned.
    fn begin_doc(&mut self, freq: u32) -> Result<()> {
        while self.upto < self.freq {
            self.advance()?;
        }
        self.freq = freq;
        self.upto = 0;
        self.value = 0;
        self.offs_start = 0;
        self.offs_end = 0;
        self.payload.clear();
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        let (has_payload, delta) = shift_unpack_32(self.prox_in.read_vint()?);

        self.payload.clear();
        if has_payload {
            let len = self.prox_in.read_vint()? as usize;
            self.payload.resize(len, 0);
            self.prox_in.read_bytes(&mut self.payload)?;
        }

        self.value += delta;

        if self.has_offs {
            self.offs_start += self.prox_in.read_vint()?;
            self.offs_end = self.offs_start + self.prox_in.read_vint()?;
        }

        self.upto += 1;
        Ok(())
    }

    pub fn next(&mut self) -> Result<bool> {
        if self.upto == self.freq {
            self.value = pos_limits::EOF;
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn payload(&self) -> Option<&[u8]> {
        if self.payload.is_empty() {
            None
        } else {
            Some(&self.payload)
        }
    }

    pub fn offsets(&self) -> Option<(u32, u32)> {
        if self.has_offs {
            Some((self.offs_start, self.offs_end))
        } else {
            None
        }
    }
}

/// Replay of one term's documents under a document-id remapping.
///
/// Remapping breaks the delta encoding, so the underlying iterator is fully
/// materialized: dropped documents are filtered out and the survivors are
/// re-sorted by their new ids. Positions are document local and are not
/// replayed through this iterator.
pub struct SortingDocIterator {
    docs: Vec<(DocId, u32)>,
    upto: usize,
    doc: DocId,
    freq: u32,
}

impl SortingDocIterator {
    pub fn new(it: &mut DocIterator<'_>, doc_map: &dyn DocMap) -> Result<Self> {
        let mut docs = Vec::new();
        while it.next()? {
            let doc = doc_map.remap(it.doc());
            if doc_limits::eof(doc) {
                continue;
            }
            docs.push((doc, it.freq()));
        }
        docs.sort_unstable_by_key(|entry| entry.0);

        Ok(SortingDocIterator {
            docs,
            upto: 0,
            doc: doc_limits::INVALID,
            freq: 0,
        })
    }

    pub fn next(&mut self) -> bool {
        if self.upto == self.docs.len() {
            return false;
        }
        let (doc, freq) = self.docs[self.upto];
        self.doc = doc;
        self.freq = freq;
        self.upto += 1;
        true
    }

    pub fn seek(&mut self, target: DocId) -> DocId {
        while self.doc < target {
            if !self.next() {
                return doc_limits::EOF;
            }
        }
        self.doc
    }

    pub fn doc(&self) -> DocId {
        self.doc
    }

    pub fn freq(&self) -> u32 {
        self.freq
    }
}

/// The postings replay of one term as handed to the field writer: either the
/// streaming decoder, or its sorted materialization when the flush carries a
/// document-id remapping.
pub enum Postings<'a> {
    Streamed(DocIterator<'a>),
    Sorted(SortingDocIterator),
}

impl<'a> Postings<'a> {
    pub fn next(&mut self) -> Result<bool> {
        match self {
            Postings::Streamed(it) => it.next(),
            Postings::Sorted(it) => Ok(it.next()),
        }
    }

    pub fn seek(&mut self, target: DocId) -> Result<DocId> {
        match self {
            Postings::Streamed(it) => it.seek(target),
            Postings::Sorted(it) => Ok(it.seek(target)),
        }
    }

    pub fn doc(&self) -> DocId {
        match self {
            Postings::Streamed(it) => it.doc(),
            Postings::Sorted(it) => it.doc(),
        }
    }

    pub fn freq(&self) -> u32 {
        match self {
            Postings::Streamed(it) => it.freq(),
            Postings::Sorted(it) => it.freq(),
        }
    }

    pub fn positions(&mut self) -> Option<&mut PosIterator<'a>> {
        match self {
            Postings::Streamed(it) => it.positions(),
            Postings::Sorted(_) => None,
        }
    }
}
