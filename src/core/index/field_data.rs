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

use std::cmp;
use std::collections::HashMap;

use crate::core::analysis::TokenStream;
use crate::core::codec::{ColumnOutput, ColumnstoreWriter, FieldWriter, FlushState};
use crate::core::index::{Features, FieldMeta, TermDict, TermIterator};
use crate::core::store::DataOutput;
use crate::core::util::bit_util::shift_pack_32;
use crate::core::util::{doc_limits, pos_limits, ByteBlockPool, DocId, IntBlockPool, SliceWriter};
use crate::error::{Error, ErrorKind, Result};

/// Configuration of an in-memory segment.
#[derive(Clone, Copy, Default)]
pub struct InvertOptions {
    /// Carry token offsets of a field in one cumulative coordinate space
    /// across documents instead of restarting at zero for every document.
    pub cumulative_offsets: bool,
}

fn invert_error(msg: String) -> Error {
    error!("{}", msg);
    ErrorKind::IllegalArgument(msg).into()
}

/// Per-field accumulator: drives one document at a time through a token
/// stream and appends the encoded postings of every term to the term's freq
/// and prox streams in the shared byte pool.
pub struct FieldData {
    meta: FieldMeta,
    terms: TermDict,
    // The pools are owned (boxed) by the enclosing `FieldsData`, so these
    // stay valid for the accumulator's whole lifetime.
    byte_pool: *mut ByteBlockPool,
    int_pool: *mut IntBlockPool,
    norm_out: Option<Box<dyn ColumnOutput>>,
    last_doc: DocId,
    pos: u32,
    last_pos: u32,
    len: u32,
    num_overlap: u32,
    offs_base: u32,
    last_start_offs: u32,
    max_term_freq: u32,
    unq_term_cnt: u32,
    cumulative_offsets: bool,
}

impl FieldData {
    fn new(
        name: &str,
        byte_pool: *mut ByteBlockPool,
        int_pool: *mut IntBlockPool,
        cumulative_offsets: bool,
    ) -> Self {
        FieldData {
            meta: FieldMeta::new(name),
            terms: TermDict::new(),
            byte_pool,
            int_pool,
            norm_out: None,
            last_doc: doc_limits::INVALID,
            pos: 0,
            last_pos: 0,
            len: 0,
            num_overlap: 0,
            offs_base: 0,
            last_start_offs: 0,
            max_term_freq: 0,
            unq_term_cnt: 0,
            cumulative_offsets,
        }
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// The document currently being accumulated.
    pub fn doc(&self) -> DocId {
        self.last_doc
    }

    /// Token count of the current document.
    pub fn length(&self) -> u32 {
        self.len
    }

    /// Number of zero-increment tokens of the current document.
    pub fn num_overlap(&self) -> u32 {
        self.num_overlap
    }

    /// Largest in-document term frequency seen for the current document.
    pub fn max_term_freq(&self) -> u32 {
        self.max_term_freq
    }

    /// Number of distinct terms of the current document.
    pub fn unique_term_count(&self) -> u32 {
        self.unq_term_cnt
    }

    pub(crate) fn terms(&self) -> &TermDict {
        &self.terms
    }

    pub(crate) fn byte_pool(&self) -> &ByteBlockPool {
        unsafe { &*self.byte_pool }
    }

    pub(crate) fn int_pool(&self) -> &IntBlockPool {
        unsafe { &*self.int_pool }
    }

    /// Begins a new document for this field; calling it again with the same
    /// id is a no-op, so multi-valued fields keep accumulating positions and
    /// offsets across values of one document.
    pub fn reset(&mut self, doc: DocId) {
        debug_assert!(doc_limits::valid(doc));

        if doc == self.last_doc {
            return;
        }

        // All-ones sentinel: the first non-zero increment wraps to
        // `increment - 1`, so the expected first position comes out without
        // a special case.
        self.pos = pos_limits::INVALID;
        self.last_pos = 0;
        self.len = 0;
        self.num_overlap = 0;
        if !self.cumulative_offsets {
            self.offs_base = 0;
        }
        self.last_start_offs = 0;
        self.max_term_freq = 0;
        self.unq_term_cnt = 0;
        self.last_doc = doc;
    }

    /// The per-document output for this field's norm value, lazily pushing
    /// the norm column on first use.
    pub fn norms(&mut self, writer: &mut dyn ColumnstoreWriter) -> &mut dyn DataOutput {
        let meta = &mut self.meta;
        let out = self.norm_out.get_or_insert_with(|| {
            let (column, out) = writer.push_column();
            meta.set_norm(column);
            out
        });
        out.prepare(self.last_doc)
    }

    /// Drives `stream` to exhaustion, accumulating postings for `doc`.
    ///
    /// On failure the field's state for this document is partially mutated;
    /// the caller must discard the document.
    pub fn invert(
        &mut self,
        stream: &mut dyn TokenStream,
        features: Features,
        doc: DocId,
    ) -> Result<()> {
        debug_assert!(doc < doc_limits::EOF);

        self.meta.features_mut().add(features);

        if !stream.has_increments() {
            return Err(invert_error(format!(
                "field '{}' missing required token stream attribute 'increment'",
                self.meta.name()
            )));
        }

        if !stream.has_terms() {
            return Err(invert_error(format!(
                "field '{}' missing required token stream attribute 'term'",
                self.meta.name()
            )));
        }

        let tracked = self.meta.features();
        if tracked.check(Features::POSITION) && !tracked.check(Features::FREQUENCY) {
            return Err(invert_error(format!(
                "field '{}' tracks positions without frequency",
                self.meta.name()
            )));
        }

        let track_offs = tracked.check(Features::OFFSET) && stream.has_offsets();
        let track_prox = tracked.check(Features::POSITION);

        self.reset(doc);

        let mut final_offs_end = 0u32;

        while stream.next_token()? {
            let token = stream.token();
            let increment = token.increment;

            self.pos = self.pos.wrapping_add(increment);
            if increment == 0 {
                self.num_overlap += 1;
                if self.len == 0 && self.pos == pos_limits::INVALID {
                    // Overlap on the very first token of the document; the
                    // position baseline is zero.
                    self.pos = 0;
                }
            }

            if self.pos < self.last_pos {
                return Err(invert_error(format!(
                    "invalid position {} < {} in field '{}'",
                    self.pos,
                    self.last_pos,
                    self.meta.name()
                )));
            }

            if self.pos >= pos_limits::EOF {
                return Err(invert_error(format!(
                    "invalid position {} >= {} in field '{}'",
                    self.pos,
                    pos_limits::EOF,
                    self.meta.name()
                )));
            }

            let offs = if track_offs {
                let start_offset = self.offs_base.wrapping_add(token.start_offset);
                let end_offset = self.offs_base.wrapping_add(token.end_offset);

                if start_offset < self.last_start_offs || end_offset < start_offset {
                    return Err(invert_error(format!(
                        "invalid offset start={} end={} in field '{}'",
                        start_offset,
                        end_offset,
                        self.meta.name()
                    )));
                }

                self.last_start_offs = start_offset;
                final_offs_end = token.end_offset;
                Some((token.start_offset, token.end_offset))
            } else {
                None
            };

            let payload = if track_prox && !token.payload.is_empty() {
                Some(token.payload.as_slice())
            } else {
                None
            };

            let emplaced = {
                let pool = unsafe { &mut *self.byte_pool };
                self.terms.emplace(&token.term, pool)
            };

            match emplaced {
                None => {
                    error!(
                        "field '{}' has invalid term of {} bytes",
                        self.meta.name(),
                        token.term.len()
                    );
                    continue;
                }
                Some((index, true)) => self.new_term(index, doc, payload, offs)?,
                Some((index, false)) => self.add_term(index, doc, payload, offs)?,
            }

            self.len = self.len.wrapping_add(1);
            if self.len == 0 {
                return Err(invert_error(format!(
                    "too many tokens in field '{}', document '{}'",
                    self.meta.name(),
                    doc
                )));
            }

            self.last_pos = self.pos;
        }

        if track_offs {
            self.offs_base = self.offs_base.wrapping_add(final_offs_end);
        }

        Ok(())
    }

    /// First occurrence of a term in the segment: reserve the four cursor
    /// ints, mint the two stream head slices and stash the pending doc code.
    fn new_term(
        &mut self,
        index: usize,
        doc: DocId,
        payload: Option<&[u8]>,
        offs: Option<(u32, u32)>,
    ) -> Result<()> {
        let int_start = {
            let byte_pool = unsafe { &mut *self.byte_pool };
            let int_pool = unsafe { &mut *self.int_pool };

            let int_start = int_pool.offset();
            let freq_start = byte_pool.alloc_slice() as u32;
            let prox_start = byte_pool.alloc_slice() as u32;
            int_pool.push(freq_start); // freq stream write cursor
            int_pool.push(prox_start); // prox stream write cursor
            int_pool.push(freq_start); // freq stream begin
            int_pool.push(prox_start); // prox stream begin
            int_start
        };

        let features = self.meta.features();
        {
            let posting = self.terms.posting_mut(index);
            posting.int_start = int_start;
            posting.doc = doc;
            if !features.check(Features::FREQUENCY) {
                posting.doc_code = u64::from(doc);
            } else {
                posting.doc_code = u64::from(doc) << 1;
                posting.freq = 1;
            }
        }

        if features.check(Features::FREQUENCY) && features.check(Features::POSITION) {
            let pos = self.pos;
            self.write_prox(index, pos, payload)?;
            if features.check(Features::OFFSET) {
                if let Some(offs) = offs {
                    self.write_offset(index, offs)?;
                }
            }
        }

        self.max_term_freq = cmp::max(1, self.max_term_freq);
        self.unq_term_cnt += 1;
        Ok(())
    }

    /// Subsequent occurrence of a known term: flush the pending doc code
    /// when the term advances to a later document, otherwise extend the
    /// current document's record.
    fn add_term(
        &mut self,
        index: usize,
        doc: DocId,
        payload: Option<&[u8]>,
        offs: Option<(u32, u32)>,
    ) -> Result<()> {
        let features = self.meta.features();

        if !features.check(Features::FREQUENCY) {
            let (last_doc, doc_code, int_start) = {
                let posting = self.terms.posting(index);
                (posting.doc, posting.doc_code, posting.int_start)
            };
            if last_doc != doc {
                debug_assert!(doc > last_doc);

                let byte_pool = unsafe { &mut *self.byte_pool };
                let int_pool = unsafe { &mut *self.int_pool };
                let mut out = SliceWriter::new(byte_pool, int_pool.get(int_start) as usize);
                out.write_vint(doc_code as u32)?;
                int_pool.set(int_start, out.pool_offset() as u32);

                let posting = self.terms.posting_mut(index);
                posting.doc_code = u64::from(doc - last_doc);
                posting.doc = doc;
                self.unq_term_cnt += 1;
            }
            return Ok(());
        }

        let (last_doc, doc_code, freq, int_start) = {
            let posting = self.terms.posting(index);
            (posting.doc, posting.doc_code, posting.freq, posting.int_start)
        };

        if last_doc != doc {
            debug_assert!(doc > last_doc);

            // The previous document's frequency is final now; flush it
            // together with the pending doc code.
            {
                let byte_pool = unsafe { &mut *self.byte_pool };
                let int_pool = unsafe { &mut *self.int_pool };
                let mut out = SliceWriter::new(byte_pool, int_pool.get(int_start) as usize);
                if freq == 1 {
                    out.write_vlong(doc_code | 1)?;
                } else {
                    out.write_vlong(doc_code)?;
                    out.write_vint(freq)?;
                }
                int_pool.set(int_start, out.pool_offset() as u32);
            }

            {
                let posting = self.terms.posting_mut(index);
                posting.doc_code = u64::from(doc - last_doc) << 1;
                posting.freq = 1;
                posting.doc = doc;
            }

            self.max_term_freq = cmp::max(1, self.max_term_freq);
            self.unq_term_cnt += 1;

            if features.check(Features::POSITION) {
                let pos = self.pos;
                self.write_prox(index, pos, payload)?;
                if features.check(Features::OFFSET) {
                    self.terms.posting_mut(index).offs = 0;
                    if let Some(offs) = offs {
                        self.write_offset(index, offs)?;
                    }
                }
            }
        } else {
            let freq = {
                let posting = self.terms.posting_mut(index);
                posting.freq += 1;
                posting.freq
            };
            self.max_term_freq = cmp::max(freq, self.max_term_freq);

            if features.check(Features::POSITION) {
                let delta = self.pos - self.terms.posting(index).pos;
                self.write_prox(index, delta, payload)?;
                if features.check(Features::OFFSET) {
                    if let Some(offs) = offs {
                        self.write_offset(index, offs)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn write_prox(&mut self, index: usize, prox: u32, payload: Option<&[u8]>) -> Result<()> {
        let slot = self.terms.posting(index).int_start + 1;
        let byte_pool = unsafe { &mut *self.byte_pool };
        let int_pool = unsafe { &mut *self.int_pool };

        let mut out = SliceWriter::new(byte_pool, int_pool.get(slot) as usize);
        match payload {
            None => out.write_vint(shift_pack_32(prox, false))?,
            Some(payload) => {
                out.write_vint(shift_pack_32(prox, true))?;
                out.write_vint(payload.len() as u32)?;
                out.write_bytes(payload)?;
                self.meta.features_mut().add(Features::PAYLOAD);
            }
        }
        int_pool.set(slot, out.pool_offset() as u32);

        self.terms.posting_mut(index).pos = self.pos;
        Ok(())
    }

    fn write_offset(&mut self, index: usize, offs: (u32, u32)) -> Result<()> {
        let start_offset = self.offs_base.wrapping_add(offs.0);
        let end_offset = self.offs_base.wrapping_add(offs.1);

        let (slot, last_start) = {
            let posting = self.terms.posting(index);
            (posting.int_start + 1, posting.offs)
        };
        debug_assert!(start_offset >= last_start);

        let byte_pool = unsafe { &mut *self.byte_pool };
        let int_pool = unsafe { &mut *self.int_pool };

        let mut out = SliceWriter::new(byte_pool, int_pool.get(slot) as usize);
        out.write_vint(start_offset - last_start)?;
        out.write_vint(end_offset - start_offset)?;
        int_pool.set(slot, out.pool_offset() as u32);

        self.terms.posting_mut(index).offs = start_offset;
        Ok(())
    }
}

/// The in-memory segment under construction: owns the byte and int pools and
/// the accumulators of every field mentioned so far, and replays everything
/// to a field writer on flush.
pub struct FieldsData {
    // Boxed so the accumulators' pool pointers survive moves of the set.
    byte_pool: Box<ByteBlockPool>,
    int_pool: Box<IntBlockPool>,
    fields: HashMap<String, FieldData>,
    options: InvertOptions,
}

impl Default for FieldsData {
    fn default() -> Self {
        Self::with_options(InvertOptions::default())
    }
}

impl FieldsData {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_options(options: InvertOptions) -> Self {
        FieldsData {
            byte_pool: Box::new(ByteBlockPool::new()),
            int_pool: Box::new(IntBlockPool::new()),
            fields: HashMap::new(),
            options,
        }
    }

    /// The accumulator for `name`, created on first mention.
    pub fn field(&mut self, name: &str) -> &mut FieldData {
        let byte_pool: *mut ByteBlockPool = &mut *self.byte_pool;
        let int_pool: *mut IntBlockPool = &mut *self.int_pool;
        let cumulative_offsets = self.options.cumulative_offsets;
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| FieldData::new(name, byte_pool, int_pool, cumulative_offsets))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replays all fields in lexicographic name order into `writer`,
    /// remapping document ids through `state.doc_map` when present.
    pub fn flush<W: FieldWriter>(&mut self, writer: &mut W, state: &mut FlushState<'_>) -> Result<()> {
        let mut fields: Vec<&FieldData> = self.fields.values().collect();
        fields.sort_by(|lhs, rhs| lhs.meta().name().cmp(rhs.meta().name()));

        let mut features = Features::empty();
        for field in &fields {
            features.add(field.meta().features());
        }
        state.features = features;

        writer.prepare(state)?;

        let doc_map = state.doc_map;
        for field in fields {
            let mut terms = TermIterator::new(field, doc_map);
            writer.write(
                field.meta().name(),
                field.meta().norm(),
                field.meta().features(),
                &mut terms,
            )?;
        }

        writer.end()
    }

    /// Clears the field set and resets both pools; the next ingestion starts
    /// from a blank segment.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.byte_pool.reset();
        self.int_pool.reset();
    }
}
