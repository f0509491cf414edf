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

mod sorter;
pub use self::sorter::*;

use crate::core::index::{Features, TermIterator};
use crate::core::store::{DataOutput, Directory};
use crate::core::util::DocId;
use crate::error::Result;

/// Identifier of a column in the column store.
pub type ColumnId = u32;

/// Context handed to the field writer when an in-memory segment is flushed.
pub struct FlushState<'a> {
    pub dir: &'a dyn Directory,
    /// Segment name.
    pub name: String,
    pub doc_count: u32,
    /// Document-id remapping applied while flushing, if the segment is
    /// emitted in an order other than ingestion order.
    pub doc_map: Option<&'a dyn DocMap>,
    /// Union of the feature sets of all flushed fields; filled during flush.
    pub features: Features,
}

impl<'a> FlushState<'a> {
    pub fn new(dir: &'a dyn Directory, name: &str, doc_count: u32) -> Self {
        FlushState {
            dir,
            name: name.to_string(),
            doc_count,
            doc_map: None,
            features: Features::default(),
        }
    }
}

/// Segment-level consumer of the inverted data accumulated for one segment.
/// Implementations own the on-disk format; the core only replays into them.
pub trait FieldWriter {
    fn prepare(&mut self, state: &FlushState<'_>) -> Result<()>;

    /// Consumes the term iterator of one field. Fields arrive in
    /// lexicographic name order.
    fn write(
        &mut self,
        name: &str,
        norm: Option<ColumnId>,
        features: Features,
        terms: &mut TermIterator<'_>,
    ) -> Result<()>;

    fn end(&mut self) -> Result<()>;
}

/// Per-document output stream of one column.
pub trait ColumnOutput {
    /// Positions the column at the given document and returns the sink for
    /// its bytes.
    fn prepare(&mut self, doc: DocId) -> &mut dyn DataOutput;
}

/// Producer of column-store columns; norm values are appended through it.
pub trait ColumnstoreWriter {
    fn push_column(&mut self) -> (ColumnId, Box<dyn ColumnOutput>);
}
