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

use crate::core::util::{doc_limits, DocId};

/// A remapping of document ids applied while a segment is flushed.
///
/// [`DocMap::remap`] answers the new id of a document ingested under `old`;
/// [`doc_limits::EOF`] means the document was dropped.
pub trait DocMap {
    fn remap(&self, old: DocId) -> DocId;
}

/// Dense remap table indexed by `old - doc_limits::MIN`. Ids absent from the
/// table are treated as dropped.
impl DocMap for Vec<DocId> {
    fn remap(&self, old: DocId) -> DocId {
        debug_assert!(doc_limits::valid(old));
        self.get((old - doc_limits::MIN) as usize)
            .cloned()
            .unwrap_or(doc_limits::EOF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_doc_map() {
        let map: Vec<DocId> = vec![2, doc_limits::EOF, 1];
        assert_eq!(map.remap(1), 2);
        assert_eq!(map.remap(2), doc_limits::EOF);
        assert_eq!(map.remap(3), 1);
        assert_eq!(map.remap(4), doc_limits::EOF);
    }
}
