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

mod token_stream;
pub use self::token_stream::*;

use crate::error::Result;

/// The attributes of one token produced by an analysis chain.
#[derive(Debug, Clone)]
pub struct Token {
    /// The term bytes.
    pub term: Vec<u8>,
    /// Position increment relative to the previous token. Zero means the
    /// token overlaps with the previous position (e.g. multiple stems of one
    /// word).
    pub increment: u32,
    /// Start character offset, document local.
    pub start_offset: u32,
    /// End character offset, document local; `end_offset >= start_offset`.
    pub end_offset: u32,
    /// Per-position payload; empty means no payload.
    pub payload: Vec<u8>,
}

impl Token {
    pub fn new() -> Token {
        Token {
            term: Vec::new(),
            increment: 1,
            start_offset: 0,
            end_offset: 0,
            payload: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.term.clear();
        self.increment = 1;
        self.start_offset = 0;
        self.end_offset = 0;
        self.payload.clear();
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::new()
    }
}

/// A cursor over the token sequence of one field value.
///
/// The consumer calls `reset`, then `next_token` until it returns `false`,
/// reading the attributes through `token` after each successful call.
pub trait TokenStream {
    fn reset(&mut self) -> Result<()>;

    fn next_token(&mut self) -> Result<bool>;

    fn token(&self) -> &Token;

    fn token_mut(&mut self) -> &mut Token;

    /// Whether the stream reports term bytes. Term bytes are required for
    /// inversion; a stream answering `false` fails the document.
    fn has_terms(&self) -> bool {
        true
    }

    /// Whether the stream reports position increments; required for
    /// inversion.
    fn has_increments(&self) -> bool {
        true
    }

    /// Whether the stream reports character offsets; required once the
    /// field's feature set tracks offsets.
    fn has_offsets(&self) -> bool {
        true
    }
}
