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

use crate::core::analysis::{Token, TokenStream};
use crate::error::Result;

/// Replays a prepared sequence of tokens. Analysis proper happens outside
/// this crate; embedders and tests drive inversion through canned streams.
#[derive(Debug, Default)]
pub struct CannedTokenStream {
    tokens: Vec<Token>,
    current: Token,
    upto: usize,
}

impl CannedTokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        CannedTokenStream {
            tokens,
            current: Token::new(),
            upto: 0,
        }
    }
}

impl TokenStream for CannedTokenStream {
    fn reset(&mut self) -> Result<()> {
        self.upto = 0;
        Ok(())
    }

    fn next_token(&mut self) -> Result<bool> {
        if self.upto == self.tokens.len() {
            return Ok(false);
        }
        self.current = self.tokens[self.upto].clone();
        self.upto += 1;
        Ok(true)
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }
}
