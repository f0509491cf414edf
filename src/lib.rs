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

//! In-memory inverted index builder.
//!
//! The crate accumulates per-term posting streams (document ids, term
//! frequencies, positions, offsets, payloads) for the fields of an in-memory
//! segment into pooled byte buffers, and replays them in sorted term order to
//! a segment-level field writer on flush.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub mod core;
pub mod error;
