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

mod doc_iterator;
pub use self::doc_iterator::*;

mod field_data;
pub use self::field_data::*;

mod field_meta;
pub use self::field_meta::*;

mod postings;
pub use self::postings::*;

mod term_iterator;
pub use self::term_iterator::*;
