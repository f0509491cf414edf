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

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::core::codec::ColumnId;

/// The feature set of a field: which per-posting attributes the field
/// tracks. Tracking positions requires tracking frequencies; the payload
/// feature is added automatically once a payload is observed.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Features(u32);

impl Features {
    pub const FREQUENCY: Features = Features(1);
    pub const POSITION: Features = Features(1 << 1);
    pub const OFFSET: Features = Features(1 << 2);
    pub const PAYLOAD: Features = Features(1 << 3);
    pub const NORM: Features = Features(1 << 4);

    pub fn empty() -> Features {
        Features(0)
    }

    /// True if every feature in `features` is present in `self`.
    pub fn check(self, features: Features) -> bool {
        self.0 & features.0 == features.0
    }

    pub fn add(&mut self, features: Features) {
        self.0 |= features.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl BitOrAssign for Features {
    fn bitor_assign(&mut self, rhs: Features) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut list = f.debug_list();
        for (bit, name) in &[
            (Features::FREQUENCY, "frequency"),
            (Features::POSITION, "position"),
            (Features::OFFSET, "offset"),
            (Features::PAYLOAD, "payload"),
            (Features::NORM, "norm"),
        ] {
            if self.check(*bit) {
                list.entry(name);
            }
        }
        list.finish()
    }
}

/// Name, accumulated feature set and norm-column handle of one field.
pub struct FieldMeta {
    name: String,
    features: Features,
    norm: Option<ColumnId>,
}

impl FieldMeta {
    pub fn new(name: &str) -> Self {
        FieldMeta {
            name: name.to_string(),
            features: Features::empty(),
            norm: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    pub fn norm(&self) -> Option<ColumnId> {
        self.norm
    }

    pub(crate) fn set_norm(&mut self, norm: ColumnId) {
        self.norm = Some(norm);
    }
}
