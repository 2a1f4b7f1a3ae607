// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::SessionStore;
use allot_domain::{AllotmentItem, Cadence};
use std::collections::BTreeMap;

/// A plain map standing in for the browser session store.
#[derive(Debug, Default, Clone)]
pub struct MapStore {
    entries: BTreeMap<String, String>,
}

impl MapStore {
    pub fn raw(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }
}

impl SessionStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

pub fn item(kind: &str, quota: u32, cadence: Cadence, multiplier: u32) -> AllotmentItem {
    AllotmentItem::new(String::from(kind), quota, cadence, multiplier)
}

pub fn base_items() -> Vec<AllotmentItem> {
    vec![
        item("CheatMeal", 1, Cadence::Weekly, 1),
        item("Soda", 2, Cadence::Monthly, 1),
        item("Splurge", 1, Cadence::Monthly, 2),
    ]
}
