// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use allot_domain::{
    AllotmentItem, AvailableEntry, ComingUpEntry, LedgerEvent, UnavailableEntry, UsageStats,
    recompute_derived,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The complete allocation snapshot for one load cycle.
///
/// Derived buckets are ephemeral: they are recomputed in full on every
/// load and never updated incrementally, so a snapshot is always
/// internally consistent with its own `items` and `ledger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationState {
    /// The calendar year this snapshot was derived in.
    pub year: i32,
    /// The configured quota rules.
    pub items: Vec<AllotmentItem>,
    /// The redemption ledger (failure records never reach this list).
    pub ledger: Vec<LedgerEvent>,
    /// Items with quota left, in item order.
    pub available: Vec<AvailableEntry>,
    /// Exhausted items resetting soon, soonest first.
    pub coming_up: Vec<ComingUpEntry>,
    /// Exhausted items, most-redeemed-this-year first.
    pub unavailable: Vec<UnavailableEntry>,
    /// Usage statistics keyed by item kind.
    pub stats: UsageStats,
}

impl AllocationState {
    /// Builds a snapshot by running a full derivation pass.
    ///
    /// # Arguments
    ///
    /// * `year` - The calendar year of the snapshot
    /// * `items` - The configured quota rules
    /// * `ledger` - The redemption ledger
    /// * `now` - The derivation instant
    /// * `zone` - The zone anchoring day boundaries
    #[must_use]
    pub fn assemble(
        year: i32,
        items: Vec<AllotmentItem>,
        ledger: Vec<LedgerEvent>,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> Self {
        let derived = recompute_derived(&items, &ledger, now, zone);
        Self {
            year,
            items,
            ledger,
            available: derived.available,
            coming_up: derived.coming_up,
            unavailable: derived.unavailable,
            stats: derived.stats,
        }
    }

    /// Looks up a configured item by kind.
    #[must_use]
    pub fn item(&self, kind: &str) -> Option<&AllotmentItem> {
        self.items.iter().find(|item| item.kind == kind)
    }

    /// The quota remaining for `kind` in its current window. Zero for
    /// exhausted and unknown items alike.
    #[must_use]
    pub fn remaining_for(&self, kind: &str) -> u32 {
        self.available
            .iter()
            .find(|entry| entry.kind == kind)
            .map_or(0, |entry| entry.remaining)
    }
}
