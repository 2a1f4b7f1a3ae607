// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bucket derivation: turns items plus the redemption ledger into
//! available / coming-up / unavailable buckets and usage statistics.
//!
//! This is a pure, total recomputation on every call. Nothing is memoized;
//! expected cardinality is tens of items and low hundreds of events, so
//! repeated window and ledger scans are cheaper than cache invalidation.
//!
//! ## Invariants
//!
//! - Every item lands in exactly one of {available, unavailable}
//! - `coming_up` holds a subset of the unavailable items
//! - `remaining = max(0, quota - used_this_period)`, except the override:
//!   an item with `multiplier > 1` and `quota == 1` whose window already
//!   contains a redemption *instant* is forced to zero remaining (one
//!   redemption exhausts the whole cycle for low-quota, multi-period items)
//! - Usage counting is day-level: an event counts against the window its
//!   calendar day's local midnight falls into, regardless of `ts`

use crate::calendar::{
    coming_up_threshold, days_until, iso_date_tz, local_midnight, naive_from_date,
};
use crate::types::{AllotmentItem, LedgerEvent};
use crate::window::{build_window, event_instant};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// An item with quota left in its current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableEntry {
    /// The item kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Uses left in the current window.
    pub remaining: u32,
    /// The item's full quota.
    pub total: u32,
}

/// An exhausted item whose reset is close enough to advertise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComingUpEntry {
    /// The item kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whole calendar days until the window resets.
    pub days_until: i64,
    /// The quota that becomes available at reset.
    pub quota_available: u32,
}

/// An item with no quota left in its current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableEntry {
    /// The item kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Most recent redemption date within the current calendar year.
    pub last_redeemed: Option<Date>,
    /// Redemptions within the current calendar year.
    pub count_this_year: u32,
}

impl UnavailableEntry {
    /// Human-readable rendering of the last redemption date.
    #[must_use]
    pub fn last_redeemed_label(&self) -> String {
        self.last_redeemed
            .map_or_else(|| String::from("Never"), |date| date.to_string())
    }
}

/// Per-item usage statistics, keyed by item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// All-time event counts, independent of windowing.
    pub usage_counts: BTreeMap<String, u32>,
    /// Percentage of the current window's quota consumed (0-100).
    pub percentages: BTreeMap<String, u8>,
    /// The next reset date (`YYYY-MM-DD`, local to the derivation zone).
    pub next_reset: BTreeMap<String, String>,
}

/// The full output of one derivation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    /// Items with quota left, in item order.
    pub available: Vec<AvailableEntry>,
    /// Exhausted items resetting soon, soonest first.
    pub coming_up: Vec<ComingUpEntry>,
    /// Exhausted items, most-redeemed-this-year first.
    pub unavailable: Vec<UnavailableEntry>,
    /// Usage statistics.
    pub stats: UsageStats,
}

/// Recomputes every derived bucket and statistic for `items` against
/// `ledger` as of `now` in `zone`.
///
/// The ledger passed here is the redemption ledger: failure records are
/// filtered out at ingest and never reach this function.
#[must_use]
pub fn recompute_derived(
    items: &[AllotmentItem],
    ledger: &[LedgerEvent],
    now: DateTime<Utc>,
    zone: Tz,
) -> Derived {
    let mut derived = Derived::default();
    let current_year = now.with_timezone(&zone).year();

    for item in items {
        derived.stats.usage_counts.insert(item.kind.clone(), 0);
    }
    for event in ledger {
        *derived.stats.usage_counts.entry(event.kind.clone()).or_insert(0) += 1;
    }

    for item in items {
        let events: Vec<LedgerEvent> = ledger
            .iter()
            .filter(|event| event.kind == item.kind)
            .cloned()
            .collect();
        let multiplier = item.multiplier.max(1);
        let window = build_window(now, item.cadence, multiplier, zone, &events);

        // Day-level usage: an event belongs to the window containing the
        // local midnight of its calendar day.
        let used_this_period = count_in_window(&events, zone, &window);
        let mut remaining = item.quota.saturating_sub(used_this_period);

        // One redemption exhausts the whole cycle for low-quota items
        // spanning multiple periods. Checked at instant precision, so it
        // can fire even when day-level counting missed the event.
        if multiplier > 1
            && item.quota == 1
            && events
                .iter()
                .filter_map(|event| event_instant(event, zone))
                .any(|instant| window.contains(instant))
        {
            remaining = 0;
        }

        derived
            .stats
            .percentages
            .insert(item.kind.clone(), usage_percentage(used_this_period, item.quota));
        derived
            .stats
            .next_reset
            .insert(item.kind.clone(), iso_date_tz(window.end, zone));

        if remaining > 0 {
            derived.available.push(AvailableEntry {
                kind: item.kind.clone(),
                remaining,
                total: item.quota,
            });
            continue;
        }

        let this_year: Vec<Date> = events
            .iter()
            .map(|event| event.date)
            .filter(|date| date.year() == current_year)
            .collect();
        derived.unavailable.push(UnavailableEntry {
            kind: item.kind.clone(),
            last_redeemed: this_year.iter().max().copied(),
            count_this_year: u32::try_from(this_year.len()).unwrap_or(u32::MAX),
        });

        let days = days_until(now, window.end, zone);
        if days <= coming_up_threshold(item.cadence) {
            derived.coming_up.push(ComingUpEntry {
                kind: item.kind.clone(),
                days_until: days,
                quota_available: item.quota,
            });
        }
    }

    derived.coming_up.sort_by_key(|entry| entry.days_until);
    derived
        .unavailable
        .sort_by_key(|entry| std::cmp::Reverse(entry.count_this_year));
    derived
}

/// Counts events whose calendar day's local midnight falls inside the
/// window. Events with dates outside chrono's range are dropped.
fn count_in_window(
    events: &[LedgerEvent],
    zone: Tz,
    window: &crate::window::AllotmentWindow,
) -> u32 {
    let count = events
        .iter()
        .filter_map(|event| naive_from_date(event.date))
        .map(|date| local_midnight(zone, date))
        .filter(|midnight| window.contains(*midnight))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// `min(100, round(used / quota * 100))`, or 0 when the quota is 0.
fn usage_percentage(used: u32, quota: u32) -> u8 {
    if quota == 0 {
        return 0;
    }
    let rounded = (u64::from(used) * 100 + u64::from(quota) / 2) / u64::from(quota);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
