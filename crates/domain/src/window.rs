// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Current-window calculation for a single allotment item.
//!
//! ## Invariants
//!
//! - Windows are half-open `[start, end)` UTC instants
//! - Both boundaries sit on local midnight in the target zone
//! - A multiplier of 1 yields the natural calendar-aligned period
//! - A multiplier above 1 yields a rolling cycle pinned to the item's
//!   first-ever redemption, not a calendar-aligned bucket
//! - The window is never empty, even for items with no history

use crate::calendar::{local_midnight, naive_from_date, period_start, step_periods};
use crate::types::{Cadence, LedgerEvent};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The currently active quota window for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllotmentWindow {
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Exclusive window end; also the item's next reset instant.
    pub end: DateTime<Utc>,
}

impl AllotmentWindow {
    /// Whether `instant` falls inside this half-open window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The instant an event occurred: the precise `ts` when recorded, else
/// local midnight of the event's calendar day.
#[must_use]
pub(crate) fn event_instant(event: &LedgerEvent, zone: Tz) -> Option<DateTime<Utc>> {
    if let Some(ts) = event.ts {
        return Some(ts);
    }
    naive_from_date(event.date).map(|date| local_midnight(zone, date))
}

/// Computes the `[start, end)` window that is current for an item at `now`.
///
/// With `multiplier <= 1` the window is the natural-aligned period for the
/// cadence (Monday / 1st of month / January 1st). With a larger multiplier
/// the cycle is anchored to the period-aligned start of the item's first
/// redemption and advanced in whole multiplier-sized steps until it
/// contains `now`: "you get quota once every N cadence units, starting
/// from when you started using this."
///
/// # Arguments
///
/// * `now` - The instant to locate a window for
/// * `cadence` - The item's renewal cadence unit
/// * `multiplier` - Cadence units per window; values below 1 are treated as 1
/// * `zone` - The zone whose wall clock anchors day boundaries
/// * `events_for_item` - This item's redemption events, in any order
#[must_use]
pub fn build_window(
    now: DateTime<Utc>,
    cadence: Cadence,
    multiplier: u32,
    zone: Tz,
    events_for_item: &[LedgerEvent],
) -> AllotmentWindow {
    let multiplier = multiplier.max(1);
    if multiplier == 1 {
        let start = period_start(cadence, now, zone);
        return AllotmentWindow {
            start,
            end: step_periods(cadence, start, 1, zone),
        };
    }

    let mut instants: Vec<DateTime<Utc>> = events_for_item
        .iter()
        .filter_map(|event| event_instant(event, zone))
        .collect();
    instants.sort_unstable();

    let Some(first) = instants.first().copied() else {
        // No history yet: natural-aligned start, but the window already
        // spans the full multiplier so downstream math never sees an
        // empty window.
        let start = period_start(cadence, now, zone);
        return AllotmentWindow {
            start,
            end: step_periods(cadence, start, multiplier, zone),
        };
    };

    // Anchor at the period-aligned start of the first redemption, then
    // find the latest cycle boundary at or before `now`. Each step is
    // strictly later (steps saturate only at the calendar's range limit,
    // which the second guard catches), so this terminates.
    let mut start = period_start(cadence, first, zone);
    loop {
        let end = step_periods(cadence, start, multiplier, zone);
        if end > now || end <= start {
            return AllotmentWindow { start, end };
        }
        start = end;
    }
}
