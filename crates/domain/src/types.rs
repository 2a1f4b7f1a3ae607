// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// How often an allotment's quota renews.
///
/// The cadence names the *unit* of the renewal period. The actual window
/// length is `cadence × multiplier` (see [`crate::build_window`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Renews on ISO weeks (Monday 00:00 local).
    Weekly,
    /// Renews on calendar months (1st of month, 00:00 local).
    #[default]
    Monthly,
    /// Renews in 3-month blocks anchored to the current month, not fiscal
    /// quarters. Shares the monthly period start; only the step differs.
    Quarterly,
    /// Renews on calendar years (January 1st, 00:00 local).
    Yearly,
}

impl Cadence {
    /// Converts this cadence to its canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Normalizes a free-text cadence label, defaulting to [`Self::Monthly`]
    /// when the label is unrecognized.
    ///
    /// This is the lenient path used for partially-migrated data. Callers
    /// that must reject bad labels should use [`str::parse`] and apply
    /// [`NormalizePolicy::Strict`].
    #[must_use]
    pub fn normalize(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// The number of months in one cadence step, for the month-stepped
    /// cadences. `None` for weekly and yearly, which step differently.
    #[must_use]
    pub const fn months_per_step(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Weekly | Self::Yearly => None,
        }
    }
}

impl FromStr for Cadence {
    type Err = DomainError;

    /// Accepts both the singular noun and the adjective form of each
    /// cadence, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Self::Weekly),
            "month" | "monthly" => Ok(Self::Monthly),
            "quarter" | "quarterly" => Ok(Self::Quarterly),
            "year" | "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            _ => Err(DomainError::UnknownCadence(s.to_string())),
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Controls how lenient normalization of fetched item data is.
///
/// The reference data set contains partially-migrated rows (free-text
/// cadences, missing quotas). Lenient mode patches those silently;
/// strict mode rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizePolicy {
    /// Unrecognized cadences become monthly; missing quotas become 0.
    #[default]
    Lenient,
    /// Unrecognized cadences and missing quotas are errors.
    Strict,
}

/// A quota rule: the user may consume `quota` uses of `kind` per window of
/// `multiplier` cadence units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllotmentItem {
    /// The unique key for this item (e.g. "CheatMeal").
    #[serde(rename = "type")]
    pub kind: String,
    /// Uses permitted per window. Zero means the item is never available.
    pub quota: u32,
    /// The renewal cadence unit.
    pub cadence: Cadence,
    /// Number of cadence units per window. Always at least 1.
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

const fn default_multiplier() -> u32 {
    1
}

impl AllotmentItem {
    /// Creates a new `AllotmentItem`.
    ///
    /// # Arguments
    ///
    /// * `kind` - The unique key for this item
    /// * `quota` - Uses permitted per window
    /// * `cadence` - The renewal cadence unit
    /// * `multiplier` - Cadence units per window (clamped to at least 1)
    #[must_use]
    pub fn new(kind: String, quota: u32, cadence: Cadence, multiplier: u32) -> Self {
        Self {
            kind,
            quota,
            cadence,
            multiplier: multiplier.max(1),
        }
    }
}

/// The external discriminant of a raw ledger record.
///
/// Only redemptions count toward quota consumption; failures are recorded
/// facts read back through a separate query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The user consumed one use of the item.
    Redeem,
    /// The user admitted defeat on the item for this period.
    Failed,
}

impl EventKind {
    /// Converts this event kind to its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Redeem => "redeem",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redeem" => Ok(Self::Redeem),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::UnknownEventKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable redemption fact from the ledger.
///
/// Ledger events are:
/// - Additive
/// - Immutable once written
/// - Deleted only by the explicit undo of the most recent failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event id.
    pub id: String,
    /// The calendar day of the event (`YYYY-MM-DD`).
    pub date: Date,
    /// The item kind this event counts against.
    #[serde(rename = "type")]
    pub kind: String,
    /// The original instant, preferred over `date` for window math.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
}

impl LedgerEvent {
    /// Creates a new `LedgerEvent`.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique event id
    /// * `date` - The calendar day of the event
    /// * `kind` - The item kind this event counts against
    /// * `ts` - The original instant, if known
    #[must_use]
    pub const fn new(id: String, date: Date, kind: String, ts: Option<DateTime<Utc>>) -> Self {
        Self { id, date, kind, ts }
    }
}
