// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod derive;
mod error;
mod types;
mod validation;
mod window;

#[cfg(test)]
mod tests;

pub use calendar::{
    LocalParts, add_local_days, coming_up_threshold, date_from_naive, days_until, iso_date_tz,
    local_midnight, naive_from_date, parts_tz, period_start, step_periods, zoned_utc,
};
pub use derive::{
    AvailableEntry, ComingUpEntry, Derived, UnavailableEntry, UsageStats, recompute_derived,
};
pub use error::DomainError;
pub use types::{AllotmentItem, Cadence, EventKind, LedgerEvent, NormalizePolicy};
pub use validation::{validate_item_fields, validate_items, validate_kinds_unique};
pub use window::{AllotmentWindow, build_window};
