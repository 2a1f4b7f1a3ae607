// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Newline-delimited JSON ingest for the redemption ledger.
//!
//! The ledger arrives from the persistence port as raw JSONL text. Two
//! record shapes are tolerated on the way in:
//!
//! - Canonical: `{"id": …, "date": "YYYY-MM-DD", "type": …}`, passed
//!   through as-is.
//! - Raw: `{"type": "redeem"|"failed"|…, "item": …, "qty": …, "ts": …,
//!   "id": …}`, of which only redemptions survive normalization here; the
//!   calendar day is the first ten characters of its timestamp.
//!
//! Failure records are written and read back through a dedicated port
//! query (see [`parse_raw_records`]) and never enter the derivation
//! ledger. Records that parse as JSON but fit neither shape are dropped.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use allot_domain::{EventKind, LedgerEvent, date_from_naive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Errors that can occur while ingesting ledger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A line was not valid JSON and the parse policy is [`ParsePolicy::Fail`].
    MalformedLine {
        /// The 1-based line number.
        line: usize,
        /// The underlying parser message.
        message: String,
    },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line, message } => {
                write!(f, "Ledger line {line} is not valid JSON: {message}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

/// What to do with a line that is not valid JSON.
///
/// A malformed line must never corrupt the rest of the batch; the choice
/// is between dropping it and aborting the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Log the line and continue with the rest of the batch.
    #[default]
    Skip,
    /// Abort the batch on the first malformed line.
    Fail,
}

/// The wire shape of an appended ledger record.
///
/// This is what mutating actions write through the persistence port and
/// what the failure-event query path reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventRecord {
    /// The record discriminant ("redeem", "failed", …).
    #[serde(rename = "type")]
    pub kind: String,
    /// The item kind this record counts against.
    pub item: String,
    /// Quantity consumed; the engine only ever writes 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    /// The instant the record was created.
    pub ts: DateTime<Utc>,
    /// Unique record id.
    pub id: String,
}

impl RawEventRecord {
    /// Creates a new raw record for appending to the ledger.
    ///
    /// # Arguments
    ///
    /// * `kind` - The record discriminant
    /// * `item` - The item kind this record counts against
    /// * `qty` - Quantity consumed
    /// * `ts` - The instant the record was created
    /// * `id` - Unique record id
    #[must_use]
    pub fn new(kind: EventKind, item: String, qty: u32, ts: DateTime<Utc>, id: String) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            item,
            qty: Some(qty),
            ts,
            id,
        }
    }

    /// Serializes this record as one JSONL line (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, which for this shape it
    /// cannot in practice.
    pub fn to_jsonl_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One tolerated line shape. Canonical records carry a `date` field; raw
/// records carry `item` and a mandatory `ts`, so the two never collide.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParsedLine {
    Canonical(LedgerEvent),
    Raw(RawEventRecord),
}

/// Normalizes one parsed line into a derivation-ledger event.
///
/// Raw records survive only when they are redemptions; everything else
/// (failures, unknown discriminants) is filtered out at this layer.
fn normalize_line(parsed: ParsedLine) -> Option<LedgerEvent> {
    match parsed {
        ParsedLine::Canonical(event) => Some(event),
        ParsedLine::Raw(record) => {
            if !matches!(record.kind.parse(), Ok(EventKind::Redeem)) {
                return None;
            }
            let date = date_from_naive(record.ts.date_naive())?;
            Some(LedgerEvent::new(
                record.id,
                date,
                record.item,
                Some(record.ts),
            ))
        }
    }
}

/// Parses ledger JSONL text into the canonical redemption ledger.
///
/// Lines are trimmed; blank lines are dropped; each remaining line is
/// parsed independently so one bad line cannot corrupt its neighbors.
/// JSON-valid lines that fit neither record shape are dropped with a
/// debug log.
///
/// # Errors
///
/// Returns an error for the first non-JSON line when `policy` is
/// [`ParsePolicy::Fail`]. With [`ParsePolicy::Skip`] this never fails.
pub fn parse_jsonl(text: &str, policy: ParsePolicy) -> Result<Vec<LedgerEvent>, LedgerError> {
    let mut events = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => match policy {
                ParsePolicy::Fail => {
                    return Err(LedgerError::MalformedLine {
                        line: index + 1,
                        message: err.to_string(),
                    });
                }
                ParsePolicy::Skip => {
                    warn!(line = index + 1, error = %err, "skipping malformed ledger line");
                    continue;
                }
            },
        };
        match serde_json::from_value::<ParsedLine>(value) {
            Ok(parsed) => {
                if let Some(event) = normalize_line(parsed) {
                    events.push(event);
                }
            }
            Err(_) => {
                debug!(line = index + 1, "dropping ledger line with unrecognized shape");
            }
        }
    }
    Ok(events)
}

/// Parses ledger JSONL text into raw records, keeping every discriminant.
///
/// This is the direct-query path used by the admit-defeat feature to find
/// failure records. It never fails; lines that are not raw records are
/// simply skipped.
#[must_use]
pub fn parse_raw_records(text: &str) -> Vec<RawEventRecord> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<RawEventRecord>(line).ok())
        .collect()
}
