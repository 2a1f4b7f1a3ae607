// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation and calendar arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An item kind is empty or otherwise invalid.
    InvalidKind(String),
    /// Two items share the same kind.
    DuplicateKind(String),
    /// An item multiplier is zero.
    InvalidMultiplier {
        /// The item kind carrying the invalid multiplier.
        kind: String,
    },
    /// An item quota is missing and the normalization policy is strict.
    MissingQuota {
        /// The item kind missing its quota.
        kind: String,
    },
    /// A cadence label could not be normalized and the policy is strict.
    UnknownCadence(String),
    /// A raw record discriminant is neither "redeem" nor "failed".
    UnknownEventKind(String),
    /// Calendar fields do not name a real date or time of day.
    InvalidCalendarFields {
        /// The year field.
        year: i32,
        /// The month field (1-based).
        month: u32,
        /// The day field (1-based).
        day: u32,
    },
    /// A date string could not be parsed.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKind(msg) => write!(f, "Invalid item kind: {msg}"),
            Self::DuplicateKind(kind) => {
                write!(f, "Item kind '{kind}' appears more than once")
            }
            Self::InvalidMultiplier { kind } => {
                write!(f, "Item '{kind}' has a zero multiplier; must be at least 1")
            }
            Self::MissingQuota { kind } => {
                write!(f, "Item '{kind}' has no quota and strict normalization is in effect")
            }
            Self::UnknownCadence(value) => {
                write!(f, "Unrecognized cadence '{value}'")
            }
            Self::UnknownEventKind(value) => {
                write!(f, "Unrecognized event kind '{value}'")
            }
            Self::InvalidCalendarFields { year, month, day } => {
                write!(f, "No such calendar date: {year:04}-{month:02}-{day:02}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
