// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the service layer.

use crate::port::BackendError;
use allot_domain::DomainError;
use allot_ledger::LedgerError;

/// Result alias for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Service-level errors.
///
/// These are distinct from domain and port errors and represent the
/// contract seen by UI callers. Errors are cloneable because a failed
/// load settles a shared in-flight future that every concurrent caller
/// receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The persistence port failed or is not configured.
    Backend(BackendError),
    /// The allotments payload could not be normalized into a document.
    MalformedPayload {
        /// A human-readable description of the problem.
        reason: String,
    },
    /// The ledger text was rejected by the ingest policy.
    Ledger(LedgerError),
    /// A domain rule was violated.
    Domain(DomainError),
    /// The named item is not configured.
    UnknownItem {
        /// The item kind that was requested.
        kind: String,
    },
    /// A redemption was requested for an item with nothing remaining.
    NothingRemaining {
        /// The exhausted item kind.
        kind: String,
    },
    /// An undo was requested for an item with no failure events.
    NothingToUndo {
        /// The item kind with no failure to undo.
        kind: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "Persistence port error: {err}"),
            Self::MalformedPayload { reason } => {
                write!(f, "Malformed allotments payload: {reason}")
            }
            Self::Ledger(err) => write!(f, "Ledger ingest error: {err}"),
            Self::Domain(err) => write!(f, "Domain violation: {err}"),
            Self::UnknownItem { kind } => write!(f, "No allotment named '{kind}' is configured"),
            Self::NothingRemaining { kind } => {
                write!(f, "'{kind}' has nothing remaining in its current window")
            }
            Self::NothingToUndo { kind } => {
                write!(f, "'{kind}' has no failure event to undo")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}
