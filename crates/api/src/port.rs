// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The persistence port.
//!
//! The concrete transport (hosted Postgres, webhook relay, anything else)
//! is out of scope for this engine; everything it must provide is this
//! trait. Adapters live behind it and the service layer never sees
//! transport details.

use crate::payload::AllotmentsPayload;
use allot_domain::AllotmentItem;
use allot_ledger::RawEventRecord;
use std::future::Future;
use thiserror::Error;

/// Errors surfaced by a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The adapter is unavailable or was never configured. Fails fast;
    /// the service never retries this.
    #[error("persistence port is not configured: {0}")]
    NotConfigured(String),
    /// A transport operation failed.
    #[error("{operation} failed: {message}")]
    Transport {
        /// The operation that failed (e.g. "fetch_ledger").
        operation: &'static str,
        /// The adapter's error message.
        message: String,
    },
    /// A deletion referenced an event id that does not exist.
    #[error("ledger event '{id}' not found")]
    EventNotFound {
        /// The missing event id.
        id: String,
    },
}

/// The persistence port consumed by [`crate::AllotmentService`].
///
/// Implementations must be cheap to share across concurrent loads; the
/// service holds one adapter behind an `Arc` for the lifetime of the
/// subsystem.
pub trait AllotmentBackend: Send + Sync + 'static {
    /// Fetches the allotments document in whatever nesting shape the
    /// store returns it.
    fn fetch_allotments(
        &self,
    ) -> impl Future<Output = Result<AllotmentsPayload, BackendError>> + Send;

    /// Fetches the raw ledger as newline-delimited JSON text.
    fn fetch_ledger(&self) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Appends one record to the ledger.
    fn append_event(
        &self,
        record: RawEventRecord,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Deletes the ledger record with the given id.
    fn delete_event(&self, id: &str) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Replaces the stored item list: upsert by kind, delete anything
    /// missing from `items`.
    fn save_items(
        &self,
        items: Vec<AllotmentItem>,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Fetches every failure record for one item kind, bypassing the
    /// redemption-ledger normalization. This is the direct-query path
    /// backing the admit-defeat undo.
    fn fetch_failed_events(
        &self,
        kind: &str,
    ) -> impl Future<Output = Result<Vec<RawEventRecord>, BackendError>> + Send;
}
