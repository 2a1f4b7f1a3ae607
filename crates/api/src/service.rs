// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The allotment service: load-and-derive plus the mutating actions.
//!
//! Every mutation reloads full state after success, so callers never
//! reconcile optimistic state with store truth. A failure during the
//! reload surfaces as the operation's error with no retry; the caller
//! keeps whatever state it already had.

use crate::error::{ApiError, ApiResult};
use crate::payload::{normalize_items, unwrap_payload};
use crate::port::AllotmentBackend;
use crate::single_flight::LoadGuard;
use allot::{AllocationState, SessionStore, StagingArea, apply_staged};
use allot_domain::{EventKind, NormalizePolicy, validate_items};
use allot_ledger::{ParsePolicy, RawEventRecord, parse_jsonl};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use rand::RngExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The IANA zone this device's wall clock lives in, falling back to UTC
/// when the platform zone is missing or unknown to the tz database.
#[must_use]
pub fn device_zone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(zone) => zone,
            Err(_) => {
                warn!(zone = %name, "device time zone not in tz database, falling back to UTC");
                Tz::UTC
            }
        },
        Err(err) => {
            warn!(error = %err, "could not determine device time zone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// Orchestrates loads and mutations against one persistence adapter.
///
/// The service owns the single-flight load guard; constructing more than
/// one service over the same adapter forfeits load coalescing.
pub struct AllotmentService<B: AllotmentBackend> {
    backend: Arc<B>,
    /// Fixed zone override; `None` resolves the device zone per load.
    zone: Option<Tz>,
    normalize_policy: NormalizePolicy,
    parse_policy: ParsePolicy,
    loads: LoadGuard<ApiResult<AllocationState>>,
}

impl<B: AllotmentBackend> AllotmentService<B> {
    /// Creates a service over `backend` with lenient normalization, the
    /// skip-and-log ledger policy, and the device time zone.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            zone: None,
            normalize_policy: NormalizePolicy::default(),
            parse_policy: ParsePolicy::default(),
            loads: LoadGuard::new(),
        }
    }

    /// The adapter this service runs against.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pins every derivation to a fixed zone instead of the device zone.
    #[must_use]
    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Sets the normalization and ledger ingest policies.
    #[must_use]
    pub fn with_policies(
        mut self,
        normalize_policy: NormalizePolicy,
        parse_policy: ParsePolicy,
    ) -> Self {
        self.normalize_policy = normalize_policy;
        self.parse_policy = parse_policy;
        self
    }

    /// Loads items and ledger from the adapter and derives a full
    /// allocation snapshot.
    ///
    /// At most one load is in flight at a time: concurrent callers share
    /// the pending result rather than duplicating backend calls.
    ///
    /// # Errors
    ///
    /// Returns the first port, payload, ingest, or normalization error.
    pub async fn load(&self) -> ApiResult<AllocationState> {
        let backend = Arc::clone(&self.backend);
        let zone = self.zone;
        let normalize_policy = self.normalize_policy;
        let parse_policy = self.parse_policy;
        self.loads
            .run(move || load_snapshot(backend, zone, normalize_policy, parse_policy).boxed())
            .await
    }

    /// Redeems one use of `kind`.
    ///
    /// The availability check runs against freshly loaded state, never a
    /// cached snapshot, and fails before any mutation is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown, nothing remains in its
    /// current window, or the port rejects the append or reload.
    pub async fn redeem_item(&self, kind: &str) -> ApiResult<AllocationState> {
        let state = self.load().await?;
        if state.item(kind).is_none() {
            return Err(ApiError::UnknownItem {
                kind: kind.to_string(),
            });
        }
        if state.remaining_for(kind) == 0 {
            return Err(ApiError::NothingRemaining {
                kind: kind.to_string(),
            });
        }

        let record = RawEventRecord::new(
            EventKind::Redeem,
            kind.to_string(),
            1,
            Utc::now(),
            generate_event_id(),
        );
        self.backend.append_event(record).await?;
        info!(item = kind, "recorded redemption");
        self.load().await
    }

    /// Records an admit-defeat event for `kind`.
    ///
    /// Failure records never count toward quota consumption; they exist
    /// for the weekly-challenge ledger and are undoable.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown or the port rejects the
    /// append or reload.
    pub async fn admit_defeat(&self, kind: &str) -> ApiResult<AllocationState> {
        let state = self.load().await?;
        if state.item(kind).is_none() {
            return Err(ApiError::UnknownItem {
                kind: kind.to_string(),
            });
        }

        let record = RawEventRecord::new(
            EventKind::Failed,
            kind.to_string(),
            1,
            Utc::now(),
            generate_event_id(),
        );
        self.backend.append_event(record).await?;
        info!(item = kind, "recorded admitted defeat");
        self.load().await
    }

    /// Undoes the most recent admit-defeat event for `kind` by deleting
    /// its ledger record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NothingToUndo`] when no failure event exists,
    /// or the port's error for the deletion or reload.
    pub async fn undo_admit_defeat(&self, kind: &str) -> ApiResult<AllocationState> {
        let mut failed = self.backend.fetch_failed_events(kind).await?;
        failed.sort_by_key(|record| record.ts);
        let Some(latest) = failed.pop() else {
            return Err(ApiError::NothingToUndo {
                kind: kind.to_string(),
            });
        };

        self.backend.delete_event(&latest.id).await?;
        info!(item = kind, event = %latest.id, "undid admitted defeat");
        self.load().await
    }

    /// Applies the staged patch set to freshly loaded items, saves the
    /// resulting list through the port, clears the staging area, and
    /// reloads.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the working list fails validation (the
    /// staging area is left intact so the user can fix the edit), or the
    /// port's error for the save or reload.
    pub async fn commit_staged<S: SessionStore>(
        &self,
        staging: &mut StagingArea<S>,
    ) -> ApiResult<AllocationState> {
        let state = self.load().await?;
        let working = apply_staged(&state.items, &staging.staged_changes());
        validate_items(&working)?;

        self.backend.save_items(working).await?;
        staging.clear();
        info!("committed staged allotment changes");
        self.load().await
    }
}

/// One full load-and-derive pass. Free function so the future is
/// `'static` and can be shared by the single-flight guard.
async fn load_snapshot<B: AllotmentBackend>(
    backend: Arc<B>,
    zone: Option<Tz>,
    normalize_policy: NormalizePolicy,
    parse_policy: ParsePolicy,
) -> ApiResult<AllocationState> {
    let payload = backend.fetch_allotments().await?;
    let doc = unwrap_payload(payload)?;
    let items = normalize_items(doc.items, normalize_policy)?;

    let raw_ledger = backend.fetch_ledger().await?;
    let ledger = parse_jsonl(&raw_ledger, parse_policy)?;

    // The device zone is resolved once per derivation call.
    let zone = zone.unwrap_or_else(device_zone);
    let now = Utc::now();
    let year = doc.year.unwrap_or_else(|| now.with_timezone(&zone).year());
    debug!(
        items = items.len(),
        events = ledger.len(),
        zone = %zone,
        "derived allocation snapshot"
    );
    Ok(AllocationState::assemble(year, items, ledger, now, zone))
}

/// Random 16-hex-digit event id for appended ledger records.
fn generate_event_id() -> String {
    let value: u64 = rand::rng().random();
    format!("{value:016x}")
}
