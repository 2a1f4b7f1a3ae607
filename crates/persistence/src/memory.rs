// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use allot_api::{AllotmentBackend, AllotmentsDoc, AllotmentsPayload, BackendError, RawAllotmentItem};
use allot_domain::AllotmentItem;
use allot_ledger::{RawEventRecord, parse_raw_records};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Which nesting shape [`MemoryBackend::fetch_allotments`] serves.
///
/// The real store has produced all three over its history; serving each
/// from the reference adapter keeps the defensive unwrapping honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    /// The bare document.
    #[default]
    Bare,
    /// `{"data": <document>}`.
    DataWrapped,
    /// `[<document>]`.
    ArrayWrapped,
}

#[derive(Debug, Default)]
struct StoreState {
    doc: AllotmentsDoc,
    lines: Vec<String>,
}

/// The persistence port served from process memory.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<StoreState>,
    shape: PayloadShape,
    configured: bool,
}

impl MemoryBackend {
    /// Creates a configured backend holding `items` for `year` and an
    /// empty ledger.
    #[must_use]
    pub fn new(year: i32, items: Vec<AllotmentItem>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                doc: AllotmentsDoc {
                    year: Some(year),
                    items: items.into_iter().map(raw_row).collect(),
                },
                lines: Vec::new(),
            }),
            shape: PayloadShape::default(),
            configured: true,
        }
    }

    /// Creates a backend that fails every operation, for exercising the
    /// fail-fast configuration-error path.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            shape: PayloadShape::default(),
            configured: false,
        }
    }

    /// Serves the allotments document in the given nesting shape.
    #[must_use]
    pub const fn with_shape(mut self, shape: PayloadShape) -> Self {
        self.shape = shape;
        self
    }

    /// Seeds the ledger with raw JSONL text.
    #[must_use]
    pub fn with_ledger_text(self, text: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.lines = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// The number of stored ledger lines.
    #[must_use]
    pub fn ledger_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .len()
    }

    /// A copy of the stored item rows.
    #[must_use]
    pub fn stored_items(&self) -> Vec<RawAllotmentItem> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .doc
            .items
            .clone()
    }

    fn gate(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.configured {
            return Ok(());
        }
        Err(BackendError::NotConfigured(format!(
            "memory adapter was not configured ({operation})"
        )))
    }
}

fn raw_row(item: AllotmentItem) -> RawAllotmentItem {
    RawAllotmentItem {
        kind: item.kind,
        quota: Some(item.quota),
        cadence: item.cadence.as_str().to_string(),
        multiplier: Some(item.multiplier),
    }
}

impl AllotmentBackend for MemoryBackend {
    async fn fetch_allotments(&self) -> Result<AllotmentsPayload, BackendError> {
        self.gate("fetch_allotments")?;
        let doc = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .doc
            .clone();
        debug!(items = doc.items.len(), shape = ?self.shape, "serving allotments document");
        Ok(match self.shape {
            PayloadShape::Bare => AllotmentsPayload::from(doc),
            PayloadShape::DataWrapped => AllotmentsPayload::Wrapped {
                data: Box::new(AllotmentsPayload::from(doc)),
            },
            PayloadShape::ArrayWrapped => {
                AllotmentsPayload::Listed(vec![AllotmentsPayload::from(doc)])
            }
        })
    }

    async fn fetch_ledger(&self) -> Result<String, BackendError> {
        self.gate("fetch_ledger")?;
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .join("\n"))
    }

    async fn append_event(&self, record: RawEventRecord) -> Result<(), BackendError> {
        self.gate("append_event")?;
        let line = record
            .to_jsonl_line()
            .map_err(|err| BackendError::Transport {
                operation: "append_event",
                message: err.to_string(),
            })?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.lines.push(line);
        info!(event = %record.id, kind = %record.kind, "appended ledger event");
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), BackendError> {
        self.gate("delete_event")?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.lines.len();
        state.lines.retain(|line| {
            serde_json::from_str::<RawEventRecord>(line)
                .map(|record| record.id != id)
                .unwrap_or(true)
        });
        if state.lines.len() == before {
            return Err(BackendError::EventNotFound { id: id.to_string() });
        }
        info!(event = id, "deleted ledger event");
        Ok(())
    }

    async fn save_items(&self, items: Vec<AllotmentItem>) -> Result<(), BackendError> {
        self.gate("save_items")?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Upsert-by-kind with delete-missing collapses to a full replace
        // for an in-memory document; log the rows that disappear so the
        // replace-by-diff semantics stay visible.
        let incoming: Vec<String> = items.iter().map(|item| item.kind.clone()).collect();
        for row in &state.doc.items {
            if !incoming.contains(&row.kind) {
                debug!(item = %row.kind, "dropping item missing from saved list");
            }
        }
        state.doc.items = items.into_iter().map(raw_row).collect();
        info!(items = state.doc.items.len(), "saved allotment items");
        Ok(())
    }

    async fn fetch_failed_events(&self, kind: &str) -> Result<Vec<RawEventRecord>, BackendError> {
        self.gate("fetch_failed_events")?;
        let text = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .join("\n");
        Ok(parse_raw_records(&text)
            .into_iter()
            .filter(|record| record.kind == "failed" && record.item == kind)
            .collect())
    }
}
