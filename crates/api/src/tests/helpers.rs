// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::payload::{AllotmentsDoc, AllotmentsPayload, RawAllotmentItem};
use crate::port::{AllotmentBackend, BackendError};
use allot_domain::AllotmentItem;
use allot_ledger::{RawEventRecord, parse_raw_records};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Makes skip/fallback warnings visible when tests run with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn raw_item(kind: &str, quota: Option<u32>, cadence: &str, multiplier: Option<u32>) -> RawAllotmentItem {
    RawAllotmentItem {
        kind: String::from(kind),
        quota,
        cadence: String::from(cadence),
        multiplier,
    }
}

/// In-memory adapter for service tests: a document plus JSONL lines,
/// with a fetch counter and optional latency for coalescing tests.
#[derive(Debug, Default)]
pub struct MockBackend {
    doc: Mutex<AllotmentsDoc>,
    lines: Mutex<Vec<String>>,
    pub fetch_calls: AtomicUsize,
    delay: Option<Duration>,
    offline: bool,
}

impl MockBackend {
    pub fn new(year: i32, items: Vec<RawAllotmentItem>) -> Self {
        Self {
            doc: Mutex::new(AllotmentsDoc {
                year: Some(year),
                items,
            }),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_ledger_lines(self, lines: Vec<String>) -> Self {
        *self.lines.lock().unwrap() = lines;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn line_count(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn stored_items(&self) -> Vec<RawAllotmentItem> {
        self.doc.lock().unwrap().items.clone()
    }

    fn gate(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::NotConfigured(format!(
                "mock adapter is offline ({operation})"
            )));
        }
        Ok(())
    }
}

impl AllotmentBackend for MockBackend {
    async fn fetch_allotments(&self) -> Result<AllotmentsPayload, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.gate("fetch_allotments")?;
        Ok(AllotmentsPayload::from(self.doc.lock().unwrap().clone()))
    }

    async fn fetch_ledger(&self) -> Result<String, BackendError> {
        self.gate("fetch_ledger")?;
        Ok(self.lines.lock().unwrap().join("\n"))
    }

    async fn append_event(&self, record: RawEventRecord) -> Result<(), BackendError> {
        self.gate("append_event")?;
        let line = record
            .to_jsonl_line()
            .map_err(|err| BackendError::Transport {
                operation: "append_event",
                message: err.to_string(),
            })?;
        self.lines.lock().unwrap().push(line);
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), BackendError> {
        self.gate("delete_event")?;
        let mut lines = self.lines.lock().unwrap();
        let before = lines.len();
        lines.retain(|line| {
            serde_json::from_str::<RawEventRecord>(line)
                .map(|record| record.id != id)
                .unwrap_or(true)
        });
        if lines.len() == before {
            return Err(BackendError::EventNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn save_items(&self, items: Vec<AllotmentItem>) -> Result<(), BackendError> {
        self.gate("save_items")?;
        self.doc.lock().unwrap().items = items
            .into_iter()
            .map(|item| RawAllotmentItem {
                kind: item.kind,
                quota: Some(item.quota),
                cadence: item.cadence.as_str().to_string(),
                multiplier: Some(item.multiplier),
            })
            .collect();
        Ok(())
    }

    async fn fetch_failed_events(&self, kind: &str) -> Result<Vec<RawEventRecord>, BackendError> {
        self.gate("fetch_failed_events")?;
        let text = self.lines.lock().unwrap().join("\n");
        Ok(parse_raw_records(&text)
            .into_iter()
            .filter(|record| record.kind == "failed" && record.item == kind)
            .collect())
    }
}
