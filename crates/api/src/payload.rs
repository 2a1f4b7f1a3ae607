// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Defensive unwrapping and normalization of fetched allotment data.
//!
//! The store has returned the allotments document in at least three
//! nesting shapes over its history: the bare object, `{"data": …}`, and
//! an array wrapping either. [`unwrap_payload`] normalizes all of them
//! into one canonical document before anything else looks at the data.

use crate::error::ApiError;
use allot_domain::{AllotmentItem, Cadence, DomainError, NormalizePolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Nesting levels tolerated before a payload is declared malformed.
const MAX_NESTING_DEPTH: usize = 8;

/// An item row as stored, before normalization. Quota and multiplier may
/// be absent and the cadence is free text in old rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAllotmentItem {
    /// The item kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// The per-window quota, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u32>,
    /// The cadence label as stored; normalized via [`Cadence`].
    #[serde(default)]
    pub cadence: String,
    /// The window multiplier, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,
}

/// The canonical allotments document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AllotmentsDoc {
    /// The year the document claims to describe, if it says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// The stored item rows.
    #[serde(default)]
    pub items: Vec<RawAllotmentItem>,
}

/// One fetched payload in any of the tolerated nesting shapes.
///
/// Variant order matters: the bare document accepts any object once its
/// optional fields default, so it must be tried last.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AllotmentsPayload {
    /// `{"data": …}`, possibly nested further.
    Wrapped {
        /// The wrapped payload.
        data: Box<AllotmentsPayload>,
    },
    /// `[ … ]`: the document wrapped in an array; the first element wins.
    Listed(Vec<AllotmentsPayload>),
    /// The bare document.
    Bare(AllotmentsDoc),
}

impl From<AllotmentsDoc> for AllotmentsPayload {
    fn from(doc: AllotmentsDoc) -> Self {
        Self::Bare(doc)
    }
}

/// Normalizes any tolerated nesting shape into the canonical document.
///
/// # Errors
///
/// Returns an error for an empty array wrapper or nesting deeper than
/// [`MAX_NESTING_DEPTH`] levels.
pub fn unwrap_payload(payload: AllotmentsPayload) -> Result<AllotmentsDoc, ApiError> {
    let mut current = payload;
    for _ in 0..MAX_NESTING_DEPTH {
        match current {
            AllotmentsPayload::Bare(doc) => return Ok(doc),
            AllotmentsPayload::Wrapped { data } => current = *data,
            AllotmentsPayload::Listed(list) => {
                current = list.into_iter().next().ok_or_else(|| ApiError::MalformedPayload {
                    reason: String::from("array-wrapped allotments payload is empty"),
                })?;
            }
        }
    }
    Err(ApiError::MalformedPayload {
        reason: format!("allotments payload nested deeper than {MAX_NESTING_DEPTH} levels"),
    })
}

/// Normalizes stored item rows into typed items under the given policy.
///
/// Lenient mode patches free-text cadences to monthly and missing quotas
/// to zero, logging each patch so masked data errors stay visible.
///
/// # Errors
///
/// In strict mode, returns the first unrecognized cadence or missing
/// quota as a domain error.
pub fn normalize_items(
    raw_items: Vec<RawAllotmentItem>,
    policy: NormalizePolicy,
) -> Result<Vec<AllotmentItem>, ApiError> {
    raw_items
        .into_iter()
        .map(|raw| {
            let cadence = match raw.cadence.parse::<Cadence>() {
                Ok(cadence) => cadence,
                Err(err) => match policy {
                    NormalizePolicy::Strict => return Err(ApiError::from(err)),
                    NormalizePolicy::Lenient => {
                        warn!(
                            item = %raw.kind,
                            cadence = %raw.cadence,
                            "unrecognized cadence, defaulting to monthly"
                        );
                        Cadence::Monthly
                    }
                },
            };
            let quota = match raw.quota {
                Some(quota) => quota,
                None => match policy {
                    NormalizePolicy::Strict => {
                        return Err(ApiError::from(DomainError::MissingQuota { kind: raw.kind }));
                    }
                    NormalizePolicy::Lenient => {
                        warn!(item = %raw.kind, "missing quota, defaulting to 0");
                        0
                    }
                },
            };
            let multiplier = raw.multiplier.unwrap_or(1);
            Ok(AllotmentItem::new(raw.kind, quota, cadence, multiplier))
        })
        .collect()
}
