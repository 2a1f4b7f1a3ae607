// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field and list validation for allotment items.
//!
//! Validation runs before anything is written through the persistence
//! port, so a bad edit fails fast with a descriptive error instead of
//! corrupting the stored item list.

use crate::error::DomainError;
use crate::types::AllotmentItem;
use std::collections::BTreeSet;

/// Validates a single item's fields.
///
/// # Errors
///
/// Returns an error if:
/// - The kind is empty or whitespace-only
/// - The multiplier is zero
pub fn validate_item_fields(item: &AllotmentItem) -> Result<(), DomainError> {
    if item.kind.trim().is_empty() {
        return Err(DomainError::InvalidKind(String::from(
            "kind must not be empty",
        )));
    }
    if item.multiplier == 0 {
        return Err(DomainError::InvalidMultiplier {
            kind: item.kind.clone(),
        });
    }
    Ok(())
}

/// Validates that no two items share a kind.
///
/// Kinds are the primary key of the item list; the persistence port
/// upserts by kind, so duplicates would silently collapse into one row.
///
/// # Errors
///
/// Returns an error naming the first duplicated kind.
pub fn validate_kinds_unique(items: &[AllotmentItem]) -> Result<(), DomainError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for item in items {
        if !seen.insert(item.kind.as_str()) {
            return Err(DomainError::DuplicateKind(item.kind.clone()));
        }
    }
    Ok(())
}

/// Validates a whole item list: every item's fields plus kind uniqueness.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn validate_items(items: &[AllotmentItem]) -> Result<(), DomainError> {
    for item in items {
        validate_item_fields(item)?;
    }
    validate_kinds_unique(items)
}
