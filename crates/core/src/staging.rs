// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staged edits to the allotment item list.
//!
//! Edits accumulate as an index-keyed patch set and are applied to the
//! base list only on commit, so the source of truth is never mutated by
//! half-finished form state. The patch set survives a page reload within
//! one session by mirroring itself into a session store; the in-memory
//! maps are the source of truth, the store is only a rehydration
//! mechanism.
//!
//! ## Invariants
//!
//! - A patch whose every field reverts to the original value is deleted
//!   outright (unless it stages a brand-new item)
//! - Marking an index removed discards any pending edit for it
//! - Patches are keyed by array index, not item kind, for compatibility
//!   with the stored patch format

use allot_domain::{AllotmentItem, Cadence};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Session-store key for the staged update map.
pub const STAGED_UPDATES_KEY: &str = "staged-alloc-updates";
/// Session-store key for the staged removal set.
pub const STAGED_REMOVES_KEY: &str = "staged-alloc-removes";

/// A scoped key/value store with session lifetime.
///
/// The staging layer treats this as write-through persistence: every
/// mutation saves, and [`StagingArea::load`] rehydrates from it once at
/// startup.
pub trait SessionStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);
    /// Deletes the value under `key`, if any.
    fn remove(&mut self, key: &str);
}

/// An item field that a patch can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemField {
    /// The item kind.
    #[serde(rename = "type")]
    Kind,
    /// The per-window quota.
    #[serde(rename = "quota")]
    Quota,
    /// The renewal cadence.
    #[serde(rename = "cadence")]
    Cadence,
    /// The window multiplier.
    #[serde(rename = "multiplier")]
    Multiplier,
}

/// The candidate values of one edit action. Absent fields are untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemEdit {
    /// New item kind, if edited.
    pub kind: Option<String>,
    /// New quota, if edited.
    pub quota: Option<u32>,
    /// New cadence, if edited.
    pub cadence: Option<Cadence>,
    /// New multiplier, if edited.
    pub multiplier: Option<u32>,
}

/// A staged, partial edit for one list index.
///
/// Only fields that actually differ from the original item are retained;
/// `changed_fields` names them. `is_new` marks a patch that stages a
/// brand-new item at an index past the end of the base list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AllocationPatch {
    /// New item kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// New quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u32>,
    /// New cadence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Cadence>,
    /// New multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,
    /// The fields this patch changes relative to the original item.
    #[serde(rename = "_changedFields", default)]
    pub changed_fields: BTreeSet<ItemField>,
    /// Whether this patch stages a brand-new item.
    #[serde(rename = "_isNew", default)]
    pub is_new: bool,
}

impl AllocationPatch {
    /// Overwrites `item`'s fields with this patch's present fields.
    pub fn merge_into(&self, item: &mut AllotmentItem) {
        if let Some(kind) = &self.kind {
            item.kind.clone_from(kind);
        }
        if let Some(quota) = self.quota {
            item.quota = quota;
        }
        if let Some(cadence) = self.cadence {
            item.cadence = cadence;
        }
        if let Some(multiplier) = self.multiplier {
            item.multiplier = multiplier;
        }
    }

    /// Materializes a brand-new item from this patch, filling absent
    /// fields with the defaults for a freshly added row.
    #[must_use]
    pub fn to_new_item(&self) -> AllotmentItem {
        AllotmentItem::new(
            self.kind.clone().unwrap_or_else(|| String::from("New Item")),
            self.quota.unwrap_or(1),
            self.cadence.unwrap_or(Cadence::Monthly),
            self.multiplier.unwrap_or(1),
        )
    }
}

/// A snapshot of the pending patch set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StagedChanges {
    /// Pending edits keyed by list index.
    pub updates: BTreeMap<usize, AllocationPatch>,
    /// Indices marked for removal.
    pub removes: BTreeSet<usize>,
}

impl StagedChanges {
    /// Whether anything is staged at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removes.is_empty()
    }
}

/// The staging area for item-list edits, mirrored into a session store.
#[derive(Debug)]
pub struct StagingArea<S: SessionStore> {
    updates: BTreeMap<usize, AllocationPatch>,
    removes: BTreeSet<usize>,
    store: S,
}

impl<S: SessionStore> StagingArea<S> {
    /// Creates a staging area, rehydrating any patch set the store holds.
    ///
    /// A corrupt or absent stored copy degrades to an empty patch set;
    /// staging is a convenience layer and must never block a load.
    #[must_use]
    pub fn load(store: S) -> Self {
        let updates = store
            .get(STAGED_UPDATES_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let removes = store
            .get(STAGED_REMOVES_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            updates,
            removes,
            store,
        }
    }

    /// Stages an edit for the item at `index`, merging into any pending
    /// patch for that index.
    ///
    /// Each candidate field is diffed against the *original* item: a field
    /// whose new value equals the original is dropped from the patch, so
    /// editing and then reverting leaves no residual diff. A non-new patch
    /// whose changed-set empties is deleted entirely.
    pub fn stage_edit(&mut self, index: usize, edit: ItemEdit, base: &[AllotmentItem]) {
        let mut patch = self.updates.remove(&index).unwrap_or_default();
        if edit.kind.is_some() {
            patch.kind = edit.kind;
        }
        if edit.quota.is_some() {
            patch.quota = edit.quota;
        }
        if edit.cadence.is_some() {
            patch.cadence = edit.cadence;
        }
        if edit.multiplier.is_some() {
            patch.multiplier = edit.multiplier;
        }

        if let Some(original) = base.get(index) {
            diff_field(
                &mut patch.kind,
                &original.kind,
                ItemField::Kind,
                &mut patch.changed_fields,
            );
            diff_field(
                &mut patch.quota,
                &original.quota,
                ItemField::Quota,
                &mut patch.changed_fields,
            );
            diff_field(
                &mut patch.cadence,
                &original.cadence,
                ItemField::Cadence,
                &mut patch.changed_fields,
            );
            diff_field(
                &mut patch.multiplier,
                &original.multiplier,
                ItemField::Multiplier,
                &mut patch.changed_fields,
            );
            if patch.changed_fields.is_empty() && !patch.is_new {
                self.save();
                return;
            }
        } else {
            // Past the end of the base list: this stages a brand-new item,
            // and every present field counts as changed.
            patch.is_new = true;
            patch.changed_fields.clear();
            if patch.kind.is_some() {
                patch.changed_fields.insert(ItemField::Kind);
            }
            if patch.quota.is_some() {
                patch.changed_fields.insert(ItemField::Quota);
            }
            if patch.cadence.is_some() {
                patch.changed_fields.insert(ItemField::Cadence);
            }
            if patch.multiplier.is_some() {
                patch.changed_fields.insert(ItemField::Multiplier);
            }
        }

        self.updates.insert(index, patch);
        self.save();
    }

    /// Marks the item at `index` for removal, discarding any pending edit.
    pub fn stage_remove(&mut self, index: usize) {
        self.removes.insert(index);
        self.updates.remove(&index);
        self.save();
    }

    /// A snapshot of everything currently staged.
    #[must_use]
    pub fn staged_changes(&self) -> StagedChanges {
        StagedChanges {
            updates: self.updates.clone(),
            removes: self.removes.clone(),
        }
    }

    /// Whether anything is staged at all.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.updates.is_empty() || !self.removes.is_empty()
    }

    /// Consumes the staging area, handing its session store back for the
    /// next [`StagingArea::load`] to rehydrate from.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Clears the patch set and its persisted mirror. Called on commit.
    pub fn clear(&mut self) {
        self.updates.clear();
        self.removes.clear();
        self.store.remove(STAGED_UPDATES_KEY);
        self.store.remove(STAGED_REMOVES_KEY);
    }

    /// Mirrors the in-memory patch set into the session store.
    fn save(&mut self) {
        if let Ok(raw) = serde_json::to_string(&self.updates) {
            self.store.set(STAGED_UPDATES_KEY, &raw);
        }
        if let Ok(raw) = serde_json::to_string(&self.removes) {
            self.store.set(STAGED_REMOVES_KEY, &raw);
        }
    }
}

/// Drops a staged field that matches the original value; records a real
/// difference in the changed-set.
fn diff_field<T: PartialEq>(
    slot: &mut Option<T>,
    original: &T,
    field: ItemField,
    changed: &mut BTreeSet<ItemField>,
) {
    match slot {
        Some(value) if value == original => {
            *slot = None;
            changed.remove(&field);
        }
        Some(_) => {
            changed.insert(field);
        }
        None => {
            changed.remove(&field);
        }
    }
}
