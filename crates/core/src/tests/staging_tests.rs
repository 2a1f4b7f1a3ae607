// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{MapStore, base_items};
use crate::{
    ItemEdit, ItemField, STAGED_REMOVES_KEY, STAGED_UPDATES_KEY, SessionStore, StagingArea,
};
use allot_domain::Cadence;

#[test]
fn test_stage_edit_records_changed_fields() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );

    let changes = staging.staged_changes();
    let patch = &changes.updates[&1];
    assert_eq!(patch.quota, Some(5));
    assert!(patch.changed_fields.contains(&ItemField::Quota));
    assert!(!patch.is_new);
}

#[test]
fn test_stage_edit_merges_into_pending_patch() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_edit(
        1,
        ItemEdit {
            cadence: Some(Cadence::Weekly),
            ..ItemEdit::default()
        },
        &base,
    );

    let changes = staging.staged_changes();
    let patch = &changes.updates[&1];
    assert_eq!(patch.quota, Some(5));
    assert_eq!(patch.cadence, Some(Cadence::Weekly));
    assert_eq!(patch.changed_fields.len(), 2);
}

#[test]
fn test_edit_then_revert_removes_the_patch() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );
    assert!(staging.has_pending());

    // Staging the original value back leaves no residual diff.
    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(2),
            ..ItemEdit::default()
        },
        &base,
    );
    assert!(!staging.has_pending());
    assert!(!staging.staged_changes().updates.contains_key(&1));
}

#[test]
fn test_partial_revert_keeps_remaining_diff() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(5),
            cadence: Some(Cadence::Weekly),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(2),
            ..ItemEdit::default()
        },
        &base,
    );

    let changes = staging.staged_changes();
    let patch = &changes.updates[&1];
    assert_eq!(patch.quota, None);
    assert_eq!(patch.cadence, Some(Cadence::Weekly));
    assert_eq!(patch.changed_fields.len(), 1);
    assert!(patch.changed_fields.contains(&ItemField::Cadence));
}

#[test]
fn test_edit_past_end_stages_new_item() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        base.len(),
        ItemEdit {
            kind: Some(String::from("Coffee")),
            ..ItemEdit::default()
        },
        &base,
    );

    let changes = staging.staged_changes();
    let patch = &changes.updates[&base.len()];
    assert!(patch.is_new);
    assert_eq!(patch.kind.as_deref(), Some("Coffee"));
}

#[test]
fn test_new_item_patch_survives_reverted_fields() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    let index = base.len();

    // A new-item patch with no fields still marks the row as staged.
    staging.stage_edit(index, ItemEdit::default(), &base);
    assert!(staging.staged_changes().updates[&index].is_new);
}

#[test]
fn test_stage_remove_discards_pending_edit() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());

    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(9),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_remove(0);

    let changes = staging.staged_changes();
    assert!(changes.removes.contains(&0));
    assert!(!changes.updates.contains_key(&0));
}

#[test]
fn test_staging_rehydrates_from_the_store() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_edit(
        1,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_remove(2);

    // Every mutation writes through, so a fresh area sees the patch set.
    let store = staging.into_store();
    assert!(store.raw(STAGED_UPDATES_KEY).is_some());

    let rehydrated = StagingArea::load(store);
    let changes = rehydrated.staged_changes();
    assert_eq!(changes.updates[&1].quota, Some(5));
    assert!(changes.removes.contains(&2));
}

#[test]
fn test_corrupt_store_degrades_to_empty() {
    let mut store = MapStore::default();
    store.set(STAGED_UPDATES_KEY, "{definitely not json");
    store.set(STAGED_REMOVES_KEY, "[1,");

    let staging = StagingArea::load(store);
    assert!(!staging.has_pending());
}

#[test]
fn test_clear_wipes_memory_and_store() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(9),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.clear();

    assert!(!staging.has_pending());
    assert!(staging.staged_changes().is_empty());
}

#[test]
fn test_patch_serialization_uses_session_field_names() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_edit(
        0,
        ItemEdit {
            kind: Some(String::from("Dessert")),
            ..ItemEdit::default()
        },
        &base,
    );

    let json = serde_json::to_string(&staging.staged_changes().updates).unwrap();
    assert!(json.contains(r#""_changedFields":["type"]"#));
    assert!(json.contains(r#""_isNew":false"#));
}
