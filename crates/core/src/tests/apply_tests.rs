// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{MapStore, base_items};
use crate::{ItemEdit, StagingArea, apply_staged};
use allot_domain::Cadence;

#[test]
fn test_apply_with_nothing_staged_is_identity() {
    let base = base_items();
    let staging = StagingArea::load(MapStore::default());
    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working, base);
}

#[test]
fn test_apply_merges_patches_into_survivors() {
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

    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working.len(), 3);
    assert_eq!(working[1].kind, "Soda");
    assert_eq!(working[1].quota, 5);
    assert_eq!(working[1].cadence, Cadence::Weekly);
    // Untouched fields keep their base values.
    assert_eq!(working[1].multiplier, 1);
}

#[test]
fn test_apply_skips_removed_indices() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_remove(0);

    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working.len(), 2);
    assert!(working.iter().all(|item| item.kind != "CheatMeal"));
}

#[test]
fn test_apply_appends_new_items_with_defaults() {
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

    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working.len(), 4);
    let coffee = &working[3];
    assert_eq!(coffee.kind, "Coffee");
    assert_eq!(coffee.quota, 1);
    assert_eq!(coffee.cadence, Cadence::Monthly);
    assert_eq!(coffee.multiplier, 1);
}

#[test]
fn test_apply_fully_defaulted_new_item() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_edit(base.len(), ItemEdit::default(), &base);

    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working[3].kind, "New Item");
}

#[test]
fn test_apply_combined_edit_remove_and_append() {
    let base = base_items();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_remove(2);
    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(3),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_edit(
        base.len(),
        ItemEdit {
            kind: Some(String::from("Coffee")),
            quota: Some(7),
            ..ItemEdit::default()
        },
        &base,
    );

    let working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(working.len(), 3);
    assert_eq!(working[0].kind, "CheatMeal");
    assert_eq!(working[0].quota, 3);
    assert_eq!(working[1].kind, "Soda");
    assert_eq!(working[2].kind, "Coffee");
    assert_eq!(working[2].quota, 7);
}

#[test]
fn test_apply_never_mutates_the_base_list() {
    let base = base_items();
    let snapshot = base.clone();
    let mut staging = StagingArea::load(MapStore::default());
    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(9),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.stage_remove(1);

    let _working = apply_staged(&base, &staging.staged_changes());
    assert_eq!(base, snapshot);
}
