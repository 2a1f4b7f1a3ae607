// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::MemorySessionStore;
use allot::{ItemEdit, SessionStore, StagingArea};
use allot_domain::{AllotmentItem, Cadence};

#[test]
fn test_store_get_set_remove() {
    let mut store = MemorySessionStore::new();
    assert!(store.is_empty());

    store.set("key", "value");
    assert_eq!(store.get("key").as_deref(), Some("value"));
    assert_eq!(store.len(), 1);

    store.set("key", "replaced");
    assert_eq!(store.get("key").as_deref(), Some("replaced"));

    store.remove("key");
    assert_eq!(store.get("key"), None);
    assert!(store.is_empty());
}

#[test]
fn test_staging_area_persists_through_the_store() {
    let base = vec![AllotmentItem::new(
        String::from("Soda"),
        2,
        Cadence::Monthly,
        1,
    )];

    let mut staging = StagingArea::load(MemorySessionStore::new());
    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );

    // Simulate a page reload within the same session.
    let store = staging.into_store();
    let rehydrated = StagingArea::load(store);
    assert_eq!(rehydrated.staged_changes().updates[&0].quota, Some(5));
}

#[test]
fn test_commit_clears_the_persisted_mirror() {
    let base = vec![AllotmentItem::new(
        String::from("Soda"),
        2,
        Cadence::Monthly,
        1,
    )];

    let mut staging = StagingArea::load(MemorySessionStore::new());
    staging.stage_edit(
        0,
        ItemEdit {
            quota: Some(5),
            ..ItemEdit::default()
        },
        &base,
    );
    staging.clear();

    let store = staging.into_store();
    assert!(store.is_empty());
}
