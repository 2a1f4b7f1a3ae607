// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::raw_item;
use crate::{ApiError, AllotmentsPayload, normalize_items, unwrap_payload};
use allot_domain::{Cadence, DomainError, NormalizePolicy};

fn parse(json: &str) -> AllotmentsPayload {
    serde_json::from_str(json).unwrap()
}

const DOC: &str = r#"{"year":2024,"items":[{"type":"Soda","quota":2,"cadence":"weekly"}]}"#;

#[test]
fn test_unwrap_bare_document() {
    let doc = unwrap_payload(parse(DOC)).unwrap();
    assert_eq!(doc.year, Some(2024));
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].kind, "Soda");
}

#[test]
fn test_unwrap_data_wrapped_document() {
    let doc = unwrap_payload(parse(&format!(r#"{{"data":{DOC}}}"#))).unwrap();
    assert_eq!(doc.year, Some(2024));
    assert_eq!(doc.items.len(), 1);
}

#[test]
fn test_unwrap_array_wrapped_document() {
    let doc = unwrap_payload(parse(&format!("[{DOC}]"))).unwrap();
    assert_eq!(doc.year, Some(2024));
    assert_eq!(doc.items.len(), 1);
}

#[test]
fn test_unwrap_combined_nesting() {
    // An array wrapping a data wrapper has been seen in the wild.
    let doc = unwrap_payload(parse(&format!(r#"[{{"data":{DOC}}}]"#))).unwrap();
    assert_eq!(doc.items.len(), 1);
}

#[test]
fn test_unwrap_rejects_empty_array() {
    let result = unwrap_payload(parse("[]"));
    assert!(matches!(result, Err(ApiError::MalformedPayload { .. })));
}

#[test]
fn test_unwrap_rejects_absurd_nesting() {
    let json = format!(
        "{}{}{}",
        r#"{"data":"#.repeat(12),
        DOC,
        "}".repeat(12)
    );
    let result = unwrap_payload(parse(&json));
    assert!(matches!(result, Err(ApiError::MalformedPayload { .. })));
}

#[test]
fn test_empty_object_is_an_empty_document() {
    let doc = unwrap_payload(parse("{}")).unwrap();
    assert_eq!(doc.year, None);
    assert!(doc.items.is_empty());
}

#[test]
fn test_normalize_items_lenient_patches_bad_rows() {
    let raw = vec![
        raw_item("Soda", Some(2), "weekly", None),
        raw_item("Mystery", None, "sometimes", Some(2)),
    ];
    let items = normalize_items(raw, NormalizePolicy::Lenient).unwrap();

    assert_eq!(items[0].cadence, Cadence::Weekly);
    assert_eq!(items[0].multiplier, 1);
    assert_eq!(items[1].cadence, Cadence::Monthly);
    assert_eq!(items[1].quota, 0);
    assert_eq!(items[1].multiplier, 2);
}

#[test]
fn test_normalize_items_strict_rejects_unknown_cadence() {
    let raw = vec![raw_item("Mystery", Some(1), "sometimes", None)];
    let result = normalize_items(raw, NormalizePolicy::Strict);
    assert!(matches!(
        result,
        Err(ApiError::Domain(DomainError::UnknownCadence(_)))
    ));
}

#[test]
fn test_normalize_items_strict_rejects_missing_quota() {
    let raw = vec![raw_item("Soda", None, "weekly", None)];
    let result = normalize_items(raw, NormalizePolicy::Strict);
    assert!(matches!(
        result,
        Err(ApiError::Domain(DomainError::MissingQuota { .. }))
    ));
}

#[test]
fn test_normalize_items_accepts_free_form_cadence_case() {
    let raw = vec![raw_item("Soda", Some(1), "WEEK", None)];
    let items = normalize_items(raw, NormalizePolicy::Strict).unwrap();
    assert_eq!(items[0].cadence, Cadence::Weekly);
}
