// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::staging::StagedChanges;
use allot_domain::AllotmentItem;

/// Produces the working item list with every staged change applied.
///
/// The base list is never mutated: removed indices are skipped, pending
/// patches are merged into the survivors, and brand-new patches staged at
/// indices past the end of the base list are appended in index order with
/// defaults for any field the patch left unset.
#[must_use]
pub fn apply_staged(base: &[AllotmentItem], changes: &StagedChanges) -> Vec<AllotmentItem> {
    let mut working = Vec::with_capacity(base.len());
    for (index, item) in base.iter().enumerate() {
        if changes.removes.contains(&index) {
            continue;
        }
        let mut item = item.clone();
        if let Some(patch) = changes.updates.get(&index) {
            patch.merge_into(&mut item);
        }
        working.push(item);
    }

    for (index, patch) in &changes.updates {
        if *index >= base.len() && patch.is_new {
            working.push(patch.to_new_item());
        }
    }

    working
}
