// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod staging;
mod state;

#[cfg(test)]
mod tests;

pub use apply::apply_staged;
pub use staging::{
    AllocationPatch, ItemEdit, ItemField, STAGED_REMOVES_KEY, STAGED_UPDATES_KEY, SessionStore,
    StagedChanges, StagingArea,
};
pub use state::AllocationState;
