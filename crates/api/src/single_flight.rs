// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Single-flight coalescing for load operations.
//!
//! Several UI components request allocation state near-simultaneously on
//! mount; only one backend round-trip should happen. Callers that arrive
//! while a load is pending await the same shared future. Once it settles
//! the handle is cleared, so the next call starts a fresh load.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

type SharedFuture<T> = Shared<BoxFuture<'static, T>>;

/// Lifecycle state of the guard: idle (`pending` empty) or pending.
struct Slot<T: Clone> {
    /// Bumped each time a new load is installed, so a caller that settles
    /// late never evicts a successor's pending load.
    generation: u64,
    pending: Option<SharedFuture<T>>,
}

/// Coalesces concurrent calls into at most one in-flight operation.
pub(crate) struct LoadGuard<T: Clone> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> LoadGuard<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slot: Mutex::const_new(Slot {
                generation: 0,
                pending: None,
            }),
        }
    }

    /// Runs `make()` single-flight: if a load is already pending, awaits
    /// and returns its shared result instead of starting another.
    pub(crate) async fn run<F>(&self, make: F) -> T
    where
        F: FnOnce() -> BoxFuture<'static, T>,
    {
        let (generation, future) = {
            let mut slot = self.slot.lock().await;
            if let Some(pending) = slot.pending.clone() {
                (slot.generation, pending)
            } else {
                slot.generation += 1;
                let fresh = make().shared();
                slot.pending = Some(fresh.clone());
                (slot.generation, fresh)
            }
        };

        let result = future.await;

        // Settled: clear the handle, but only for our own generation.
        let mut slot = self.slot.lock().await;
        if slot.generation == generation {
            slot.pending = None;
        }
        result
    }
}
