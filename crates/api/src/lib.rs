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
    clippy::all
)]

mod error;
mod payload;
mod port;
mod service;
mod single_flight;

#[cfg(test)]
mod tests;

pub use error::{ApiError, ApiResult};
pub use payload::{AllotmentsDoc, AllotmentsPayload, RawAllotmentItem, normalize_items, unwrap_payload};
pub use port::{AllotmentBackend, BackendError};
pub use service::{AllotmentService, device_zone};
