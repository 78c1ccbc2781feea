// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `audit`: audit event persistence
//! - `bookings`: booking and container rows, `persist_intake`, `persist_transition`
//! - `dispatch`: trip creation with the container claim, vendor confirmation
//! - `operators`: operators and sessions
//! - `receipts`: duplicate submission receipts
//! - `registry`: clients, places, vehicles and vendors
//!
//! Functions here never open transactions themselves; workflow writes are
//! wrapped by `UnitOfWork`.

pub mod audit;
pub mod bookings;
pub mod dispatch;
pub mod operators;
pub mod receipts;
pub mod registry;
