// SPDX-License-Identifier: MIT
//
// notendruck-api — HTTP surface for the printable generation service.

pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use router::build_router;
pub use state::AppState;
