// SPDX-License-Identifier: MIT
//
// Notendruck — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ServerConfig, StoreConfig};
pub use error::{NotendruckError, Result};
pub use types::*;
