// SPDX-License-Identifier: MIT
//
// notendruck-store — Object store layer for templates, fonts, and
// generated printables. Production runs against an S3-compatible bucket
// (AWS S3 or Cloudflare R2); tests and local development use the
// in-memory backend.

pub mod assets;
pub mod health;
pub mod keys;
pub mod memory;
pub mod object_store;
pub mod retry;
pub mod s3;

pub use assets::AssetStore;
pub use health::{StoreHealth, run_health_check};
pub use memory::MemoryObjectStore;
pub use object_store::ObjectStore;
pub use retry::RetryConfig;
pub use s3::S3ObjectStore;
