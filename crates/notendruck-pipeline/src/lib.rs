// SPDX-License-Identifier: MIT
//
// notendruck-pipeline — batch orchestration for printable generation.
//
// Drives the compositor across every template type for one event,
// aggregates per-item outcomes, and supports retrying only the failed
// subset.

pub mod orchestrator;

pub use orchestrator::{Pipeline, PrintableItemConfig};
