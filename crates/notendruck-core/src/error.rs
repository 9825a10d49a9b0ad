// SPDX-License-Identifier: MIT
//
// Unified error types for Notendruck.

use thiserror::Error;

/// Top-level error type for all Notendruck operations.
#[derive(Debug, Error)]
pub enum NotendruckError {
    // -- Asset errors --
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    // -- Compositing errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("QR encoding failed: {0}")]
    Qr(String),

    #[error("invalid date: {0}")]
    Date(String),

    // -- Object store --
    #[error("object store error: {0}")]
    Store(String),

    // -- Startup --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotendruckError>;
