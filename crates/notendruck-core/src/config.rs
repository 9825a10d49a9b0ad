// SPDX-License-Identifier: MIT
//
// Service configuration, read from the environment at startup.
//
// A missing bucket name is the one failure class that aborts immediately:
// without a bucket the service cannot fetch templates or store output, so
// construction fails fast instead of degrading per-item.

use serde::{Deserialize, Serialize};

use crate::error::{NotendruckError, Result};

/// Object store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bucket holding templates, fonts, and generated printables.
    pub bucket: String,
    /// Custom endpoint URL for S3-compatible stores (e.g. Cloudflare R2).
    /// `None` means plain AWS S3.
    pub endpoint_url: Option<String>,
    /// Region string; R2 accepts "auto".
    pub region: String,
}

impl StoreConfig {
    /// Read the store configuration from the environment.
    ///
    /// `NOTENDRUCK_BUCKET` is required; `NOTENDRUCK_S3_ENDPOINT` and
    /// `NOTENDRUCK_S3_REGION` are optional.
    pub fn from_env() -> Result<Self> {
        let bucket = std::env::var("NOTENDRUCK_BUCKET")
            .map_err(|_| NotendruckError::Config("NOTENDRUCK_BUCKET is not set".into()))?;
        if bucket.trim().is_empty() {
            return Err(NotendruckError::Config("NOTENDRUCK_BUCKET is empty".into()));
        }

        Ok(Self {
            bucket,
            endpoint_url: std::env::var("NOTENDRUCK_S3_ENDPOINT").ok(),
            region: std::env::var("NOTENDRUCK_S3_REGION").unwrap_or_else(|_| "auto".into()),
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API binds to.
    pub listen_addr: String,
    /// Public domain used to build QR target URLs (`https://{domain}/e/{code}`).
    pub public_domain: String,
    /// Allowed CORS origin for the admin UI, if any.
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let public_domain = std::env::var("NOTENDRUCK_PUBLIC_DOMAIN")
            .map_err(|_| NotendruckError::Config("NOTENDRUCK_PUBLIC_DOMAIN is not set".into()))?;

        Ok(Self {
            listen_addr: std::env::var("NOTENDRUCK_LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".into()),
            public_domain,
            cors_origin: std::env::var("NOTENDRUCK_CORS_ORIGIN").ok(),
        })
    }

    /// QR target URL for an event access code.
    pub fn event_url(&self, access_code: &str) -> String {
        format!("https://{}/e/{}", self.public_domain, access_code)
    }
}
