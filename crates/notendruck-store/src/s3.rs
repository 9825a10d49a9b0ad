// SPDX-License-Identifier: MIT
//
// S3-compatible object store backend.
//
// Works against AWS S3 directly or against Cloudflare R2 via a custom
// endpoint URL (R2 requires path-style addressing, hence
// `force_path_style` whenever an endpoint override is present).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use notendruck_core::config::StoreConfig;
use notendruck_core::error::{NotendruckError, Result};
use tracing::{debug, info};

use crate::object_store::ObjectStore;

/// Object store backed by an S3-compatible bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from the service configuration.
    ///
    /// Credentials come from the standard AWS environment/profile chain.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        info!(bucket = %config.bucket, custom_endpoint = config.endpoint_url.is_some(), "S3 store ready");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn store_err(operation: &str, key: &str, err: impl std::fmt::Display) -> NotendruckError {
    NotendruckError::Store(format!("{operation} {key}: {err}"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|err| store_err("read body of", key, err))?;
                let bytes = data.into_bytes().to_vec();
                debug!(key, bytes = bytes.len(), "object fetched");
                Ok(Some(bytes))
            }
            Err(err) => {
                if let SdkError::ServiceError(service) = &err
                    && service.err().is_no_such_key()
                {
                    return Ok(None);
                }
                Err(store_err("get", key, DisplayErrorContext(&err)))
            }
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let len = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| store_err("put", key, DisplayErrorContext(&err)))?;

        debug!(key, bytes = len, "object stored");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(_) => Ok(true),
            Err(err) => {
                if let SdkError::ServiceError(service) = &err
                    && service.err().is_not_found()
                {
                    return Ok(false);
                }
                Err(store_err("head", key, DisplayErrorContext(&err)))
            }
        }
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, from))
            .key(to)
            .send()
            .await
            .map_err(|err| store_err("copy", from, DisplayErrorContext(&err)))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| store_err("delete", key, DisplayErrorContext(&err)))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|err| store_err("presign", key, err))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| store_err("presign", key, DisplayErrorContext(&err)))?;

        Ok(request.uri().to_string())
    }
}
