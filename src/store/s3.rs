//! S3-compatible object store.
//!
//! Talks to AWS S3 or any S3-compatible service (MinIO, RustFS) via a
//! custom endpoint with path-style addressing. Credentials come from the
//! standard AWS provider chain (environment, profile, instance role).

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use async_trait::async_trait;
use futures::StreamExt;
use galleria_common::media::content_type_for_key;

use super::{ObjectStore, ObjectStream, PutOutcome, StoreError};

/// Object store backed by an S3 bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    location_base: String,
}

impl S3ObjectStore {
    /// Build a client for `bucket`.
    ///
    /// `endpoint_url` switches the client to an S3-compatible service;
    /// such services usually also need `force_path_style`.
    pub async fn connect(
        bucket: String,
        region: Option<String>,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref region) = region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(ref url) = endpoint_url {
            loader = loader.endpoint_url(url.clone());
        }
        let shared = loader.load().await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(force_path_style)
                .build(),
        );

        let location_base = match endpoint_url {
            Some(url) => format!("{}/{}", url.trim_end_matches('/'), bucket),
            None => format!("https://{bucket}.s3.amazonaws.com"),
        };

        Self {
            client,
            bucket,
            location_base,
        }
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> StoreError {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<PutOutcome, StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type_for_key(key))
            .body(AwsByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        Ok(PutOutcome {
            location: format!("{}/{}", self.location_base, key),
        })
    }

    async fn get(&self, key: &str) -> Result<ObjectStream, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(service.to_string())
                }
            })?;

        let body = result
            .body
            .collect()
            .await
            .map_err(Self::map_aws_error)?
            .into_bytes();

        Ok(futures::stream::once(async move { Ok::<_, std::io::Error>(body) }).boxed())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(())
    }
}
