//! S3 object upload.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use super::{endpoint, error_message, Credentials, SignedClient};
use crate::error::{DeployError, Result};
use crate::remote::{ObjectStore, StoredObject};

const SERVICE: &str = "s3";

/// Uploads objects with `PutObject`.
///
/// Uses virtual-hosted URLs against AWS and path-style URLs when an endpoint
/// override is configured (local S3-compatible services).
pub struct S3Client {
    client: SignedClient,
    region: String,
    endpoint_override: Option<Url>,
}

impl S3Client {
    pub fn new(
        http: Client,
        credentials: Credentials,
        region: &str,
        endpoint_override: Option<&str>,
    ) -> Result<Self> {
        let endpoint_override = endpoint_override
            .map(|url| endpoint(Some(url), String::new()))
            .transpose()?;
        Ok(Self {
            client: SignedClient::new(http, credentials, region, SERVICE),
            region: region.to_string(),
            endpoint_override,
        })
    }

    /// URL of `key` in `bucket`.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        let mut url = match &self.endpoint_override {
            Some(base) => base.clone(),
            None => endpoint(
                None,
                format!("https://{}.s3.{}.amazonaws.com", bucket, self.region),
            )?,
        };
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DeployError::Config("S3 endpoint cannot hold a path".to_string()))?;
            segments.clear();
            if self.endpoint_override.is_some() {
                segments.push(bucket);
            }
            segments.extend(key.split('/'));
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<StoredObject> {
        let url = self.object_url(bucket, key)?;
        let length = body.len();
        let response = self
            .client
            .send(
                Method::PUT,
                url,
                &[("content-type", "application/zip")],
                body,
                DeployError::Storage,
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DeployError::Storage(format!(
                "upload of s3://{}/{} failed ({}): {}",
                bucket,
                key,
                status.as_u16(),
                error_message(&text)
            )));
        }

        tracing::debug!("uploaded {} bytes to s3://{}/{}", length, bucket, key);
        Ok(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}
