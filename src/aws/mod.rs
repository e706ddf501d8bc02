//! AWS implementations of the remote interfaces.
//!
//! - `credentials` - static access keys
//! - `sigv4` - request signing
//! - `lambda` - function control plane over the Lambda REST API
//! - `s3` - object upload

mod credentials;
pub mod lambda;
pub mod s3;
pub mod sigv4;

pub use credentials::{Credentials, CredentialsFile};
pub use lambda::LambdaClient;
pub use s3::S3Client;

use chrono::Utc;
use reqwest::{Client, Method, Response, Url};

use crate::config::Config;
use crate::error::{DeployError, Result};
use sigv4::RequestSigner;

/// Build both clients from configuration.
pub fn clients(config: &Config) -> Result<(LambdaClient, S3Client)> {
    let credentials = config.credentials()?.clone();
    let http = Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| DeployError::Config(format!("failed to build HTTP client: {}", e)))?;

    let lambda = LambdaClient::new(
        http.clone(),
        credentials.clone(),
        &config.region,
        config.lambda_endpoint.as_deref(),
    )?;
    let s3 = S3Client::new(
        http,
        credentials,
        &config.region,
        config.s3_endpoint.as_deref(),
    )?;
    Ok((lambda, s3))
}

/// HTTP client that signs every request for one service.
#[derive(Clone)]
pub(crate) struct SignedClient {
    http: Client,
    credentials: Credentials,
    region: String,
    service: &'static str,
}

impl SignedClient {
    pub(crate) fn new(
        http: Client,
        credentials: Credentials,
        region: &str,
        service: &'static str,
    ) -> Self {
        Self {
            http,
            credentials,
            region: region.to_string(),
            service,
        }
    }

    /// Sign and send. Transport failures are wrapped with `transport`.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
        body: Vec<u8>,
        transport: fn(String) -> DeployError,
    ) -> Result<Response> {
        let signer = RequestSigner::new(&self.credentials, &self.region, self.service);
        let auth = signer.sign(method.as_str(), &url, headers, &body, Utc::now())?;

        tracing::debug!("{} {}", method, url);
        let mut request = self.http.request(method, url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        for (name, value) in auth {
            request = request.header(name, value);
        }
        request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                transport(format!("request timed out: {}", e))
            } else {
                transport(format!("HTTP request failed: {}", e))
            }
        })
    }
}

/// Parse an endpoint override, or fall back to the default URL.
pub(crate) fn endpoint(override_url: Option<&str>, default: String) -> Result<Url> {
    let raw = override_url.map(str::to_string).unwrap_or(default);
    Url::parse(&raw).map_err(|e| DeployError::Config(format!("invalid endpoint '{}': {}", raw, e)))
}

/// Pull a readable message out of an AWS JSON or XML error body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let kind = value
            .get("Type")
            .or_else(|| value.get("__type"))
            .and_then(|v| v.as_str());
        let message = value
            .get("message")
            .or_else(|| value.get("Message"))
            .and_then(|v| v.as_str());
        match (kind, message) {
            (Some(kind), Some(message)) => return format!("{}: {}", kind, message),
            (None, Some(message)) => return message.to_string(),
            _ => {}
        }
    }
    if let Some(message) = xml_element(body, "Message") {
        return match xml_element(body, "Code") {
            Some(code) => format!("{}: {}", code, message),
            None => message,
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

fn xml_element(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_string())
}
