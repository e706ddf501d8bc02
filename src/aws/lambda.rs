//! Lambda control plane client (REST API version 2015-03-31).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{endpoint, error_message, Credentials, SignedClient};
use crate::error::{DeployError, Result};
use crate::remote::{CodeRef, FunctionControlPlane, FunctionDescriptor, FunctionSpec};

pub const API_VERSION: &str = "2015-03-31";
const SERVICE: &str = "lambda";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionCode {
    #[serde(skip_serializing_if = "Option::is_none")]
    zip_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    s3_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    s3_key: Option<String>,
}

impl From<&CodeRef> for FunctionCode {
    fn from(code: &CodeRef) -> Self {
        match code {
            CodeRef::ZipFile(bytes) => Self {
                zip_file: Some(BASE64.encode(bytes)),
                s3_bucket: None,
                s3_key: None,
            },
            CodeRef::S3 { bucket, key } => Self {
                zip_file: None,
                s3_bucket: Some(bucket.clone()),
                s3_key: Some(key.clone()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateFunctionRequest<'a> {
    function_name: &'a str,
    handler: &'a str,
    role: &'a str,
    runtime: &'a str,
    code: FunctionCode,
}

#[derive(Debug, Deserialize)]
struct ListFunctionsResponse {
    #[serde(rename = "Functions", default)]
    functions: Vec<FunctionDescriptor>,
}

/// Lambda REST client.
pub struct LambdaClient {
    client: SignedClient,
    endpoint: Url,
}

impl LambdaClient {
    /// Create a client for `region`, optionally against a custom endpoint.
    pub fn new(
        http: Client,
        credentials: Credentials,
        region: &str,
        endpoint_override: Option<&str>,
    ) -> Result<Self> {
        let endpoint = endpoint(
            endpoint_override,
            format!("https://lambda.{}.amazonaws.com", region),
        )?;
        Ok(Self {
            client: SignedClient::new(http, credentials, region, SERVICE),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL for `/2015-03-31/functions/<segments...>`.
    fn functions_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| DeployError::Config(format!("invalid Lambda endpoint: {}", self.endpoint)))?
            .clear()
            .extend([API_VERSION, "functions"])
            .extend(segments);
        Ok(url)
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<Response> {
        let response = self
            .client
            .send(method, url, headers, body, DeployError::RemoteService)
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    if status == StatusCode::NOT_FOUND {
        Err(DeployError::NotFound(message))
    } else {
        Err(DeployError::RemoteService(format!(
            "Lambda request failed ({}): {}",
            status.as_u16(),
            message
        )))
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| DeployError::RemoteService(format!("unexpected Lambda response: {}", e)))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| DeployError::RemoteService(format!("failed to encode request: {}", e)))
}

pub(crate) fn create_request_body(spec: &FunctionSpec) -> Result<Vec<u8>> {
    encode(&CreateFunctionRequest {
        function_name: &spec.name,
        handler: &spec.handler,
        role: &spec.role,
        runtime: &spec.runtime,
        code: FunctionCode::from(&spec.code),
    })
}

pub(crate) fn update_code_body(code: &CodeRef) -> Result<Vec<u8>> {
    encode(&FunctionCode::from(code))
}

const JSON: (&str, &str) = ("content-type", "application/json");

#[async_trait]
impl FunctionControlPlane for LambdaClient {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionDescriptor> {
        let url = self.functions_url(&[])?;
        let response = self
            .call(Method::POST, url, &[JSON], create_request_body(spec)?)
            .await?;
        parse_json(response).await
    }

    async fn update_function_code(
        &self,
        name: &str,
        code: &CodeRef,
    ) -> Result<FunctionDescriptor> {
        let url = self.functions_url(&[name, "code"])?;
        let response = self
            .call(Method::PUT, url, &[JSON], update_code_body(code)?)
            .await?;
        parse_json(response).await
    }

    async fn list_functions(&self, limit: usize) -> Result<Vec<FunctionDescriptor>> {
        let mut url = self.functions_url(&[""])?;
        url.query_pairs_mut()
            .append_pair("MaxItems", &limit.to_string());
        let response = self.call(Method::GET, url, &[], Vec::new()).await?;
        let list: ListFunctionsResponse = parse_json(response).await?;
        Ok(list.functions)
    }

    async fn invoke(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.functions_url(&[name, "invocations"])?;
        let response = self
            .call(
                Method::POST,
                url,
                &[("x-amz-invocation-type", "RequestResponse")],
                Vec::new(),
            )
            .await?;

        let function_error = response
            .headers()
            .get("x-amz-function-error")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let payload = response
            .bytes()
            .await
            .map_err(|e| DeployError::RemoteService(format!("failed to read payload: {}", e)))?;

        if let Some(kind) = function_error {
            return Err(DeployError::RemoteService(format!(
                "function {} failed ({}): {}",
                name,
                kind,
                String::from_utf8_lossy(&payload)
            )));
        }
        Ok(payload.to_vec())
    }
}
