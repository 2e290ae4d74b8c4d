// crates/judgment-gate-cli/src/api.rs
// ============================================================================
// Module: Pipeline API Client
// Description: HTTP adapters binding the judgment gate to the pipeline API.
// Purpose: Load executions, operators, and grants; submit judgments.
// Dependencies: judgment-gate-core, judgment-gate-config, reqwest, serde
// ============================================================================

//! ## Overview
//! [`GateApiClient`] talks to the pipeline API over HTTP with bearer auth,
//! connect/request timeouts, and a hard cap on response bodies. It implements
//! [`PermissionDirectory`] directly; [`ApiJudgmentTransport`] wraps it to
//! implement [`JudgmentTransport`] on behalf of one operator.
//! Response bodies are untrusted input and are size-checked before decoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use judgment_gate_config::ApiConfig;
use judgment_gate_core::ApplicationName;
use judgment_gate_core::DirectoryError;
use judgment_gate_core::ExecutionId;
use judgment_gate_core::JudgmentDecision;
use judgment_gate_core::JudgmentRequest;
use judgment_gate_core::JudgmentTransport;
use judgment_gate_core::PermissionDirectory;
use judgment_gate_core::PipelineExecution;
use judgment_gate_core::RoleGrantSet;
use judgment_gate_core::TransportError;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Authenticated operator returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    /// Operator login name.
    pub username: String,
    /// Roles held by the operator.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Application record; only the permission attributes are decoded.
#[derive(Debug, Deserialize)]
struct ApplicationRecord {
    /// Application attributes.
    #[serde(default)]
    attributes: Option<ApplicationAttributes>,
}

/// Application attributes carrying role grants.
#[derive(Debug, Deserialize)]
struct ApplicationAttributes {
    /// Permission-kind to role grants.
    #[serde(default)]
    permissions: Option<RoleGrantSet>,
}

/// Stage update body recording a judgment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JudgmentPatch<'a> {
    /// Decision being recorded.
    judgment_status: JudgmentDecision,
    /// Selected option value.
    judgment_input: Option<&'a str>,
    /// Freeform text.
    judgment_freeform_input: Option<&'a str>,
    /// Operator recording the judgment.
    last_modified_by: Option<&'a str>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline API failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the body could not be read.
    #[error("pipeline api request failed: {0}")]
    Http(String),
    /// API answered with an unexpected status.
    #[error("pipeline api returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// Response body could not be decoded.
    #[error("pipeline api response invalid: {0}")]
    Decode(String),
    /// Response body exceeded the configured limit.
    #[error("pipeline api response exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Client configuration is unusable.
    #[error("pipeline api client config invalid: {0}")]
    Config(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the pipeline API.
///
/// # Invariants
/// - Request paths are built from percent-encoded segments appended to the
///   base URL, so identifiers never alter the query, fragment, or hierarchy.
pub struct GateApiClient {
    /// Parsed API base URL.
    base_url: Url,
    /// Default headers, including bearer auth when configured.
    headers: HeaderMap,
    /// Maximum accepted response size in bytes.
    max_response_bytes: usize,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl GateApiClient {
    /// Builds a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the base URL is invalid or cannot
    /// carry a path, or when the HTTP client or auth header cannot be built.
    pub fn new(
        base_url: &str,
        bearer_token: Option<&str>,
        connect_timeout: Duration,
        request_timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiError::Config(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config("base url cannot carry a path".to_string()));
        }
        let mut headers = HeaderMap::new();
        if let Some(token) = bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("invalid bearer token".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        Ok(Self {
            base_url,
            headers,
            max_response_bytes,
            client,
        })
    }

    /// Builds a client from validated API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when no base URL is configured or the
    /// client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url =
            config.require_base_url().map_err(|err| ApiError::Config(err.to_string()))?;
        Self::new(
            base_url,
            config.bearer_token.as_deref(),
            config.connect_timeout(),
            config.request_timeout(),
            config.max_response_bytes,
        )
    }

    /// Fetches the role grants of `application`.
    ///
    /// Returns `None` when the application is unknown or carries no
    /// permission attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failures.
    pub async fn fetch_permissions(
        &self,
        application: &ApplicationName,
    ) -> Result<Option<RoleGrantSet>, ApiError> {
        let url = self.endpoint(&["applications", application.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: ApplicationRecord = self.decode(response).await?;
        Ok(record.attributes.and_then(|attributes| attributes.permissions))
    }

    /// Fetches the authenticated operator.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failures.
    pub async fn authenticated_operator(&self) -> Result<Operator, ApiError> {
        let url = self.endpoint(&["auth", "user"])?;
        let response = self.send(self.client.get(url)).await?;
        self.decode(response).await
    }

    /// Fetches a pipeline execution with its stages.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failures.
    pub async fn execution(&self, execution_id: &ExecutionId) -> Result<PipelineExecution, ApiError> {
        let url = self.endpoint(&["pipelines", execution_id.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        self.decode(response).await
    }

    /// Records a judgment on a stage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is not accepted.
    pub async fn record_judgment(
        &self,
        request: &JudgmentRequest,
        last_modified_by: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&[
            "pipelines",
            request.execution_id.as_str(),
            "stages",
            request.stage_id.as_str(),
        ])?;
        let body = JudgmentPatch {
            judgment_status: request.decision,
            judgment_input: request.selected_option.as_deref(),
            judgment_freeform_input: request.freeform_text.as_deref(),
            last_modified_by,
        };
        let response = self.send(self.client.patch(url).json(&body)).await?;
        ensure_success(&response)
    }

    /// Appends percent-encoded `segments` to the base URL path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request with the default headers.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|err| ApiError::Http(err.to_string()))
    }

    /// Checks status, reads a bounded body, and decodes JSON.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        ensure_success(&response)?;
        let body = read_body_limited(response, self.max_response_bytes).await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PermissionDirectory for GateApiClient {
    async fn application_permissions(
        &self,
        application: &ApplicationName,
    ) -> Result<Option<RoleGrantSet>, DirectoryError> {
        self.fetch_permissions(application).await.map_err(|err| match err {
            ApiError::Decode(message) => DirectoryError::Invalid(message),
            other => DirectoryError::Unavailable(other.to_string()),
        })
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Judgment transport backed by the pipeline API.
pub struct ApiJudgmentTransport {
    /// Shared API client.
    client: Arc<GateApiClient>,
    /// Operator recorded as the last modifier.
    operator: Option<String>,
}

impl ApiJudgmentTransport {
    /// Creates a transport submitting on behalf of `operator`.
    #[must_use]
    pub const fn new(client: Arc<GateApiClient>, operator: Option<String>) -> Self {
        Self {
            client,
            operator,
        }
    }
}

#[async_trait]
impl JudgmentTransport for ApiJudgmentTransport {
    async fn submit(&self, request: &JudgmentRequest) -> Result<(), TransportError> {
        self.client.record_judgment(request, self.operator.as_deref()).await.map_err(
            |err| match err {
                rejected @ ApiError::Status {
                    ..
                } => TransportError::Rejected(rejected.to_string()),
                other => TransportError::Unavailable(other.to_string()),
            },
        )
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps non-success statuses to [`ApiError::Status`].
fn ensure_success(response: &Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

/// Reads a response body while enforcing a hard size limit.
async fn read_body_limited(mut response: Response, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let limit = u64::try_from(max_bytes).map_err(|_| ApiError::TooLarge {
        limit: max_bytes,
    })?;
    if let Some(expected) = response.content_length()
        && expected > limit
    {
        return Err(ApiError::TooLarge {
            limit: max_bytes,
        });
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|err| ApiError::Http(err.to_string()))? {
        if body.len().saturating_add(chunk.len()) > max_bytes {
            return Err(ApiError::TooLarge {
                limit: max_bytes,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
