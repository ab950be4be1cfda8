// crates/spinnaker-provider-gate/src/client.rs
// ============================================================================
// Module: Gate HTTP Client
// Description: Blocking Gate client for tasks and resource documents.
// Purpose: Translate gateway calls into bounded HTTP requests.
// Dependencies: spinnaker-provider-config, spinnaker-provider-core, reqwest, tracing
// ============================================================================

//! ## Overview
//! Tasks are submitted with `POST /tasks` and polled with `GET /tasks/{id}`.
//! Documents are read from the application, project, pipeline, and template
//! endpoints; `404 Not Found` maps to an absent document. Redirects are not
//! followed and response bodies are read up to [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use spinnaker_provider_config::GateConfig;
use spinnaker_provider_config::ProviderConfig;
use spinnaker_provider_core::ConfigTree;
use spinnaker_provider_core::GatewayError;
use spinnaker_provider_core::ResourceClient;
use spinnaker_provider_core::ResourceLocator;
use spinnaker_provider_core::ResourceReader;
use spinnaker_provider_core::TaskGateway;
use spinnaker_provider_core::TaskObservation;
use spinnaker_provider_core::TaskRef;
use spinnaker_provider_core::TaskRequest;
use spinnaker_provider_core::TaskTracker;
use tracing::debug;
use tracing::trace;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body accepted from Gate, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Maximum response excerpt carried in status errors.
const MAX_ERROR_EXCERPT: usize = 512;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking HTTP client for one Gate endpoint.
#[derive(Debug, Clone)]
pub struct GateClient {
    /// Base URL every request path is appended to.
    base: Url,
    /// Configured HTTP client.
    client: Client,
}

impl GateClient {
    /// Builds a client from Gate connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the endpoint or default
    /// headers are invalid or the HTTP client cannot be built.
    pub fn new(config: &GateConfig) -> Result<Self, GatewayError> {
        let base = config.endpoint_url().map_err(|err| GatewayError::Transport(err.to_string()))?;
        let headers = config.headers().map_err(|err| GatewayError::Transport(err.to_string()))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.ignore_cert_errors)
            .default_headers(header_map(&headers)?)
            .build()
            .map_err(|err| GatewayError::Transport(format!("http client build failed: {err}")))?;
        debug!(endpoint = %base, headers = headers.len(), "gate client configured");
        Ok(Self { base, client })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds a request URL from path segments and query pairs.
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Transport(format!("endpoint {} cannot take a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Sends a request and returns the status with the bounded body.
    fn execute(&self, request: RequestBuilder, url: &Url) -> Result<(StatusCode, Vec<u8>), GatewayError> {
        let mut response =
            request.send().map_err(|err| GatewayError::Transport(format!("request to {url} failed: {err}")))?;
        let status = response.status();
        let body = read_response_limited(&mut response, MAX_RESPONSE_BYTES)?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "gate responded");
        Ok((status, body))
    }

    /// Issues a GET and decodes a JSON document; `None` on 404.
    fn get_document(&self, url: &Url) -> Result<Option<ConfigTree>, GatewayError> {
        let (status, body) = self.execute(self.client.get(url.clone()), url)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(status, &body, url)?;
        decode(&body).map(Some)
    }
}

impl TaskGateway for GateClient {
    fn submit(&self, request: &TaskRequest) -> Result<TaskRef, GatewayError> {
        let url = self.url(&["tasks"], &[])?;
        let payload =
            request.to_tree().to_json_string().map_err(|err| GatewayError::Decode(err.to_string()))?;
        trace!(url = %url, payload = %payload, "submitting task to gate");
        let builder = self.client.post(url.clone()).header(CONTENT_TYPE, "application/json").body(payload);
        let (status, body) = self.execute(builder, &url)?;
        ensure_success(status, &body, &url)?;
        let response = decode(&body)?;
        TaskRef::from_response(&response).ok_or_else(|| GatewayError::TaskReference(excerpt(&body)))
    }

    fn poll(&self, task: &TaskRef) -> Result<TaskObservation, GatewayError> {
        let url = self.url(&["tasks", task.id().as_str()], &[])?;
        let (status, body) = self.execute(self.client.get(url.clone()), &url)?;
        ensure_success(status, &body, &url)?;
        let document = decode(&body)?;
        trace!(task = %task.id(), payload = %document, "task document");
        TaskObservation::from_tree(&document)
            .ok_or_else(|| GatewayError::Decode(format!("task {} has no status", task.id())))
    }
}

impl ResourceReader for GateClient {
    fn fetch(&self, locator: &ResourceLocator) -> Result<Option<ConfigTree>, GatewayError> {
        let url = match locator {
            ResourceLocator::Applications => self.url(&["applications"], &[])?,
            ResourceLocator::Application { name } => self.url(&["applications", name.as_str()], &[])?,
            ResourceLocator::Project { id } => self.url(&["projects", id.as_str()], &[])?,
            ResourceLocator::Pipelines { application } => {
                self.url(&["applications", application.as_str(), "pipelineConfigs"], &[])?
            }
            ResourceLocator::Pipeline { application, name } => {
                self.url(&["applications", application.as_str(), "pipelineConfigs", name.as_str()], &[])?
            }
            ResourceLocator::PipelineTemplate { id, tag: Some(tag) } => {
                self.url(&["v2", "pipelineTemplates", id.as_str()], &[("tag", tag.as_str())])?
            }
            ResourceLocator::PipelineTemplate { id, tag: None } => {
                self.url(&["v2", "pipelineTemplates", id.as_str()], &[])?
            }
        };
        debug!(resource = %locator, url = %url, "fetching resource");
        self.get_document(&url)
    }
}

/// Builds a resource client over Gate from the loaded configuration.
///
/// # Errors
///
/// Returns [`GatewayError::Transport`] when the Gate client cannot be built.
pub fn connect(config: &ProviderConfig) -> Result<ResourceClient<GateClient>, GatewayError> {
    let gate = GateClient::new(&config.gate)?;
    Ok(ResourceClient::new(TaskTracker::new(gate, config.task_policy())))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts parsed default headers into a header map.
fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, GatewayError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| GatewayError::Transport(format!("invalid default header name '{key}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| GatewayError::Transport(format!("invalid default header value for '{key}'")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Maps non-success statuses to [`GatewayError::Status`].
fn ensure_success(status: StatusCode, body: &[u8], url: &Url) -> Result<(), GatewayError> {
    if status.is_success() {
        return Ok(());
    }
    Err(GatewayError::Status { status: status.as_u16(), message: format!("{url}: {}", excerpt(body)) })
}

/// Decodes a JSON response body.
fn decode(body: &[u8]) -> Result<ConfigTree, GatewayError> {
    ConfigTree::from_json_slice(body).map_err(|err| GatewayError::Decode(err.to_string()))
}

/// Returns a bounded, lossy text excerpt of a response body.
fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut end = text.len().min(MAX_ERROR_EXCERPT);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, GatewayError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| GatewayError::Decode("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(GatewayError::Decode("gate response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| GatewayError::Transport(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(GatewayError::Decode("gate response exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
