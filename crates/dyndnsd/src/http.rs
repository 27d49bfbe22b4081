//! HTTP front end of the update endpoint
//!
//! Extracts the four request inputs (credentials, hostname, addresses) plus
//! the caller's address, hands them to the pipeline and writes the encoded
//! outcome back as `text/plain`.
//!
//! Credentials come from HTTP Basic auth; the `username` and `password`
//! query parameters are used when the header is missing or empty.

use axum::extract::{ConnectInfo, Query, State};
use axum::http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use dyndns_core::address::raw_address_list;
use dyndns_core::{
    AuthProviderRegistry, EncodedResponse, ServiceConfig, UpdateOutcome, UpdatePipeline,
    UpdateRequest,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// Body sent while no usable configuration exists
pub const NOT_CONFIGURED: &str = "System not configured!";

/// Query parameters of an update request
///
/// Built from the raw key/value pairs so that a repeated key never rejects
/// the request: the last occurrence wins, and unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateParams {
    /// Fallback account name
    pub username: Option<String>,
    /// Fallback password
    pub password: Option<String>,
    /// Hostname to update
    pub hostname: Option<String>,
    /// Comma-separated addresses
    pub ipaddresses: Option<String>,
}

impl UpdateParams {
    /// Fold query pairs in order
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "username" => &mut params.username,
                "password" => &mut params.password,
                "hostname" => &mut params.hostname,
                "ipaddresses" => &mut params.ipaddresses,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

enum Readiness {
    Ready(UpdatePipeline),
    Misconfigured(String),
}

/// Shared handler state
///
/// A misconfigured service still answers requests, each with a 500 and the
/// reason, so the problem is visible to clients as well as in the log.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Readiness>,
}

impl AppState {
    /// State serving requests through `pipeline`
    pub fn ready(pipeline: UpdatePipeline) -> Self {
        Self {
            inner: Arc::new(Readiness::Ready(pipeline)),
        }
    }

    /// State answering every request with a 500 and `reason`
    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Readiness::Misconfigured(reason.into())),
        }
    }

    /// Load the configuration file and build the pipeline
    ///
    /// Never fails: configuration problems produce a misconfigured state.
    pub fn from_config_path(path: &Path, registry: &AuthProviderRegistry) -> Self {
        if !path.exists() {
            error!("Configuration file {} does not exist", path.display());
            return Self::misconfigured(NOT_CONFIGURED);
        }

        let config = match ServiceConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                return Self::misconfigured(NOT_CONFIGURED);
            }
        };

        Self::from_config(&config, registry)
    }

    /// Build the pipeline from an already loaded configuration
    pub fn from_config(config: &ServiceConfig, registry: &AuthProviderRegistry) -> Self {
        if !registry.contains(&config.auth_provider) {
            error!(
                "Unknown user provider '{}' (registered: {:?})",
                config.auth_provider,
                registry.list()
            );
            return Self::misconfigured(format!(
                "No such user provider: {}",
                config.auth_provider
            ));
        }

        match UpdatePipeline::from_config(config, registry) {
            Ok(pipeline) => Self::ready(pipeline),
            Err(e) => {
                error!("Failed to build update pipeline: {}", e);
                Self::misconfigured(NOT_CONFIGURED)
            }
        }
    }

    /// True when requests are processed
    pub fn is_ready(&self) -> bool {
        matches!(*self.inner, Readiness::Ready(_))
    }
}

/// Build the router serving `/nic/update` and `/`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/nic/update", get(update))
        .route("/", get(update))
        .with_state(state)
}

async fn update(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = UpdateParams::from_pairs(pairs);
    let caller = peer.ip().to_canonical().to_string();

    let pipeline = match &*state.inner {
        Readiness::Ready(pipeline) => pipeline,
        Readiness::Misconfigured(reason) => {
            return ProtocolResponse(UpdateOutcome::Misconfigured(reason.clone()).encode(&caller))
                .into_response();
        }
    };

    let (header_user, header_password) = auth
        .map(|TypedHeader(Authorization(basic))| {
            (basic.username().to_string(), basic.password().to_string())
        })
        .unwrap_or_default();

    let request = UpdateRequest::new(
        first_non_empty(header_user, params.username),
        first_non_empty(header_password, params.password),
        params.hostname.unwrap_or_default(),
        raw_address_list(params.ipaddresses.as_deref(), &caller),
    );

    let outcome = pipeline.process(&request).await;
    let encoded = outcome.encode(&caller);
    debug!(
        "{} {} -> {} {}",
        caller, request.hostname, encoded.status, encoded.body
    );

    ProtocolResponse(encoded).into_response()
}

/// `primary` unless it is empty, then `fallback`
fn first_non_empty(primary: String, fallback: Option<String>) -> String {
    if primary.is_empty() {
        fallback.unwrap_or_default()
    } else {
        primary
    }
}

/// Axum adapter for [`EncodedResponse`]
pub struct ProtocolResponse(pub EncodedResponse);

impl IntoResponse for ProtocolResponse {
    fn into_response(self) -> Response {
        let encoded = self.0;
        let status =
            StatusCode::from_u16(encoded.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, encoded.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        if encoded.challenge
            && let Ok(value) = HeaderValue::from_str(&EncodedResponse::challenge_header())
        {
            headers.insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}
