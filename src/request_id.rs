// src/request_id.rs
use std::fmt;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

/// Header carrying the per-request correlation id.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id for the current request.
///
/// Also inserted into the request extensions so downstream handlers can pull
/// it out with `Extension<RequestId>`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the correlation id for a request.
///
/// Reuses the client-supplied `X-Request-ID` value verbatim when present
/// (upstream callers and load balancers own uniqueness in that case),
/// otherwise generates a UUID v4 and injects it into the request headers so
/// downstream handlers observe the same id.
pub fn resolve(req: &mut Request) -> RequestId {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }

    let id = RequestId(id);
    req.extensions_mut().insert(id.clone());
    id
}
