// src/middleware/logging.rs
use std::fs::File;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tracing::{error, warn};

use crate::error::AuditError;
use crate::logfile::AuditLog;
use crate::request_id::{self, RequestId, X_REQUEST_ID};

/// Writes the end-of-request record and releases the audit file when dropped,
/// so both happen on every exit path, downstream panics included.
struct EndRecord {
    file: Option<File>,
    id: RequestId,
    status: StatusCode,
    timestamps: bool,
}

impl EndRecord {
    fn new(file: File, id: RequestId, timestamps: bool) -> Self {
        Self {
            file: Some(file),
            id,
            // Mirrors HTTP semantics: a handler that never sets a status
            // has answered 200.
            status: StatusCode::OK,
            timestamps,
        }
    }
}

impl Drop for EndRecord {
    fn drop(&mut self) {
        let Some(mut file) = self.file.take() else {
            return;
        };

        let line = if self.timestamps {
            format!(
                "{},{},{}\n",
                AuditLog::line_timestamp(Utc::now()),
                self.id,
                self.status.as_u16()
            )
        } else {
            format!("{},{}\n", self.id, self.status.as_u16())
        };

        if let Err(err) = file.write_all(line.as_bytes()) {
            let err = AuditError::WriteFailed(err);
            warn!(request_id = %self.id, %err, "audit end record lost");
        }
        if let Err(err) = file.sync_all() {
            let err = AuditError::CloseFailed(err);
            warn!(request_id = %self.id, %err, "audit file release failed");
        }
    }
}

/// Request audit middleware with correlation ID.
///
/// Appends one CSV start record (`id,remote_addr,method,uri`) to the current
/// UTC day's file before the downstream handler runs and one end record
/// (`id,status`) after it returns. With [`AuditLog::with_timestamps`] both
/// records gain a leading RFC-3339 UTC field.
///
/// Audit failures never reach the client: if the day's file cannot be opened
/// the request is served unlogged and the error goes to the process log.
pub async fn request_audit(
    State(audit): State<Arc<AuditLog>>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut file = match audit.open_today() {
        Ok(file) => file,
        Err(err) => {
            let err = AuditError::LogFileUnavailable(err);
            error!(%err, "serving request without audit record");
            return next.run(req).await;
        }
    };

    let id = request_id::resolve(&mut req);
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    let start = if audit.timestamps() {
        format!(
            "{},{},{},{},{}\n",
            AuditLog::line_timestamp(Utc::now()),
            id,
            remote_addr,
            req.method(),
            req.uri()
        )
    } else {
        format!("{},{},{},{}\n", id, remote_addr, req.method(), req.uri())
    };
    if let Err(err) = file.write_all(start.as_bytes()) {
        let err = AuditError::WriteFailed(err);
        warn!(request_id = %id, %err, "audit start record lost");
    }

    // Armed before delegation: the end record and file close run even if the
    // downstream handler panics or the request future is dropped.
    let mut guard = EndRecord::new(file, id.clone(), audit.timestamps());

    let mut response = next.run(req).await;
    guard.status = response.status();
    drop(guard);

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}
