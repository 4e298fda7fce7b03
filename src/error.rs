use thiserror::Error;

/// Failures the audit pipeline can hit while handling one request.
///
/// None of these ever turn into an HTTP response; the client always gets the
/// downstream handler's answer. They exist so operational problems show up in
/// the process log with a stable shape.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    LogFileUnavailable(#[source] std::io::Error),

    #[error("audit record write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("audit log close failed: {0}")]
    CloseFailed(#[source] std::io::Error),
}
