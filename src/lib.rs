pub mod error;
pub mod logfile;
pub mod middleware;
pub mod request_id;

pub use error::AuditError;
pub use logfile::AuditLog;
pub use middleware::logging::request_audit;
pub use request_id::RequestId;
