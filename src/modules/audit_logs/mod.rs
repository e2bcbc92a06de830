pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::AuditAction;
pub use service::AuditLogger;
