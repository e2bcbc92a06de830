//! Deferred deletion workflow.
//!
//! Editors without the capability for a deletable resource file a
//! [`DeletionRequest`](model::DeletionRequest) instead of deleting. Admins
//! approve (dispatching through the [`DeletionRegistry`](registry::DeletionRegistry))
//! or reject it.

pub mod controller;
pub mod model;
pub mod registry;
pub mod router;
pub mod service;

pub use model::{DeletableKind, DeleteResponse, DeletionTarget};
pub use registry::DeletionRegistry;
pub use service::DeletionRequestService;
