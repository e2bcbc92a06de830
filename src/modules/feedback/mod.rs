//! Public feedback intake: messages, complaints and opinions.
//!
//! The three kinds share one table and one set of handlers; each is mounted on
//! its own path with the kind supplied as a request extension.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::FeedbackKind;
