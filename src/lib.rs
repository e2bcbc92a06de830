//! # CourseHub API
//!
//! Backend for a university course portal, built on Axum and SQLite.
//!
//! Read endpoints are public. Every mutation is gated by a per-account
//! capability, and every deletion either happens immediately (caller holds
//! the capability) or is queued as a deletion request for an admin to approve
//! or reject. All mutations are written to the audit log.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── cli/              # create-admin / list-admins
//! ├── middleware/       # AuthUser, RequireAdmin, capability extractors, rate limiting
//! ├── modules/
//! │   ├── auth/               # login
//! │   ├── users/              # accounts, roles, capabilities
//! │   ├── courses/            # catalogue
//! │   ├── course_files/       # uploaded course material
//! │   ├── exams/
//! │   ├── schedule/           # timetable and class cancellations
//! │   ├── syllabus/
//! │   ├── notices/
//! │   ├── holidays/
//! │   ├── settings/           # welcome message, breaking news
//! │   ├── feedback/           # messages, complaints, opinions
//! │   ├── deletion_requests/  # approval workflow and handler registry
//! │   └── audit_logs/
//! └── ...
//! ```
//!
//! Each feature module has `controller.rs`, `service.rs`, `model.rs` and
//! `router.rs`.
//!
//! ## Roles
//!
//! | Role | Capabilities |
//! |------|--------------|
//! | `admin` | all, implicitly |
//! | `editor` | exactly those set to `true` in the account's permission map |
//!
//! The first admin is created with the CLI:
//!
//! ```bash
//! cargo run --bin coursehub-cli -- create-admin
//! ```
//!
//! ## Environment
//!
//! ```bash
//! DATABASE_URL=sqlite://data/coursehub.db?mode=rwc
//! JWT_SECRET=your-secure-secret-key
//! UPLOAD_DIR=./uploads
//! ```
//!
//! Swagger UI is served at `/swagger-ui` and Scalar at `/scalar`.

pub mod cli;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use coursehub_auth;
pub use coursehub_config;
pub use coursehub_core;
pub use coursehub_db;
