//! QR Attend Core Library
//!
//! Models, storage, session status resolution, QR issuance and page view
//! builders for the QR attendance tracker.

pub mod config;
pub mod error;
pub mod invariants;
pub mod issue;
pub mod models;
pub mod pages;
pub mod status;
pub mod storage;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use issue::{issue_qr, GenerateRequest, Issued};
pub use models::*;
pub use status::{needs_deactivation, observe_status, resolve_status};
pub use storage::{
    AttendanceRepository, Database, GuardedInsert, SessionRepository, Storage, StudentRepository,
};
