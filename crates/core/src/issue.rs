//! QR issuance with duplicate-session protection
//!
//! A code may have at most one active session. Asking for a QR code while
//! one is active hands back the stored payload instead of minting a new
//! one; the store's conditional insert closes the gap between check and
//! insert.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::invariants::assert_session_invariants;
use crate::models::{Session, SessionStatus};
use crate::status::observe_status;
use crate::storage::{GuardedInsert, SessionRepository};

/// Request to generate a QR code for a session
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub code: String,
    pub name: String,
    pub duration_minutes: u32,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

impl GenerateRequest {
    /// Check required fields before any store call
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.name.trim().is_empty() || self.code.trim().is_empty() {
            return Err(Error::Validation(
                "Please fill in session name and ID".to_string(),
            ));
        }
        if self.duration_minutes == 0 {
            return Err(Error::Validation(
                "Session duration must be at least one minute".to_string(),
            ));
        }
        if let Some(expiry) = self.expires_at {
            if expiry <= now {
                return Err(Error::Validation(
                    "Expiry time must be in the future".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Result of a generation request
#[derive(Debug, Clone, PartialEq)]
pub enum Issued {
    /// A new session row and payload were created
    Created(Session),
    /// An active session already held this code; its payload is reused
    Existing(Session),
}

impl Issued {
    pub fn session(&self) -> &Session {
        match self {
            Issued::Created(s) | Issued::Existing(s) => s,
        }
    }

    pub fn payload(&self) -> &str {
        &self.session().qr_payload
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, Issued::Existing(_))
    }
}

/// Issue a QR code, reusing the payload of an active session with the same code
#[instrument(skip(repo, request), fields(code = %request.code))]
pub fn issue_qr<R>(repo: &R, request: &GenerateRequest, now: DateTime<Utc>) -> Result<Issued>
where
    R: SessionRepository + ?Sized,
{
    request.validate(now)?;
    let code = request.code.trim();

    if let Some(mut existing) = repo.find_active_session_by_code(code)? {
        // An expired session releases its code once the stale flag is cleared
        if observe_status(repo, &mut existing, now)? != SessionStatus::Completed {
            info!(session_id = %existing.id, "Reusing payload of active session");
            return Ok(Issued::Existing(existing));
        }
    }

    let mut session = Session::new(
        code.to_string(),
        request.name.trim().to_string(),
        request.duration_minutes,
        request.expires_at,
        now,
    )?;
    if let Some(description) = request.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            session = session.with_description(description.to_string());
        }
    }
    if let Some(created_by) = &request.created_by {
        session = session.with_creator(created_by.clone());
    }

    assert_session_invariants(&session);

    match repo.insert_session_guarded(&session)? {
        GuardedInsert::Inserted => {
            info!(session_id = %session.id, "Issued QR code for new session");
            Ok(Issued::Created(session))
        }
        GuardedInsert::Conflict(existing) => {
            info!(session_id = %existing.id, "Concurrent issuance won, reusing its payload");
            Ok(Issued::Existing(existing))
        }
    }
}
