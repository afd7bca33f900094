//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Session, Student};

/// Validate that a session's state is internally consistent
pub fn assert_session_invariants(session: &Session) {
    debug_assert!(
        !session.code.trim().is_empty(),
        "Session {} has empty code",
        session.id
    );

    debug_assert!(
        !session.qr_payload.is_empty(),
        "Session {} has no QR payload",
        session.id
    );

    if let Some(expiry) = session.expires_at {
        debug_assert!(
            expiry >= session.created_at,
            "Session {} expires before it was created",
            session.id
        );
    }
}

/// Validate that a student is valid
pub fn assert_student_invariants(student: &Student) {
    debug_assert!(
        student.id != Uuid::nil(),
        "Student {} has nil id",
        student.identifier
    );

    debug_assert!(
        !student.identifier.trim().is_empty(),
        "Student {} has empty identifier",
        student.id
    );
}
