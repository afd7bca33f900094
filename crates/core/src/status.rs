//! Session status resolution
//!
//! The display status of a session is never stored. It is recomputed from
//! the stored active flag, the optional expiry and the current time. The
//! stored flag is only authoritative until expiry passes; reading an
//! expired session through [`observe_status`] clears a stale flag.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::Result;
use crate::models::{Session, SessionStatus};
use crate::storage::SessionRepository;

/// Derive the display status.
///
/// - `Completed` when an expiry is present and already past
/// - `Active` when the flag is set and the expiry lies in the future
/// - `Upcoming` otherwise, including sessions without an expiry
pub fn resolve_status(
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SessionStatus {
    match expires_at {
        Some(expiry) if expiry < now => SessionStatus::Completed,
        Some(expiry) if is_active && expiry > now => SessionStatus::Active,
        _ => SessionStatus::Upcoming,
    }
}

/// Whether a session's stored flag is stale at `now`
pub fn needs_deactivation(session: &Session, now: DateTime<Utc>) -> bool {
    session.is_active
        && resolve_status(session.is_active, session.expires_at, now) == SessionStatus::Completed
}

/// Resolve a session's status, correcting a stale active flag in the store.
///
/// Issues at most one update per call and none once the flag is cleared.
/// On a failed update the error is returned and `session` is left as it was.
pub fn observe_status<R>(
    repo: &R,
    session: &mut Session,
    now: DateTime<Utc>,
) -> Result<SessionStatus>
where
    R: SessionRepository + ?Sized,
{
    if needs_deactivation(session, now) {
        warn!(
            session_id = %session.id,
            code = %session.code,
            "Session expired while still flagged active, deactivating"
        );
        repo.deactivate_session(session.id)?;
        session.is_active = false;
        return Ok(SessionStatus::Completed);
    }

    Ok(resolve_status(session.is_active, session.expires_at, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::SessionQuery;
    use crate::storage::{Database, GuardedInsert};
    use chrono::Duration;
    use std::cell::RefCell;
    use uuid::Uuid;

    /// Counts deactivation calls; everything else is unused by the resolver
    #[derive(Default)]
    struct CountingRepo {
        deactivated: RefCell<Vec<Uuid>>,
        fail: bool,
    }

    impl SessionRepository for CountingRepo {
        fn insert_session_guarded(&self, _: &Session) -> Result<GuardedInsert> {
            Ok(GuardedInsert::Inserted)
        }
        fn find_active_session_by_code(&self, _: &str) -> Result<Option<Session>> {
            Ok(None)
        }
        fn find_session_by_payload(&self, _: &str) -> Result<Option<Session>> {
            Ok(None)
        }
        fn list_sessions(&self, _: &SessionQuery) -> Result<Vec<Session>> {
            Ok(Vec::new())
        }
        fn deactivate_session(&self, session_id: Uuid) -> Result<()> {
            if self.fail {
                return Err(Error::InvalidOperation("store offline".into()));
            }
            self.deactivated.borrow_mut().push(session_id);
            Ok(())
        }
        fn count_sessions(&self) -> Result<u64> {
            Ok(0)
        }
        fn count_sessions_since(&self, _: DateTime<Utc>) -> Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_resolve_status_cases() {
        let now = Utc::now();

        assert_eq!(
            resolve_status(true, Some(now + Duration::minutes(10)), now),
            SessionStatus::Active
        );
        assert_eq!(
            resolve_status(true, Some(now - Duration::minutes(1)), now),
            SessionStatus::Completed
        );
        assert_eq!(resolve_status(false, None, now), SessionStatus::Upcoming);
    }

    #[test]
    fn test_resolve_status_truth_table() {
        let now = Utc::now();
        let past = Some(now - Duration::seconds(1));
        let future = Some(now + Duration::seconds(1));

        for is_active in [true, false] {
            for expiry in [None, past, future, Some(now)] {
                let status = resolve_status(is_active, expiry, now);

                let completed = matches!(expiry, Some(e) if e < now);
                let active = is_active && matches!(expiry, Some(e) if e > now);

                assert_eq!(status == SessionStatus::Completed, completed);
                assert_eq!(status == SessionStatus::Active, active);
                assert_eq!(status == SessionStatus::Upcoming, !completed && !active);
            }
        }
    }

    #[test]
    fn test_inactive_future_session_is_upcoming() {
        let now = Utc::now();
        assert_eq!(
            resolve_status(false, Some(now + Duration::hours(1)), now),
            SessionStatus::Upcoming
        );
    }

    #[test]
    fn test_observe_corrects_stale_flag_once() {
        let repo = CountingRepo::default();
        let created = Utc::now() - Duration::hours(2);
        let mut session = Session::new("CS-101".into(), "Intro".into(), 60, None, created).unwrap();
        let now = Utc::now();

        assert_eq!(
            observe_status(&repo, &mut session, now).unwrap(),
            SessionStatus::Completed
        );
        assert!(!session.is_active);

        // Observing again issues no further update
        assert_eq!(
            observe_status(&repo, &mut session, now).unwrap(),
            SessionStatus::Completed
        );
        assert_eq!(*repo.deactivated.borrow(), vec![session.id]);
    }

    #[test]
    fn test_observe_leaves_active_session_alone() {
        let repo = CountingRepo::default();
        let now = Utc::now();
        let mut session = Session::new("CS-101".into(), "Intro".into(), 60, None, now).unwrap();

        assert_eq!(
            observe_status(&repo, &mut session, now).unwrap(),
            SessionStatus::Active
        );
        assert!(session.is_active);
        assert!(repo.deactivated.borrow().is_empty());
    }

    #[test]
    fn test_observe_failed_correction_keeps_flag() {
        let repo = CountingRepo {
            fail: true,
            ..CountingRepo::default()
        };
        let created = Utc::now() - Duration::hours(2);
        let mut session = Session::new("CS-101".into(), "Intro".into(), 60, None, created).unwrap();

        assert!(observe_status(&repo, &mut session, Utc::now()).is_err());
        assert!(session.is_active);
    }

    #[test]
    fn test_observe_persists_correction() {
        let db = Database::open_in_memory().unwrap();
        let created = Utc::now() - Duration::hours(2);
        let mut session = Session::new("CS-101".into(), "Intro".into(), 60, None, created).unwrap();
        db.sessions().insert_guarded(&session).unwrap();

        assert!(needs_deactivation(&session, Utc::now()));
        observe_status(&db, &mut session, Utc::now()).unwrap();

        let stored = db.sessions().find_by_id(session.id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(db.sessions().find_active_by_code("CS-101").unwrap().is_none());
    }
}
