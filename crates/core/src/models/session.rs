//! Attendance session model

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::QrPayload;
use crate::error::Result;

/// One scheduled attendance-taking event, identified by a human-chosen code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Human-chosen session identifier (e.g. "CS-101-2024-001")
    pub code: String,
    pub name: String,
    /// Stored "accepting scans" flag, authoritative only until expiry
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub description: Option<String>,
    /// Encoded QR content; never changes while the session is active
    pub qr_payload: String,
    pub created_by: Option<String>,
}

impl Session {
    /// Build a new active session, encoding its payload at `now`.
    ///
    /// Without an explicit expiry the session closes `duration_minutes`
    /// after creation.
    pub fn new(
        code: String,
        name: String,
        duration_minutes: u32,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        // Stored timestamps keep millisecond precision
        let now = now.trunc_subsecs(3);
        let qr_payload = QrPayload::new(&code, &name, duration_minutes, now).encode()?;
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            name,
            is_active: true,
            created_at: now,
            expires_at: Some(
                expires_at
                    .map(|t| t.trunc_subsecs(3))
                    .unwrap_or(now + Duration::minutes(i64::from(duration_minutes))),
            ),
            duration_minutes,
            description: None,
            qr_payload,
            created_by: None,
        })
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_creator(mut self, created_by: String) -> Self {
        self.created_by = Some(created_by);
        self
    }
}

/// Display status of a session, derived on every read and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Upcoming,
    Active,
    Completed,
}

impl SessionStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "Upcoming",
            SessionStatus::Active => "Active",
            SessionStatus::Completed => "Completed",
        }
    }

    /// Whether attendance is expected for a session in this state
    pub fn is_held(&self) -> bool {
        !matches!(self, SessionStatus::Upcoming)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Filter, order and limit for session listings
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    /// Only rows with this code
    pub code: Option<String>,
    /// Only rows whose stored flag is set
    pub active_only: bool,
    /// Newest first when false
    pub oldest_first: bool,
    pub limit: Option<u32>,
}

impl SessionQuery {
    pub fn newest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}
