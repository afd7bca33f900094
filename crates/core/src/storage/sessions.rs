//! Session storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::parse::{format_datetime, parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use super::traits::GuardedInsert;
use crate::error::{Error, Result};
use crate::models::{Session, SessionQuery};

const SESSION_COLUMNS: &str = "id, session_code, name, is_active, created_at, expires_at, \
     duration_minutes, description, qr_payload, created_by";

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Session> {
        Ok(Session {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            code: row.get(1)?,
            name: row.get(2)?,
            is_active: row.get::<_, i32>(3)? != 0,
            created_at: parse_datetime(&row.get::<_, String>(4)?)?,
            expires_at: parse_datetime_opt(row.get::<_, Option<String>>(5)?)?,
            duration_minutes: row.get(6)?,
            description: row.get(7)?,
            qr_payload: row.get(8)?,
            created_by: row.get(9)?,
        })
    }

    /// Insert unless an active session with the same code exists.
    ///
    /// Runs in one transaction; the partial unique index on active codes
    /// turns a concurrent duplicate into an ignored insert.
    #[instrument(skip(self, session), fields(code = %session.code))]
    pub fn insert_guarded(&self, session: &Session) -> Result<GuardedInsert> {
        let tx = self.conn.unchecked_transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO sessions (id, session_code, name, is_active, created_at, expires_at,
                                             duration_minutes, description, qr_payload, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                session.id.to_string(),
                session.code,
                session.name,
                session.is_active as i32,
                format_datetime(session.created_at),
                session.expires_at.map(format_datetime),
                session.duration_minutes,
                session.description,
                session.qr_payload,
                session.created_by,
            ],
        )?;

        let outcome = if inserted == 1 {
            GuardedInsert::Inserted
        } else {
            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_code = ?1 AND is_active = 1"
                    ),
                    params![session.code],
                    Self::map_row,
                )
                .optional()?;

            match existing {
                Some(existing) => GuardedInsert::Conflict(existing),
                // Ignored for a reason other than the active-code index
                None => {
                    return Err(Error::InvalidOperation(format!(
                        "Session {} could not be stored",
                        session.id
                    )))
                }
            }
        };

        tx.commit()?;
        debug!(?outcome, "Guarded session insert");
        Ok(outcome)
    }

    /// Find session by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![id.to_string()],
                Self::map_row,
            )
            .optional()?;
        Ok(session)
    }

    /// Find the active session for a code
    #[instrument(skip(self))]
    pub fn find_active_by_code(&self, code: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_code = ?1 AND is_active = 1"
                ),
                params![code],
                Self::map_row,
            )
            .optional()?;
        Ok(session)
    }

    /// Find session by exact QR payload
    pub fn find_by_payload(&self, payload: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions WHERE qr_payload = ?1
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![payload],
                Self::map_row,
            )
            .optional()?;
        Ok(session)
    }

    /// List sessions
    #[instrument(skip(self))]
    pub fn list(&self, query: &SessionQuery) -> Result<Vec<Session>> {
        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions");
        let mut conditions = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(code) = &query.code {
            values.push(code.clone());
            conditions.push(format!("session_code = ?{}", values.len()));
        }
        if query.active_only {
            conditions.push("is_active = 1".to_string());
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(if query.oldest_first {
            " ORDER BY created_at ASC"
        } else {
            " ORDER BY created_at DESC"
        });
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params_from_iter(values.iter()), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Clear the active flag
    #[instrument(skip(self))]
    pub fn deactivate(&self, session_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET is_active = 0 WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }

    /// Count all sessions
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count sessions created at or after a point in time
    pub fn count_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE created_at >= ?1",
            params![format_datetime(since)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
