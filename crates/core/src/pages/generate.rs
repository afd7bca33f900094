//! QR generation page

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::issue::{issue_qr, GenerateRequest, Issued};
use crate::storage::SessionRepository;

/// A selectable session length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationOption {
    pub minutes: u32,
    pub label: &'static str,
}

pub const DURATION_OPTIONS: [DurationOption; 6] = [
    DurationOption {
        minutes: 30,
        label: "30 minutes",
    },
    DurationOption {
        minutes: 45,
        label: "45 minutes",
    },
    DurationOption {
        minutes: 60,
        label: "1 hour",
    },
    DurationOption {
        minutes: 90,
        label: "1.5 hours",
    },
    DurationOption {
        minutes: 120,
        label: "2 hours",
    },
    DurationOption {
        minutes: 180,
        label: "3 hours",
    },
];

/// Pre-configured session setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub code_prefix: &'static str,
    pub duration_minutes: u32,
}

pub const TEMPLATES: [Template; 3] = [
    Template {
        name: "Morning Lecture",
        code_prefix: "LECTURE-AM",
        duration_minutes: 90,
    },
    Template {
        name: "Lab Session",
        code_prefix: "LAB-SESSION",
        duration_minutes: 180,
    },
    Template {
        name: "Tutorial",
        code_prefix: "TUTORIAL",
        duration_minutes: 60,
    },
];

const EXPIRY_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Form state of the generate page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateForm {
    pub name: String,
    pub code: String,
    pub duration_minutes: u32,
    /// Local time as typed, blank for "duration after creation"
    pub expiry: String,
    pub description: String,
}

impl GenerateForm {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            duration_minutes: config.default_duration_minutes,
            ..Self::default()
        }
    }

    /// Fill name, duration and a time-stamped code from a template
    pub fn apply_template(&mut self, template: &Template, now: DateTime<Utc>) {
        self.name = template.name.to_string();
        self.code = format!("{}-{}", template.code_prefix, now.timestamp_millis());
        self.duration_minutes = template.duration_minutes;
    }

    pub fn to_request(&self, created_by: Option<String>) -> Result<GenerateRequest> {
        let description = self.description.trim();
        Ok(GenerateRequest {
            code: self.code.clone(),
            name: self.name.clone(),
            duration_minutes: self.duration_minutes,
            description: (!description.is_empty()).then(|| description.to_string()),
            expires_at: parse_expiry(&self.expiry)?,
            created_by,
        })
    }
}

/// Parse a local `YYYY-MM-DD HH:MM` (or `T`-separated) time; blank means none
pub fn parse_expiry(text: &str) -> Result<Option<DateTime<Utc>>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let naive = EXPIRY_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| {
            Error::Validation(format!("Expiry time must look like 2024-01-15 17:30, got {text}"))
        })?;

    // Ambiguous local times (DST fold) take the earlier instant
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| Error::Validation(format!("Expiry time {text} does not exist locally")))?;

    Ok(Some(local.with_timezone(&Utc)))
}

/// Label for a duration, matching the option list where possible
pub fn duration_label(minutes: u32) -> String {
    DURATION_OPTIONS
        .iter()
        .find(|option| option.minutes == minutes)
        .map(|option| option.label.to_string())
        .unwrap_or_else(|| format!("{minutes} minutes"))
}

/// What the page shows after generation
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedView {
    pub payload: String,
    pub code: String,
    pub name: String,
    pub duration_minutes: u32,
    pub expires_at: Option<DateTime<Utc>>,
    /// The payload belongs to a session that was already active
    pub reused: bool,
}

impl From<Issued> for GeneratedView {
    fn from(issued: Issued) -> Self {
        let reused = issued.is_reused();
        let session = match issued {
            Issued::Created(s) | Issued::Existing(s) => s,
        };
        Self {
            payload: session.qr_payload,
            code: session.code,
            name: session.name,
            duration_minutes: session.duration_minutes,
            expires_at: session.expires_at,
            reused,
        }
    }
}

/// Submit the form
pub fn generate<R>(
    repo: &R,
    form: &GenerateForm,
    config: &SessionConfig,
    now: DateTime<Utc>,
) -> Result<GeneratedView>
where
    R: SessionRepository + ?Sized,
{
    let request = form.to_request(config.created_by.clone())?;
    Ok(issue_qr(repo, &request, now)?.into())
}
