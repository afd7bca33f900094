//! Student roster model

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student who can check into sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    /// Externally assigned identifier (e.g. "STU001")
    pub identifier: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    /// Enrollment time
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(identifier: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier,
            name,
            email: None,
            phone: None,
            department: None,
            year: None,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Form input for adding a student
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub identifier: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub year: String,
}

impl NewStudent {
    /// Trim every field, mapping blank optional fields to `None`
    pub fn into_student(self, now: DateTime<Utc>) -> Student {
        fn optional(value: String) -> Option<String> {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        Student {
            id: Uuid::new_v4(),
            identifier: self.identifier.trim().to_string(),
            name: self.name.trim().to_string(),
            email: optional(self.email),
            phone: optional(self.phone),
            department: optional(self.department),
            year: optional(self.year),
            created_at: now.trunc_subsecs(3),
        }
    }
}
