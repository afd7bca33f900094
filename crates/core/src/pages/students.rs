//! Student roster page

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use super::{attendance_rate, search_matches};
use crate::error::{Error, Result};
use crate::invariants::assert_student_invariants;
use crate::models::{NewStudent, Student};
use crate::storage::Storage;

/// How a student's attendance rate reads at a glance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    Good,
    Fair,
    Poor,
    NoData,
}

impl RateBand {
    pub fn for_rate(rate: Option<f64>) -> Self {
        match rate {
            Some(rate) if rate >= 95.0 => RateBand::Good,
            Some(rate) if rate >= 85.0 => RateBand::Fair,
            Some(_) => RateBand::Poor,
            None => RateBand::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    pub student: Student,
    pub attended: u64,
    /// Sessions opened since the student enrolled
    pub held: u64,
    pub rate: Option<f64>,
    pub band: RateBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentsView {
    pub total: u64,
    pub rows: Vec<StudentRow>,
}

/// Roster filtered by name, identifier, email or department
pub fn load<R>(repo: &R, search: &str) -> Result<StudentsView>
where
    R: Storage + ?Sized,
{
    let mut rows = Vec::new();

    for student in repo.list_students(None)? {
        let matches = search_matches(
            search,
            [
                student.name.as_str(),
                student.identifier.as_str(),
                student.email.as_deref().unwrap_or_default(),
                student.department.as_deref().unwrap_or_default(),
            ],
        );
        if !matches {
            continue;
        }

        let attended = repo.count_attendance_for_student(student.id)?;
        // A session opened just before enrollment can still be attended
        let held = repo.count_sessions_since(student.created_at)?.max(attended);
        let rate = attendance_rate(attended, held);

        rows.push(StudentRow {
            student,
            attended,
            held,
            rate,
            band: RateBand::for_rate(rate),
        });
    }

    Ok(StudentsView {
        total: repo.count_students()?,
        rows,
    })
}

/// Validate and add a student
#[instrument(skip(repo, form), fields(identifier = %form.identifier))]
pub fn add<R>(repo: &R, form: NewStudent, now: DateTime<Utc>) -> Result<Student>
where
    R: Storage + ?Sized,
{
    if form.identifier.trim().is_empty() || form.name.trim().is_empty() {
        return Err(Error::Validation(
            "Please fill in student ID and name".to_string(),
        ));
    }

    let student = form.into_student(now);
    assert_student_invariants(&student);

    if repo.find_student_by_identifier(&student.identifier)?.is_some() {
        return Err(Error::InvalidOperation(format!(
            "Student {} already exists",
            student.identifier
        )));
    }

    repo.create_student(&student)?;
    info!(student_id = %student.id, "Added student");
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{issue_qr, GenerateRequest};
    use crate::models::AttendanceRecord;
    use crate::storage::Database;
    use chrono::Duration;

    fn form(identifier: &str, name: &str, department: &str) -> NewStudent {
        NewStudent {
            identifier: identifier.to_string(),
            name: name.to_string(),
            email: format!("{}@university.edu", identifier.to_lowercase()),
            department: department.to_string(),
            ..NewStudent::default()
        }
    }

    #[test]
    fn test_add_validates_and_trims() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        assert!(add(&db, form(" ", "John Doe", ""), now)
            .unwrap_err()
            .is_validation());

        let added = add(&db, form(" STU001 ", " John Doe ", ""), now).unwrap();
        assert_eq!(added.identifier, "STU001");
        assert_eq!(added.name, "John Doe");
        assert_eq!(added.department, None);
        assert_eq!(added.phone, None);

        assert!(matches!(
            add(&db, form("STU001", "Again", ""), now),
            Err(Error::InvalidOperation(_))
        ));
        assert_eq!(db.students().count().unwrap(), 1);
    }

    #[test]
    fn test_roster_rates_and_bands() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let enrolled = now - Duration::days(3);

        let john = add(&db, form("STU001", "John Doe", "Computer Science"), enrolled).unwrap();
        add(&db, form("STU002", "Jane Smith", "Mathematics"), enrolled).unwrap();

        for (i, code) in ["A", "B"].iter().enumerate() {
            let request = GenerateRequest {
                code: code.to_string(),
                name: format!("Session {code}"),
                duration_minutes: 60,
                ..GenerateRequest::default()
            };
            let at = now - Duration::days(2) + Duration::hours(i as i64);
            let session = issue_qr(&db, &request, at).unwrap().session().clone();
            db.attendance()
                .record(&AttendanceRecord::new(john.id, session.id, at))
                .unwrap();
        }

        let view = load(&db, "").unwrap();
        assert_eq!(view.total, 2);

        let john_row = view.rows.iter().find(|r| r.student.identifier == "STU001").unwrap();
        assert_eq!((john_row.attended, john_row.held), (2, 2));
        assert_eq!(john_row.band, RateBand::Good);

        let jane_row = view.rows.iter().find(|r| r.student.identifier == "STU002").unwrap();
        assert_eq!(jane_row.rate, Some(0.0));
        assert_eq!(jane_row.band, RateBand::Poor);
    }

    #[test]
    fn test_roster_search() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        add(&db, form("STU001", "John Doe", "Computer Science"), now).unwrap();
        add(&db, form("STU002", "Jane Smith", "Mathematics"), now).unwrap();

        let view = load(&db, "MATH").unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].student.name, "Jane Smith");
        assert_eq!(view.rows[0].band, RateBand::NoData);

        assert_eq!(load(&db, "stu001@").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_rate_bands() {
        assert_eq!(RateBand::for_rate(Some(95.0)), RateBand::Good);
        assert_eq!(RateBand::for_rate(Some(89.6)), RateBand::Fair);
        assert_eq!(RateBand::for_rate(Some(84.9)), RateBand::Poor);
        assert_eq!(RateBand::for_rate(None), RateBand::NoData);
    }
}
