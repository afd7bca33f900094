//! Student storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{format_datetime, parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Student;

pub struct StudentStore<'a> {
    conn: &'a Connection,
}

impl<'a> StudentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Student> {
        Ok(Student {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            identifier: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            department: row.get(5)?,
            year: row.get(6)?,
            created_at: parse_datetime(&row.get::<_, String>(7)?)?,
        })
    }

    /// Create a new student
    #[instrument(skip(self, student), fields(identifier = %student.identifier))]
    pub fn create(&self, student: &Student) -> Result<()> {
        self.conn.execute(
            "INSERT INTO students (id, identifier, name, email, phone, department, year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                student.id.to_string(),
                student.identifier,
                student.name,
                student.email,
                student.phone,
                student.department,
                student.year,
                format_datetime(student.created_at),
            ],
        )?;
        Ok(())
    }

    /// Find student by identifier
    #[instrument(skip(self))]
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<Student>> {
        let student = self
            .conn
            .query_row(
                "SELECT id, identifier, name, email, phone, department, year, created_at
                 FROM students WHERE identifier = ?1",
                params![identifier],
                Self::map_row,
            )
            .optional()?;
        Ok(student)
    }

    /// List students by name
    pub fn list(&self, limit: Option<u32>) -> Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, identifier, name, email, phone, department, year, created_at
             FROM students ORDER BY name COLLATE NOCASE, identifier LIMIT ?1",
        )?;

        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);
        let students = stmt
            .query_map(params![limit], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(students)
    }

    /// Count all students
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count students enrolled at or before a point in time
    pub fn count_enrolled_by(&self, at: DateTime<Utc>) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM students WHERE created_at <= ?1",
            params![format_datetime(at)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::Duration;
    use tempfile::tempdir;

    fn student(identifier: &str, name: &str, enrolled: DateTime<Utc>) -> Student {
        let mut student = Student::new(identifier.to_string(), name.to_string());
        student.created_at = enrolled;
        student
    }

    #[test]
    fn test_create_and_find() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();

        let mut jane = Student::new("STU002".into(), "Jane Smith".into());
        jane.email = Some("jane.smith@university.edu".into());
        jane.department = Some("Mathematics".into());
        db.students().create(&jane).unwrap();

        let found = db.students().find_by_identifier("STU002").unwrap().unwrap();
        assert_eq!(found, jane);
        assert!(db.students().find_by_identifier("STU999").unwrap().is_none());
    }

    #[test]
    fn test_identifier_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.students()
            .create(&Student::new("STU001".into(), "John Doe".into()))
            .unwrap();
        assert!(db
            .students()
            .create(&Student::new("STU001".into(), "Someone Else".into()))
            .is_err());
    }

    #[test]
    fn test_list_and_enrollment_counts() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.students()
            .create(&student("STU003", "mike Johnson", now - Duration::days(30)))
            .unwrap();
        db.students()
            .create(&student("STU001", "John Doe", now - Duration::days(10)))
            .unwrap();
        db.students().create(&student("STU004", "Sarah Wilson", now)).unwrap();

        let names: Vec<_> = db
            .students()
            .list(None)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["John Doe", "mike Johnson", "Sarah Wilson"]);
        assert_eq!(db.students().list(Some(1)).unwrap().len(), 1);

        assert_eq!(db.students().count().unwrap(), 3);
        assert_eq!(
            db.students()
                .count_enrolled_by(now - Duration::days(5))
                .unwrap(),
            2
        );
    }
}
