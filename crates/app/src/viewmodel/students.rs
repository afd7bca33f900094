//! Students view model

use std::sync::Arc;

use chrono::Utc;
use qrattend_core::pages::format_rate;
use qrattend_core::pages::students::{self, RateBand, StudentRow};
use qrattend_core::NewStudent;
use slint::ComponentHandle;

use super::{refresh_all, run_in_background, to_model};
use crate::state::AppState;
use crate::{MainWindow, StudentItem};

pub fn setup_student_bindings(window: &MainWindow, state: Arc<AppState>) {
    // Load roster
    let state_load = state.clone();
    let window_weak = window.as_weak();
    window.on_load_students(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let search = w.get_student_search().to_string();

        run_in_background(
            &state_load,
            &w,
            move |db, _| students::load(db, &search),
            |w, result| match result {
                Ok(view) => {
                    let items: Vec<StudentItem> = view.rows.iter().map(student_item).collect();
                    w.set_students_summary(
                        format!("Showing {} of {} students", items.len(), view.total).into(),
                    );
                    w.set_students(to_model(items));
                }
                Err(e) => {
                    tracing::error!("Failed to load students: {}", e);
                    w.set_students_notice(format!("Could not load students: {e}").into());
                }
            },
        );
    });

    // Add student
    let window_weak = window.as_weak();
    window.on_add_student(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let form = NewStudent {
            identifier: w.get_new_student_id().to_string(),
            name: w.get_new_student_name().to_string(),
            email: w.get_new_student_email().to_string(),
            phone: w.get_new_student_phone().to_string(),
            department: w.get_new_student_department().to_string(),
            year: w.get_new_student_year().to_string(),
        };

        run_in_background(
            &state,
            &w,
            move |db, _| students::add(db, form, Utc::now()),
            |w, result| match result {
                Ok(student) => {
                    w.set_students_notice(format!("Added {}", student.name).into());
                    w.set_new_student_id("".into());
                    w.set_new_student_name("".into());
                    w.set_new_student_email("".into());
                    w.set_new_student_phone("".into());
                    w.set_new_student_department("".into());
                    w.set_new_student_year("".into());
                    refresh_all(w);
                }
                Err(e) => w.set_students_notice(e.to_string().into()),
            },
        );
    });
}

fn student_item(row: &StudentRow) -> StudentItem {
    let student = &row.student;
    let contact = [student.email.as_deref(), student.phone.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" • ");

    StudentItem {
        identifier: student.identifier.clone().into(),
        name: student.name.clone().into(),
        contact: contact.into(),
        department: student.department.clone().unwrap_or_default().into(),
        year: student.year.clone().unwrap_or_default().into(),
        attendance: format!("{}/{} sessions", row.attended, row.held).into(),
        rate: format_rate(row.rate).into(),
        band: band_label(row.band).into(),
    }
}

fn band_label(band: RateBand) -> &'static str {
    match band {
        RateBand::Good => "Good",
        RateBand::Fair => "Fair",
        RateBand::Poor => "Needs attention",
        RateBand::NoData => "No sessions yet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrattend_core::Student;

    #[test]
    fn test_student_item() {
        let mut student = Student::new("STU001".to_string(), "John Doe".to_string());
        student.email = Some("john.doe@university.edu".to_string());
        student.phone = Some("+1 (555) 123-4567".to_string());
        student.department = Some("Computer Science".to_string());

        let row = StudentRow {
            student,
            attended: 43,
            held: 45,
            rate: Some(95.6),
            band: RateBand::Good,
        };

        let item = student_item(&row);
        assert_eq!(item.contact, "john.doe@university.edu • +1 (555) 123-4567");
        assert_eq!(item.year, "");
        assert_eq!(item.attendance, "43/45 sessions");
        assert_eq!(item.rate, "95.6%");
        assert_eq!(item.band, "Good");
    }
}
