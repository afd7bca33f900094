//! Page view builders
//!
//! Each page maps store queries to a plain view struct that a front end can
//! render without touching the store itself.

pub mod dashboard;
pub mod generate;
pub mod scan;
pub mod sessions;
pub mod students;

/// Attendance percentage, `None` when nothing was expected
pub fn attendance_rate(attended: u64, expected: u64) -> Option<f64> {
    (expected > 0).then(|| attended as f64 * 100.0 / expected as f64)
}

/// Render a rate the way every page shows it
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{rate:.1}%"),
        None => "N/A".to_string(),
    }
}

/// Case-insensitive substring match over any of `fields`; a blank term matches all
pub(crate) fn search_matches<'a>(term: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || fields
            .into_iter()
            .any(|field| field.to_lowercase().contains(&term))
}
