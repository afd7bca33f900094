//! Data models for QR Attend

mod attendance;
mod payload;
mod session;
mod student;

pub use attendance::*;
pub use payload::*;
pub use session::*;
pub use student::*;
