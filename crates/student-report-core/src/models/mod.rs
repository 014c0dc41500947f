//! Data models for upstream entities.
//!
//! - `Student`: the record rendered into a report
//! - `StudentId`: validated numeric identifier
//! - `ApiEnvelope`: the upstream's `{success, data, message}` wrapper
//! - `mock_student`: built-in sample record

pub mod mock;
pub mod student;

pub use mock::mock_student;
pub use student::{ApiEnvelope, Student, StudentId};
