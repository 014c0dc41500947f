//! Core library for the student report service.
//!
//! - `api`: upstream client with cookie-session authentication and one-shot re-login
//! - `auth`: session store and login credentials
//! - `models`: student record, identifier, response envelope, mock data
//! - `render`: PDF report rendering
//! - `config`: environment-driven configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod render;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use models::{Student, StudentId};
pub use render::{PdfReportRenderer, RenderError, ReportRenderer};
