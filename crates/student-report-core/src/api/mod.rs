//! REST API client module for the upstream student backend.
//!
//! This module provides the `ApiClient` for logging in and fetching
//! student records.
//!
//! The backend uses cookie sessions (`accessToken`, `refreshToken`,
//! `csrfToken`) handed out by `POST /auth/login`; the CSRF token must also
//! be echoed in the `x-csrf-token` header.

pub mod client;
pub mod error;


pub use client::ApiClient;
pub use error::{ApiError, Result};
