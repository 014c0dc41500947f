//! Upstream authentication state.
//!
//! This module provides:
//! - `SessionStore`: lock-protected cache of the session tokens and the authenticated flag
//! - `Credentials`: the configured login identity and the login wire types
//!
//! Sessions are never persisted; every process starts unauthenticated.

pub mod credentials;
pub mod session;

pub use credentials::{Credentials, LoginRequest, LoginResponse};
pub use session::{Session, SessionStore, SessionTokens};
