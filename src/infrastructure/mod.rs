//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Cache, OAuth2 state and event publishing (Redis)
//! - Google Calendar, Chat and YouTube clients
//! - reCAPTCHA verification

pub mod database;
pub mod cache;
pub mod repositories;
pub mod metrics;
pub mod messaging;
pub mod google;
pub mod recaptcha;
