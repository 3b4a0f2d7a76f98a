//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `api/` - REST API endpoint tests
//! - `common/` - Shared test utilities
//!
//! The router runs against a lazily-connecting pool and Redis handle, so only
//! routes that fail or succeed before touching storage are covered here.

mod api;
mod common;
