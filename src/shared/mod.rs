//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod i18n;
pub mod messages;
pub mod pagination;
pub mod random;
pub mod snowflake;
pub mod validation;
