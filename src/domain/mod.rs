//! # Domain Layer
//!
//! The domain layer contains the core business rules of the FleenFeen
//! platform. It is independent of any external frameworks or infrastructure
//! concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities and their repository traits
//! - **value_objects**: Stored enumerations and localized enum info
//! - **services**: Pure rules spanning entities (join status, schedules)
//! - **gateways**: Contracts for Google APIs, events and OAuth2 state
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository and gateway traits define the contracts services rely on

pub mod entities;
pub mod gateways;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
