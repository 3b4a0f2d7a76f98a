//! # FleenFeen
//!
//! Backend for a social and events platform:
//! - members with email/password accounts and JWT sessions
//! - chat spaces backed by Google Chat, events backed by Google Calendar and
//!   live streams backed by YouTube
//! - follows, blocks, contacts, likes, bookmarks, links and reviews
//! - soft asks (questions with answers, replies and votes), polls, businesses
//!   and in-app notifications
//!
//! ## Architecture
//!
//! - **Domain Layer**: entities, value objects, repository and gateway traits
//! - **Application Layer**: feature services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, Redis, Google clients
//! - **Presentation Layer**: HTTP routes, extractors and middleware
//!
//! ```text
//! fleenfeen/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, traits
//! +-- application/    Services and DTOs
//! +-- infrastructure/ Database, cache and external clients
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Errors, i18n, pagination, snowflake ids
//! ```

pub mod config;

pub mod domain;

pub mod application;

pub mod infrastructure;

pub mod presentation;

pub mod shared;

// Application startup and state management
pub mod startup;

pub mod telemetry;
