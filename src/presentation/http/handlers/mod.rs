//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints, one module per feature area.

pub mod auth;
pub mod business;
pub mod calendar;
pub mod chat_space;
pub mod country;
pub mod engagement;
pub mod health;
pub mod member;
pub mod notification;
pub mod oauth2;
pub mod poll;
pub mod social;
pub mod soft_ask;
pub mod stream;
