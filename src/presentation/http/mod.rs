//! HTTP API: routes, extractors and handlers.

pub mod extractors;
pub mod handlers;
pub mod routes;
