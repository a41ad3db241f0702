//! Minimal fitness platform HTTP services.
//!
//! Every service (ai-coach, exercise, progress, user, workout) is the same
//! template instantiated from a [`ServiceProfile`]: a root status route, a
//! placeholder `/api/{domain}/test` route, and `/health` on the user service.

pub mod api_doc;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;

pub use config::{ServiceConfig, ServiceProfile};
pub use service::{create_service, register_routes, run, serve, start, Application};
