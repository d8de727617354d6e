//! HTTP surface of the Gigify scheduling engine.
//!
//! Handlers are thin: they extract the caller from the bearer token, call
//! into [`gigify_engine::Engine`] and wrap the result in a
//! [`response::DataResponse`]. Errors flow through [`error::AppError`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
