//! Record book - 4-H project and resume records
//!
//! A JSON-over-HTTP backend where each member keeps their record book:
//! projects, animals, feed, expenses, supplies, events, bookmarks, a
//! profile, and fourteen kinds of resume sections that can be linked to
//! events. Every record is owned by the identity in the caller's bearer
//! token and stored in a per-user partition.
//!
//! ## Layers
//!
//! - **server**: hyper accept loop, request timeout, CORS
//! - **routes**: path resolution, authentication, handlers
//! - **db**: repository contract with MongoDB and in-memory implementations
//! - **services**: outbound UPC lookups

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod time;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{RecordError, Result};
