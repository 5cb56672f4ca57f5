//! HTTP server for the record book

pub mod http;

pub use http::{run, AppState};
