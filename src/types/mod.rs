//! Shared types for the record book service

pub mod error;

pub use error::{translate_store_error, RecordError, Result, StoreError};
