//! Outbound services used by request handlers

pub mod upc;

pub use upc::{UpcClient, UpcConfig};
