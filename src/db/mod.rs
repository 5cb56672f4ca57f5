//! Database layer for the record book
//!
//! A per-user partitioned repository contract with two implementations:
//! MongoDB for deployments and an in-process store for tests and dev mode.

pub mod memory;
pub mod mongo;
pub mod pagination;
pub mod repository;
pub mod schemas;
pub mod stores;

pub use memory::MemoryRepository;
pub use mongo::{MongoClient, MongoRepository};
pub use pagination::{Page, Pagination};
pub use repository::{Record, Repository, Scope, StoreResult};
pub use schemas::Envelope;
pub use stores::Stores;
