//! Core types and shared functionality for flyberry-sw.
//!
//! This crate provides:
//! - The asset cache router and its caching strategies
//! - Partition store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;
pub mod router;

pub use cache::{CacheDb, CacheStorage};
pub use config::{PartitionNames, WorkerConfig};
pub use error::Error;
pub use message::{Request, Response};
pub use router::{AssetRouter, Category, Fetch, classify};
