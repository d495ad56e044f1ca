//! SQLite-backed partition store for intercepted responses.
//!
//! This module provides a persistent, partitioned response cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named partitions created lazily on first open
//! - Entries keyed by absolute request URL
//! - Atomic bulk writes for install-time seeding
//! - Whole-partition deletion for version pruning

pub mod connection;
pub mod migrations;
pub mod partitions;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use storage::CacheStorage;
