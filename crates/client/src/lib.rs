//! Client code for flyberry-sw.
//!
//! This crate provides the HTTP side of the asset cache router: a reqwest
//! client implementing the router's `Fetch` capability.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
