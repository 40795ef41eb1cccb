//! Configuration module for shpkit tools
//!
//! Provides types, discovery and loading for `shp.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
