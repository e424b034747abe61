//! Project configuration (`site.toml`)
//!
//! Schema types plus discovery/loading helpers.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
