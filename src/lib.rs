//! Brickgraph: Catalog Graph Engine
//!
//! Category hierarchy, category membership and set/part composition for a
//! construction-toy catalog, stored as edge tables behind a `CatalogStore`.
//! Answers root paths, subtree listings, materialized subtree sizes and
//! class-partitioned composition queries.

pub mod aggregation;
pub mod api;
pub mod bulk;
pub mod composition;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod membership;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod views;

pub use api::CatalogApi;
pub use error::{CatalogError, ErrorKind, StorageError};
pub use types::{CategoryId, ItemClass, ItemId};
