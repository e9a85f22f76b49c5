//! Colour catalog access
//!
//! The engine only ever reads a full snapshot of the catalog. Where that
//! snapshot comes from is behind [`ColorCatalog`].

use std::future::Future;

use crate::models::{MatchError, Paint};

#[cfg(feature = "server")]
mod sqlite;
#[cfg(feature = "server")]
pub use sqlite::*;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog query failed: {0}")]
    Query(String),
    #[error("catalog connection failed: {0}")]
    Connection(String),
}

impl From<CatalogError> for MatchError {
    fn from(e: CatalogError) -> Self {
        MatchError::CatalogUnavailable(e.to_string())
    }
}

/// Read-only source of catalog paints
pub trait ColorCatalog: Send + Sync {
    /// Every paint currently in the catalog
    fn list_all(&self) -> impl Future<Output = Result<Vec<Paint>, CatalogError>> + Send;
}

/// Fixed in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    paints: Vec<Paint>,
}

impl InMemoryCatalog {
    pub fn new(paints: Vec<Paint>) -> Self {
        Self { paints }
    }
}

impl ColorCatalog for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<Paint>, CatalogError> {
        Ok(self.paints.clone())
    }
}
