//! Schema context for SQL generation
//!
//! The catalog is read once per TTL window and rendered as plain text. The
//! retriever narrows it to the tables a question is likely about.

pub mod catalog;
pub mod postgres;
pub mod retriever;

pub use catalog::{format_tables, ColumnInfo, ForeignKey, TableInfo};
pub use postgres::{PgCatalog, PgSchemaProvider};
pub use retriever::{select_tables, SEMANTIC_FAMILIES};

use crate::cache::{Clock, TtlCache};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Text-level schema access used by the pipeline.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Every table, formatted.
    async fn schema_context(&self) -> Result<String>;

    /// The `top_k` most relevant tables for `question`, plus the tables their
    /// foreign keys point at, formatted.
    async fn retrieve(&self, question: &str, top_k: usize) -> Result<String>;
}

/// Where table descriptions come from.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load_tables(&self) -> Result<Vec<TableInfo>>;
}

#[async_trait]
impl SchemaSource for Vec<TableInfo> {
    async fn load_tables(&self) -> Result<Vec<TableInfo>> {
        Ok(self.clone())
    }
}

pub type SchemaCache = TtlCache<&'static str, Arc<Vec<TableInfo>>>;

const CATALOG_KEY: &str = "catalog";

/// Schema provider over any source, caching the loaded catalog.
pub struct CatalogSchemaProvider<S> {
    source: S,
    cache: SchemaCache,
}

impl<S: SchemaSource> CatalogSchemaProvider<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: SchemaCache::new(ttl),
        }
    }

    pub fn with_clock(source: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: SchemaCache::with_clock(ttl, clock),
        }
    }

    pub async fn tables(&self) -> Result<Arc<Vec<TableInfo>>> {
        if let Some(tables) = self.cache.get(&CATALOG_KEY) {
            debug!(tables = tables.len(), "Schema cache hit");
            return Ok(tables);
        }
        let tables = Arc::new(self.source.load_tables().await?);
        info!(tables = tables.len(), "Schema catalog loaded");
        self.cache.put(CATALOG_KEY, Arc::clone(&tables));
        Ok(tables)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Schema cache cleared");
    }
}

#[async_trait]
impl<S: SchemaSource> SchemaProvider for CatalogSchemaProvider<S> {
    async fn schema_context(&self) -> Result<String> {
        let tables = self.tables().await?;
        Ok(format_tables(tables.iter()))
    }

    async fn retrieve(&self, question: &str, top_k: usize) -> Result<String> {
        let tables = self.tables().await?;
        let selected = select_tables(&tables, question, top_k);
        info!(
            question = crate::observability::prefix(question, 100),
            tables = ?selected.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "Retrieved schema context"
        );
        Ok(format_tables(selected.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl SchemaSource for Counting {
        async fn load_tables(&self) -> Result<Vec<TableInfo>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TableInfo::new("film", vec![ColumnInfo::new("film_id", "integer").primary_key()])])
        }
    }

    #[tokio::test]
    async fn test_catalog_cached_until_ttl() {
        let clock = Arc::new(ManualClock::new());
        let provider = CatalogSchemaProvider::with_clock(
            Counting { loads: AtomicUsize::new(0) },
            Duration::from_secs(300),
            clock.clone(),
        );

        let first = provider.schema_context().await.unwrap();
        assert!(first.starts_with("Table: film"));
        provider.retrieve("films", 5).await.unwrap();
        assert_eq!(provider.source.loads.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(301));
        provider.schema_context().await.unwrap();
        assert_eq!(provider.source.loads.load(Ordering::SeqCst), 2);

        provider.clear_cache();
        provider.schema_context().await.unwrap();
        assert_eq!(provider.source.loads.load(Ordering::SeqCst), 3);
    }
}
