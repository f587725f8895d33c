//! PostgreSQL catalog reader over `information_schema`.

use super::{CatalogSchemaProvider, ColumnInfo, ForeignKey, SchemaSource, TableInfo};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::collections::HashMap;

const TABLES_SQL: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        c.table_name::text,
        c.column_name::text,
        c.data_type::text,
        c.is_nullable::text,
        (pk.column_name IS NOT NULL) AS is_primary_key
    FROM information_schema.columns c
    LEFT JOIN (
        SELECT ku.table_name, ku.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage ku
            ON tc.constraint_name = ku.constraint_name
            AND tc.table_schema = ku.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = 'public'
    ) pk ON c.table_name = pk.table_name AND c.column_name = pk.column_name
    WHERE c.table_schema = 'public'
    ORDER BY c.table_name, c.ordinal_position
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT
        tc.table_name::text,
        kcu.column_name::text,
        ccu.table_name::text AS foreign_table_name,
        ccu.column_name::text AS foreign_column_name
    FROM information_schema.table_constraints AS tc
    JOIN information_schema.key_column_usage AS kcu
        ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage AS ccu
        ON ccu.constraint_name = tc.constraint_name
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'public'
    ORDER BY tc.table_name, kcu.column_name
"#;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaSource for PgCatalog {
    async fn load_tables(&self) -> Result<Vec<TableInfo>> {
        let schema_err = |e: sqlx::Error| InsightError::Schema(e.to_string());

        let names: Vec<(String,)> = sqlx::query_as(TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(schema_err)?;
        let columns: Vec<(String, String, String, String, bool)> = sqlx::query_as(COLUMNS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(schema_err)?;
        let foreign_keys: Vec<(String, String, String, String)> = sqlx::query_as(FOREIGN_KEYS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(schema_err)?;

        let mut tables: Vec<TableInfo> = names.into_iter().map(|(name,)| TableInfo::new(name, Vec::new())).collect();
        let index: HashMap<String, usize> = tables.iter().enumerate().map(|(i, t)| (t.name.clone(), i)).collect();

        for (table, name, data_type, nullable, is_primary_key) in columns {
            if let Some(&i) = index.get(&table) {
                tables[i].columns.push(ColumnInfo {
                    name,
                    data_type,
                    is_primary_key,
                    is_nullable: nullable != "NO",
                });
            }
        }
        for (table, column, foreign_table, foreign_column) in foreign_keys {
            if let Some(&i) = index.get(&table) {
                tables[i].foreign_keys.push(ForeignKey {
                    column,
                    foreign_table,
                    foreign_column,
                });
            }
        }
        Ok(tables)
    }
}

pub type PgSchemaProvider = CatalogSchemaProvider<PgCatalog>;
