//! PostgreSQL dialect.

use super::types::POSTGRES_TYPES;
use super::{CatalogQuery, SqlDialect, TypeTable};
use tablewright_core::Dialect;

/// PostgreSQL dialect implementation.
///
/// Catalog lookups are scoped to `current_schema()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn type_table(&self) -> &'static TypeTable {
        &POSTGRES_TYPES
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn primary_key_definition(&self) -> &'static str {
        "bigserial primary key"
    }

    fn table_exists_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1::text",
            vec![table.to_string()],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT indexname::text FROM pg_indexes \
             WHERE schemaname = current_schema() AND tablename = $1::text AND indexname = $2::text",
            vec![table.to_string(), index.to_string()],
        )
    }

    fn columns_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1::text \
             ORDER BY ordinal_position",
            vec![table.to_string()],
        )
    }

    fn supports_index_if_not_exists(&self) -> bool {
        true
    }

    // NAMEDATALEN - 1; longer names are silently truncated
    fn max_identifier_length(&self) -> Option<usize> {
        Some(63)
    }

    fn identifiers_case_sensitive(&self) -> bool {
        true
    }
}
