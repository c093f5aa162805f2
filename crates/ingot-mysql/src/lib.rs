//! # ingot-mysql
//!
//! MySQL catalog source for `ingot-schema`.
//!
//! The core engine is synchronous and consumes catalog rows through the
//! [`CatalogSource`](ingot_schema::CatalogSource) trait. This crate does the
//! asynchronous I/O at the edge: [`MySqlCatalog::snapshot`] prefetches the
//! `information_schema` rows of a whole database into a
//! [`StaticCatalog`](ingot_schema::StaticCatalog), which the engine then
//! reads without ever seeing a connection.
//!
//! ```rust,no_run
//! use ingot_schema::Schema;
//! use ingot_mysql::MySqlCatalog;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::MySqlPool::connect("mysql://root@localhost/blog").await?;
//! let catalog = MySqlCatalog::new(pool).snapshot("blog").await?;
//! let schema = Schema::from_source("blog", Box::new(catalog))?;
//! # Ok(())
//! # }
//! ```

use ingot_schema::{ConstraintRow, FieldRow, ReferenceRow, StaticCatalog};
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::debug;

/// Lists the base tables of a database.
pub const TABLE_NAMES_SQL: &str = "\
SELECT TABLE_NAME FROM information_schema.TABLES \
WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
ORDER BY TABLE_NAME";

/// Describes the columns of one table, in ordinal position.
pub const FIELDS_SQL: &str = "\
SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_DEFAULT, EXTRA, COLUMN_COMMENT \
FROM information_schema.COLUMNS \
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
ORDER BY ORDINAL_POSITION";

/// Lists the index constraints of one table, one row per index with its
/// columns comma-joined in index order.
pub const CONSTRAINTS_SQL: &str = "\
SELECT INDEX_NAME, MIN(NON_UNIQUE) AS NON_UNIQUE, \
GROUP_CONCAT(COLUMN_NAME ORDER BY SEQ_IN_INDEX) AS COLUMN_LIST \
FROM information_schema.STATISTICS \
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
GROUP BY INDEX_NAME";

/// Lists the foreign keys of one table together with their referential
/// rules, columns comma-joined in ordinal position.
pub const REFERENCES_SQL: &str = "\
SELECT kcu.CONSTRAINT_NAME, \
GROUP_CONCAT(kcu.COLUMN_NAME ORDER BY kcu.ORDINAL_POSITION) AS COLUMN_LIST, \
kcu.REFERENCED_TABLE_NAME, \
GROUP_CONCAT(kcu.REFERENCED_COLUMN_NAME ORDER BY kcu.ORDINAL_POSITION) AS REFERENCED_COLUMN_LIST, \
rc.UPDATE_RULE, rc.DELETE_RULE \
FROM information_schema.KEY_COLUMN_USAGE kcu \
JOIN information_schema.REFERENTIAL_CONSTRAINTS rc \
ON rc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA AND rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME \
WHERE kcu.TABLE_SCHEMA = ? AND kcu.TABLE_NAME = ? AND kcu.REFERENCED_TABLE_NAME IS NOT NULL \
GROUP BY kcu.CONSTRAINT_NAME, kcu.REFERENCED_TABLE_NAME, rc.UPDATE_RULE, rc.DELETE_RULE";

/// Reads catalog metadata from a MySQL server.
#[derive(Debug, Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
}

impl MySqlCatalog {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The database the connection currently uses, if any.
    ///
    /// # Errors
    ///
    /// Returns the underlying `sqlx` error on query failure.
    pub async fn current_database(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DATABASE()")
            .fetch_one(&self.pool)
            .await
    }

    /// Prefetches the full catalog of `db` into an in-memory source.
    ///
    /// # Errors
    ///
    /// Returns the underlying `sqlx` error on query failure.
    pub async fn snapshot(&self, db: &str) -> Result<StaticCatalog, sqlx::Error> {
        let mut catalog = StaticCatalog::new();
        let tables = sqlx::query(TABLE_NAMES_SQL)
            .bind(db)
            .fetch_all(&self.pool)
            .await?;
        for row in tables {
            let table: String = row.try_get("TABLE_NAME")?;
            let fields = self.fields(db, &table).await?;
            let constraints = self.constraints(db, &table).await?;
            let references = self.references(db, &table).await?;
            debug!(
                db,
                table = %table,
                fields = fields.len(),
                constraints = constraints.len(),
                references = references.len(),
                "fetched catalog rows"
            );
            catalog.insert_table(db, &table, fields, constraints, references);
        }
        Ok(catalog)
    }

    async fn fields(&self, db: &str, table: &str) -> Result<Vec<FieldRow>, sqlx::Error> {
        let rows = sqlx::query(FIELDS_SQL)
            .bind(db)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let nullable: String = row.try_get("IS_NULLABLE")?;
                Ok(FieldRow {
                    name: row.try_get("COLUMN_NAME")?,
                    raw_type: row.try_get("COLUMN_TYPE")?,
                    nullable: nullable == "YES",
                    default: row.try_get("COLUMN_DEFAULT")?,
                    extra: row.try_get("EXTRA")?,
                    comment: row.try_get("COLUMN_COMMENT")?,
                })
            })
            .collect()
    }

    async fn constraints(&self, db: &str, table: &str) -> Result<Vec<ConstraintRow>, sqlx::Error> {
        let rows = sqlx::query(CONSTRAINTS_SQL)
            .bind(db)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("INDEX_NAME")?;
                let non_unique: i64 = row.try_get("NON_UNIQUE")?;
                let kind = if name == "PRIMARY" {
                    "PRIMARY"
                } else if non_unique == 0 {
                    "UNIQUE"
                } else {
                    "INDEX"
                };
                Ok(ConstraintRow {
                    name,
                    kind: kind.to_string(),
                    columns: row.try_get("COLUMN_LIST")?,
                })
            })
            .collect()
    }

    async fn references(&self, db: &str, table: &str) -> Result<Vec<ReferenceRow>, sqlx::Error> {
        let rows = sqlx::query(REFERENCES_SQL)
            .bind(db)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                Ok(ReferenceRow {
                    name: row.try_get("CONSTRAINT_NAME")?,
                    columns: row.try_get("COLUMN_LIST")?,
                    target_table: row.try_get("REFERENCED_TABLE_NAME")?,
                    target_columns: row.try_get("REFERENCED_COLUMN_LIST")?,
                    on_update: row.try_get("UPDATE_RULE")?,
                    on_delete: row.try_get("DELETE_RULE")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_target_information_schema() {
        assert!(TABLE_NAMES_SQL.contains("information_schema.TABLES"));
        assert!(FIELDS_SQL.contains("information_schema.COLUMNS"));
        assert!(CONSTRAINTS_SQL.contains("information_schema.STATISTICS"));
        assert!(REFERENCES_SQL.contains("information_schema.KEY_COLUMN_USAGE"));
        assert!(REFERENCES_SQL.contains("REFERENTIAL_CONSTRAINTS"));
    }

    #[test]
    fn queries_are_scoped_by_schema_and_table() {
        for sql in [FIELDS_SQL, CONSTRAINTS_SQL, REFERENCES_SQL] {
            assert!(sql.contains("TABLE_SCHEMA = ?"), "missing schema bind: {sql}");
            assert!(sql.contains("TABLE_NAME = ?"), "missing table bind: {sql}");
        }
    }

    #[test]
    fn column_lists_preserve_definition_order() {
        assert!(FIELDS_SQL.contains("ORDER BY ORDINAL_POSITION"));
        assert!(CONSTRAINTS_SQL.contains("ORDER BY SEQ_IN_INDEX"));
        assert!(REFERENCES_SQL.contains("ORDER BY kcu.ORDINAL_POSITION"));
    }
}
