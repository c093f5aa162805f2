//! # ingot-schema
//!
//! An in-memory MySQL schema model with diff-based DDL synthesis.
//!
//! Schemas are either built programmatically or reconstructed from an
//! existing database's catalog metadata. Every entity (table, column, index,
//! foreign key) carries three lifecycle flags — existing-on-db, modified,
//! deleted — and [`Table::migrate`] reads them to synthesize the minimal
//! `CREATE` / `ALTER` / `DROP` statements that reconcile the in-memory
//! desired state with the live database.
//!
//! ## Building a schema
//!
//! ```rust
//! use ingot_schema::{IndexType, Table};
//!
//! let mut table = Table::new("users");
//! table
//!     .add_column("id", "INT", &["UNSIGNED"], false)?
//!     .add_index(None, &["id"], IndexType::Primary)?
//!     .set_auto_increment_column("id")?;
//!
//! assert_eq!(
//!     table.show_create(),
//!     "CREATE TABLE `users` (`id` INT(UNSIGNED) NOT NULL AUTO_INCREMENT,\nPRIMARY  KEY (`id` ASC));"
//! );
//! # Ok::<(), ingot_schema::SchemaError>(())
//! ```
//!
//! ## Reconciling with an existing database
//!
//! Reconstruction consumes catalog rows through the [`CatalogSource`] trait;
//! the engine never touches a connection itself. The `ingot-mysql` crate
//! prefetches `information_schema` rows into a [`StaticCatalog`], which this
//! crate then reads synchronously:
//!
//! ```rust
//! use ingot_schema::{FieldRow, Lifecycle, Schema, StaticCatalog};
//!
//! let mut catalog = StaticCatalog::new();
//! catalog.insert_table(
//!     "app",
//!     "users",
//!     vec![FieldRow {
//!         name: "id".into(),
//!         raw_type: "int(10) unsigned".into(),
//!         nullable: false,
//!         default: None,
//!         extra: "auto_increment".into(),
//!         comment: String::new(),
//!     }],
//!     vec![],
//!     vec![],
//! );
//!
//! let mut schema = Schema::with_source("app", Box::new(catalog));
//! let users = schema.get_table("users")?;
//! assert!(users.is_existing_on_db());
//! assert_eq!(users.migrate(), ""); // nothing to reconcile yet
//!
//! users.drop_column("id")?;
//! assert_eq!(users.migrate(), "ALTER TABLE `users` DROP COLUMN `id`;\n");
//! # Ok::<(), ingot_schema::SchemaError>(())
//! ```

pub mod catalog;
pub mod column;
pub mod error;
pub mod foreign_key;
pub mod index;
pub mod lifecycle;
pub mod schema;
pub mod table;
pub mod types;

pub use catalog::{CatalogSource, ConstraintRow, FieldRow, ReferenceRow, StaticCatalog};
pub use column::{Column, ColumnPosition};
pub use error::{Result, SchemaError};
pub use foreign_key::{ForeignKey, ReferenceAction};
pub use index::{Index, IndexColumn, IndexType, SortOrder};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use schema::Schema;
pub use table::Table;
