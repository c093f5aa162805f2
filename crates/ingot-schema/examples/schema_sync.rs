//! Example: reconciling a blog schema with a live database.
//!
//! This example fakes the database side with a `StaticCatalog` (in a real
//! deployment `ingot-mysql` would prefetch the same rows from
//! `information_schema`), evolves the reconstructed schema in memory, and
//! prints the DDL that `migrate()` synthesizes for each table.
//!
//! Run with: cargo run --example schema_sync -p ingot-schema

use ingot_schema::{
    ColumnPosition, ConstraintRow, FieldRow, IndexType, ReferenceAction, ReferenceRow, Schema,
    SchemaError, StaticCatalog,
};

fn live_database() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    catalog.insert_table(
        "blog",
        "users",
        vec![
            FieldRow {
                name: "id".into(),
                raw_type: "int(10) unsigned".into(),
                nullable: false,
                default: None,
                extra: "auto_increment".into(),
                comment: String::new(),
            },
            FieldRow {
                name: "email".into(),
                raw_type: "varchar(255)".into(),
                nullable: false,
                default: None,
                extra: String::new(),
                comment: String::new(),
            },
        ],
        vec![ConstraintRow {
            name: "PRIMARY".into(),
            kind: "PRIMARY".into(),
            columns: "id".into(),
        }],
        vec![],
    );
    catalog.insert_table(
        "blog",
        "posts",
        vec![
            FieldRow {
                name: "id".into(),
                raw_type: "int(10) unsigned".into(),
                nullable: false,
                default: None,
                extra: "auto_increment".into(),
                comment: String::new(),
            },
            FieldRow {
                name: "user_id".into(),
                raw_type: "int(10) unsigned".into(),
                nullable: false,
                default: None,
                extra: String::new(),
                comment: String::new(),
            },
        ],
        vec![ConstraintRow {
            name: "PRIMARY".into(),
            kind: "PRIMARY".into(),
            columns: "id".into(),
        }],
        vec![ReferenceRow {
            name: "fk_post_user".into(),
            columns: "user_id".into(),
            target_table: "users".into(),
            target_columns: "id".into(),
            on_update: "RESTRICT".into(),
            on_delete: "RESTRICT".into(),
        }],
    );
    catalog
}

fn main() -> Result<(), SchemaError> {
    let mut schema = Schema::from_source("blog", Box::new(live_database()))?;

    // 1. evolve `users`: a display name after the email, and an index on it
    let users = schema.get_table("users")?;
    users.add_varchar_col("display_name", 100)?;
    users
        .column_mut("display_name")
        .expect("just added")
        .set_position(ColumnPosition::After("email".into()));
    users.add_index(Some("idx_display_name"), &["display_name"], IndexType::Index)?;

    // 2. evolve `posts`: cascade deletes from users
    let posts = schema.get_table("posts")?;
    posts
        .foreign_key_mut("fk_post_user")
        .expect("reconstructed")
        .set_on_delete_action(ReferenceAction::Cascade);

    // 3. a brand new table, created from scratch
    let tags = schema.get_table("tags")?;
    tags.add_primary_key("id")?;
    tags.add_varchar_col("label", 64)?;
    tags.validate()?;

    for (name, table) in schema.tables() {
        let ddl = table.migrate();
        if ddl.is_empty() {
            println!("-- {name}: up to date");
        } else {
            println!("-- {name}\n{ddl}");
        }
    }

    Ok(())
}
