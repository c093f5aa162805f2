//! Example: print the reconciliation state of a live database.
//!
//! Connects to the MySQL server named by `DATABASE_URL`, snapshots the
//! catalog of the given database, and prints the reconstructed CREATE
//! statement of every table.
//!
//! Run with: DATABASE_URL=mysql://root@localhost/blog \
//!     cargo run --example introspect -p ingot-mysql -- blog

use ingot_mysql::MySqlCatalog;
use ingot_schema::Schema;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::var("DATABASE_URL")?;
    let db = std::env::args()
        .nth(1)
        .ok_or("usage: introspect <database>")?;

    let pool = sqlx::MySqlPool::connect(&url).await?;
    let catalog = MySqlCatalog::new(pool).snapshot(&db).await?;
    let schema = Schema::from_source(&db, Box::new(catalog))?;

    for (name, table) in schema.tables() {
        println!("-- {name}\n{}\n", table.show_create());
    }

    Ok(())
}
