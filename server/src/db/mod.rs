use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub type Db = SqlitePool;

/// Connect to the database and bootstrap the schema.
///
/// Works with a file URL (`sqlite:skycast.db?mode=rwc`) as well as
/// `sqlite::memory:` for tests.
pub async fn connect(database_url: &str) -> Result<Db> {
    // An in-memory database exists per connection, so a pool of them would
    // give every checkout a different (empty) database. Pin those to one.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

async fn init_schema(pool: &Db) -> Result<()> {
    // Email and username are stored case-folded, so plain UNIQUE constraints
    // give us case-insensitive uniqueness. Favorite locations and preferences
    // are JSON documents; they are only ever read and written whole.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            favorite_locations TEXT NOT NULL DEFAULT '[]',
            preferences TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
