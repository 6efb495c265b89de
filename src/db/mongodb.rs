use std::env;

use anyhow::{Context, Result};
use mongodb::{Client, Database};

/// Connect to MongoDB and return a handle to the configured database.
pub async fn get_database() -> Result<Database> {
    let uri = env::var("MONGODB_URI").context("MONGODB_URI not set")?;
    let client = Client::with_uri_str(&uri)
        .await
        .context("Failed to create MongoDB client")?;
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| String::from("visitledger"));
    Ok(client.database(&db_name))
}
