//! Database connection utilities for the SmartBank backend.
//!
//! Provides a function to create a connection pool to the Postgres database using
//! environment variables, plus the one-time schema bootstrap run at boot.

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;

/// Establishes a connection pool to the Postgres database using the `DATABASE_URL` environment variable.
///
/// # Panics
/// Panics if the `DATABASE_URL` is not set or if the connection fails.
///
/// # Returns
/// A [`PgPool`] instance for use with SQLx queries.
pub async fn connect_pg_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create Postgres pool")
}

/// Creates the `users`, `kyc_documents`, and `fraud_logs` tables if they do not exist.
///
/// Runs once at boot before the server starts accepting requests. Statements are
/// idempotent, so restarting against an already-provisioned database is a no-op.
pub async fn init_db(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS kyc_documents (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            document_type VARCHAR(50) NOT NULL,
            document_number VARCHAR(100) NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS fraud_logs (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            amount DOUBLE PRECISION NOT NULL,
            customer_age INTEGER NOT NULL,
            login_attempts INTEGER NOT NULL,
            account_balance DOUBLE PRECISION NOT NULL,
            is_suspicious BOOLEAN NOT NULL,
            message TEXT NOT NULL,
            checked_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized");
    Ok(())
}
