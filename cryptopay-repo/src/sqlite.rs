//! SQLite payment archive adapter.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use cryptopay_types::{CountryCode, Payment, PaymentArchive, PaymentId, RepoError, ReportPeriod};

use crate::types::DbPayment;

const MIGRATION: &str = include_str!("../migrations/0001_create_payments.sql");

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Archive
// ─────────────────────────────────────────────────────────────────────────────

/// Archive of terminal payments and processed webhook events, backed by SQLite.
pub struct SqliteArchive {
    pool: SqlitePool,
}

impl SqliteArchive {
    /// Connects and runs the migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(MIGRATION).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Archive implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentArchive for SqliteArchive {
    async fn save(&self, payment: &Payment) -> Result<(), RepoError> {
        let row = DbPayment::from(payment);

        sqlx::query(
            r#"INSERT OR REPLACE INTO payments (
                id, amount, currency, crypto_amount, crypto_currency, exchange_rate, address,
                status, country_code, order_id, tax_amount, travel_rule,
                created_at, updated_at, expires_at, created_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&row.id)
        .bind(&row.amount)
        .bind(&row.currency)
        .bind(&row.crypto_amount)
        .bind(&row.crypto_currency)
        .bind(&row.exchange_rate)
        .bind(&row.address)
        .bind(&row.status)
        .bind(&row.country_code)
        .bind(&row.order_id)
        .bind(&row.tax_amount)
        .bind(&row.travel_rule)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .bind(&row.expires_at)
        .bind(payment.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, amount, currency, crypto_amount, crypto_currency, exchange_rate,
                      address, status, country_code, order_id, tax_amount, travel_rule,
                      created_at, updated_at, expires_at
               FROM payments WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_between(
        &self,
        country: &CountryCode,
        period: ReportPeriod,
    ) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, amount, currency, crypto_amount, crypto_currency, exchange_rate,
                      address, status, country_code, order_id, tax_amount, travel_rule,
                      created_at, updated_at, expires_at
               FROM payments
               WHERE country_code = ? AND created_ms >= ? AND created_ms < ?
               ORDER BY created_ms"#,
        )
        .bind(country.as_str())
        .bind(period.start.timestamp_millis())
        .bind(period.end.timestamp_millis())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn is_event_processed(&self, event_id: &str) -> Result<bool, RepoError> {
        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT event_id FROM processed_events WHERE event_id = ?"#)
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.is_some())
    }

    async fn mark_event_processed(&self, event_id: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT OR IGNORE INTO processed_events (event_id, processed_at) VALUES (?, ?)"#,
        )
        .bind(event_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
