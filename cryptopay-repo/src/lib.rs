//! # Cryptopay Repository
//!
//! Concrete outbound adapters for the crypto payment engine.
//!
//! - `store` - concurrent store of active (non-terminal) payments
//! - `memory` / `sqlite` - `PaymentArchive` implementations for terminal payments
//! - `security` - request/webhook signing, replay protection and data sealing
//! - `ledger` - simulated `LedgerService` used for development and tests
//! - `webhooks` - `Notifier` implementations

pub mod ledger;
pub mod memory;
pub mod security;
pub mod store;
pub mod webhooks;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;

#[cfg(feature = "sqlite")]
#[cfg(test)]
mod sqlite_tests;

pub use ledger::SimulatedLedger;
pub use memory::InMemoryArchive;
pub use store::ActivePaymentStore;
pub use webhooks::{TracingNotifier, WebhookDispatcher};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteArchive;

use std::sync::Arc;

use cryptopay_types::PaymentArchive;

/// Build the payment archive for the given database URL.
///
/// Without a URL (or without the `sqlite` feature) terminal payments are kept
/// in memory for the lifetime of the process.
pub async fn build_archive(database_url: Option<&str>) -> anyhow::Result<Arc<dyn PaymentArchive>> {
    match database_url {
        #[cfg(feature = "sqlite")]
        Some(url) => Ok(Arc::new(SqliteArchive::new(url).await?)),
        #[cfg(not(feature = "sqlite"))]
        Some(url) => {
            tracing::warn!(
                database_url = url,
                "built without the sqlite feature, using the in-memory archive"
            );
            Ok(Arc::new(InMemoryArchive::new()))
        }
        None => Ok(Arc::new(InMemoryArchive::new())),
    }
}
