use async_trait::async_trait;

use crate::domain::order::OrderRepository;
use crate::domain::product::ProductRepository;
use crate::utils::IsTransient;

// ============================================================================
// Unit of Work - transactional access to the repositories
// ============================================================================
//
// A unit of work is one transaction. Reads go straight to the store (the
// `*_for_update` variants take row locks held until commit or rollback).
// `save_*` / `remove_*` only stage a write; `flush` pushes staged writes into
// the transaction and `commit` flushes then makes everything durable.
// Dropping a unit of work without committing discards it.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt stored data: {0}")]
    Corrupt(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for RepositoryError {
    fn is_transient(&self) -> bool {
        match self {
            // 40001 serialization_failure, 40P01 deadlock_detected
            RepositoryError::Database(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
            }
            RepositoryError::Database(sqlx::Error::PoolTimedOut)
            | RepositoryError::Database(sqlx::Error::Io(_)) => true,
            RepositoryError::Unavailable(_) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait UnitOfWork: ProductRepository + OrderRepository {
    /// Write staged changes into the open transaction.
    async fn flush(&mut self) -> Result<(), RepositoryError>;

    /// Flush, then commit the transaction.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Opens units of work against a backing store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}

/// Roll back after a failed workflow. A rollback error is only logged; the
/// transaction is discarded either way when the connection drops it.
pub async fn discard(uow: Box<dyn UnitOfWork>) {
    if let Err(e) = uow.rollback().await {
        tracing::warn!(error = %e, "Rollback failed");
    }
}
