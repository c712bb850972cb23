//! Storage trait abstraction.

use async_trait::async_trait;
use pratiche_core::{Pratica, PraticaFilter, PraticaId, PraticaNum};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage abstraction for pratiche.
///
/// Besides the case records, a backend owns the per-year sequence counter
/// behind display numbers and must never hand out the same `(year, seq)`
/// twice.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Pratica operations ===

    /// Save a pratica (create or update).
    async fn save_pratica(&mut self, pratica: &Pratica) -> Result<()>;

    /// Load a pratica by ID.
    async fn load_pratica(&self, id: &PraticaId) -> Result<Option<Pratica>>;

    /// List pratiche matching the filter, ordered by display number.
    async fn list_pratiche(&self, filter: &PraticaFilter) -> Result<Vec<Pratica>>;

    /// Delete a pratica. Deleting a missing pratica is not an error.
    async fn delete_pratica(&mut self, id: &PraticaId) -> Result<()>;

    /// Find a pratica by display number.
    async fn find_by_numero(&self, numero: PraticaNum) -> Result<Option<Pratica>> {
        let filter = PraticaFilter {
            year: Some(numero.year),
            ..Default::default()
        };
        Ok(self
            .list_pratiche(&filter)
            .await?
            .into_iter()
            .find(|p| p.numero == numero))
    }

    // === Sequence allocation ===

    /// Allocate the next display sequence for `year`, starting at 1.
    async fn next_sequence(&self, year: i32) -> Result<u32>;
}
