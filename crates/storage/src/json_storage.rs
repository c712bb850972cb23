//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON file per pratica under `pratiche/` and one
//! counter file per year under `sequences/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pratiche_core::{Pratica, PraticaFilter, PraticaId};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Result, Storage, StorageError};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    sequence_lock: Arc<Mutex<()>>,
}

/// Persisted state of one year's sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SequenceState {
    year: i32,
    last: u32,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directories it needs.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("pratiche")).await?;
        fs::create_dir_all(root.join("sequences")).await?;

        Ok(Self {
            root,
            sequence_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pratica_path(&self, id: &PraticaId) -> Result<PathBuf> {
        let id = id.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StorageError::Other(format!("invalid pratica id: {id:?}")));
        }
        Ok(self.root.join("pratiche").join(format!("{id}.json")))
    }

    fn sequence_path(&self, year: i32) -> PathBuf {
        self.root.join("sequences").join(format!("{year}.json"))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_pratica(&mut self, pratica: &Pratica) -> Result<()> {
        let path = self.pratica_path(&pratica.id)?;
        let json = serde_json::to_string_pretty(pratica)?;
        write_atomic(&path, json.as_bytes()).await?;
        debug!(id = %pratica.id, numero = %pratica.numero, "saved pratica");
        Ok(())
    }

    async fn load_pratica(&self, id: &PraticaId) -> Result<Option<Pratica>> {
        read_json(&self.pratica_path(id)?).await
    }

    async fn list_pratiche(&self, filter: &PraticaFilter) -> Result<Vec<Pratica>> {
        let all: Vec<Pratica> = list_dir(&self.root.join("pratiche")).await?;
        let mut matching: Vec<Pratica> = all.into_iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| a.numero.cmp(&b.numero));
        Ok(matching)
    }

    async fn delete_pratica(&mut self, id: &PraticaId) -> Result<()> {
        fs::remove_file(self.pratica_path(id)?).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }

    async fn next_sequence(&self, year: i32) -> Result<u32> {
        let _guard = self.sequence_lock.lock().await;

        let path = self.sequence_path(year);
        let last = read_json::<SequenceState>(&path)
            .await?
            .map(|state| state.last)
            .unwrap_or(0);
        let next = last
            .checked_add(1)
            .ok_or_else(|| StorageError::Other(format!("sequence for {year} exhausted")))?;

        let state = SequenceState {
            year,
            last: next,
            updated_at: chrono::Utc::now(),
        };
        write_atomic(&path, serde_json::to_string_pretty(&state)?.as_bytes()).await?;
        debug!(year, seq = next, "allocated sequence");
        Ok(next)
    }
}

/// Write through a temporary file so readers never see a partial record.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "skipping unreadable record");
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pratiche_core::{Cliente, Fase, PraticaNum, Tipo};

    fn create_test_pratica(year: i32, seq: u32, tipo: Tipo) -> Pratica {
        Pratica::new(
            PraticaId::new(),
            PraticaNum::new(year, seq),
            tipo,
            Cliente {
                nome: format!("Cliente {seq}"),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let pratica = create_test_pratica(2024, 1, Tipo::Nuovo);
        storage.save_pratica(&pratica).await.unwrap();

        let loaded = storage.load_pratica(&pratica.id).await.unwrap().unwrap();
        assert_eq!(loaded, pratica);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        let loaded = storage.load_pratica(&PraticaId::from("nope")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        let result = storage.load_pratica(&PraticaId::from("../escape")).await;
        assert!(matches!(result, Err(StorageError::Other(_))));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_pratica(&create_test_pratica(2024, 2, Tipo::Nuovo)).await.unwrap();
        storage.save_pratica(&create_test_pratica(2023, 9, Tipo::Riparazione)).await.unwrap();
        storage.save_pratica(&create_test_pratica(2024, 1, Tipo::Riparazione)).await.unwrap();
        fs::write(dir.path().join("pratiche").join("README.txt"), b"ignored")
            .await
            .unwrap();

        let all = storage.list_pratiche(&PraticaFilter::default()).await.unwrap();
        let numeri: Vec<String> = all.iter().map(|p| p.numero.to_string()).collect();
        assert_eq!(numeri, vec!["P-2023-0009", "P-2024-0001", "P-2024-0002"]);

        let filter = PraticaFilter {
            tipo: Some(Tipo::Riparazione),
            year: Some(2024),
            ..Default::default()
        };
        let filtered = storage.list_pratiche(&filter).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].numero, PraticaNum::new(2024, 1));

        let filter = PraticaFilter {
            fase: Some(vec![Fase::Posa]),
            ..Default::default()
        };
        assert!(storage.list_pratiche(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_numero() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let pratica = create_test_pratica(2024, 5, Tipo::Nuovo);
        storage.save_pratica(&pratica).await.unwrap();

        let found = storage.find_by_numero(PraticaNum::new(2024, 5)).await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(pratica.id));
        assert!(storage.find_by_numero(PraticaNum::new(2025, 5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let pratica = create_test_pratica(2024, 1, Tipo::Nuovo);
        storage.save_pratica(&pratica).await.unwrap();
        storage.delete_pratica(&pratica.id).await.unwrap();
        assert!(storage.load_pratica(&pratica.id).await.unwrap().is_none());

        // deleting again is fine
        storage.delete_pratica(&pratica.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_sequence_is_per_year_and_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        assert_eq!(storage.next_sequence(2024).await.unwrap(), 1);
        assert_eq!(storage.next_sequence(2024).await.unwrap(), 2);
        assert_eq!(storage.next_sequence(2025).await.unwrap(), 1);
        assert_eq!(storage.next_sequence(2024).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sequence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = JsonStorage::new(dir.path()).await.unwrap();
            storage.next_sequence(2024).await.unwrap();
            storage.next_sequence(2024).await.unwrap();
        }
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        assert_eq!(storage.next_sequence(2024).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_allocation_is_unique() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonStorage::new(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move { storage.next_sequence(2024).await.unwrap() }));
        }
        let mut seqs = Vec::new();
        for handle in handles {
            seqs.push(handle.await.unwrap());
        }
        seqs.sort_unstable();
        assert_eq!(seqs, (1..=20).collect::<Vec<u32>>());
    }
}
