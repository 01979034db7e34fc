use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use uuid::Uuid;

/// One JSON file holding `id -> record` for a single entity type.
///
/// A missing file reads as an empty collection. Every mutation rewrites the
/// whole file; there is no cross-process locking.
#[derive(Debug)]
pub struct JsonCollection<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    async fn load(&self) -> Result<BTreeMap<Uuid, T>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    async fn save(&self, records: &BTreeMap<Uuid, T>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(records).context("serializing collection")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = records.len(), "collection saved");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<T>> {
        Ok(self.load().await?.into_values().collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.load().await?.remove(&id))
    }

    pub async fn insert(&self, id: Uuid, record: &T) -> Result<()> {
        let mut records = self.load().await?;
        records.insert(id, record.clone());
        self.save(&records).await
    }

    /// Applies `change` to the record and persists it. `None` when absent.
    pub async fn update<F>(&self, id: Uuid, change: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.load().await?;
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.save(&records).await?;
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: Uuid) -> Result<Option<T>> {
        let mut records = self.load().await?;
        let removed = records.remove(&id);
        if removed.is_some() {
            self.save(&records).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let notes: JsonCollection<Note> = JsonCollection::new(dir.path().join("notes.json"));
        assert!(notes.list().await.unwrap().is_empty());
        assert_eq!(notes.get(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_update_remove() {
        let dir = tempfile::tempdir().unwrap();
        let notes = JsonCollection::new(dir.path().join("nested/notes.json"));
        let id = Uuid::new_v4();

        notes.insert(id, &note("first")).await.unwrap();
        assert_eq!(notes.get(id).await.unwrap(), Some(note("first")));

        let updated = notes.update(id, |n: &mut Note| n.text.push_str("!")).await.unwrap();
        assert_eq!(updated, Some(note("first!")));

        assert_eq!(notes.remove(id).await.unwrap(), Some(note("first!")));
        assert_eq!(notes.remove(id).await.unwrap(), None);
        assert!(notes.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let notes: JsonCollection<Note> = JsonCollection::new(&path);
        let result = notes.update(Uuid::new_v4(), |n| n.text.clear()).await.unwrap();
        assert_eq!(result, None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "{not json").unwrap();
        let notes: JsonCollection<Note> = JsonCollection::new(path);
        assert!(notes.list().await.is_err());
    }
}
