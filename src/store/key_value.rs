use std::{
    future::Future,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Interface for abstracting the key-value store holding persisted state. Every key maps to an
/// independent JSON document that is read and replaced as a whole.
pub trait KeyValueStore {
    /// Reads the payload stored under `key`. A key that was never written reads as [None].
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Replaces the payload stored under `key`.
    fn write(&self, key: &str, payload: &str) -> impl Future<Output = Result<()>>;
}

/// The main realization of [KeyValueStore]. Each key lives in its own `<key>.json` file inside a
/// single directory.
pub struct JsonKeyValueStore {
    store_dir: PathBuf,
}

impl JsonKeyValueStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonKeyValueStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        debug!("Reading {path:?}");
        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut payload = String::new();
        let result = file.read_to_string(&mut payload).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(payload))
    }

    async fn write(&self, key: &str, payload: &str) -> Result<()> {
        let path = self.key_path(key);
        debug!("Writing {path:?}");
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = write_with_file(&mut file, payload).await;
        file.unlock_async().await?;
        result
    }
}

async fn write_with_file(file: &mut File, payload: &str) -> Result<()> {
    file.write_all(payload.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{JsonKeyValueStore, KeyValueStore};

    #[tokio::test]
    async fn missing_key_reads_as_none() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonKeyValueStore::new(dir.path().to_owned())?;

        assert_eq!(storage.read("workouts").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn write_then_read_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonKeyValueStore::new(dir.path().to_owned())?;

        storage.write("workouts", r#"[{"id":"1"}]"#).await?;

        assert_eq!(
            storage.read("workouts").await?.as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
        Ok(())
    }

    #[tokio::test]
    async fn write_replaces_previous_payload() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonKeyValueStore::new(dir.path().to_owned())?;

        storage.write("daily_completion", "a long initial payload").await?;
        storage.write("daily_completion", "short").await?;

        assert_eq!(
            storage.read("daily_completion").await?.as_deref(),
            Some("short")
        );
        Ok(())
    }
}
