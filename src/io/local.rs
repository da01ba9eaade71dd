use super::AssetSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Reads assets and archives from the local filesystem
pub struct LocalFileSource;

#[async_trait]
impl AssetSource for LocalFileSource {
    async fn read_all(&self, location: &str) -> Result<Vec<u8>> {
        fs::read(location)
            .await
            .with_context(|| format!("Failed to read {}", location))
    }
}

/// Persist an archive blob as `<dir>/<name>`, creating `dir` if needed.
pub async fn save_archive(dir: &Path, name: &str, blob: &[u8]) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).await?;
    }

    let path = dir.join(name);
    let mut file = fs::File::create(&path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(blob).await?;
    file.flush().await?;

    tracing::info!(path = %path.display(), bytes = blob.len(), "saved bundle");
    Ok(path)
}
