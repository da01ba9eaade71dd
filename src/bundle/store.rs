use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};

use crate::zip::ZipExtractor;

/// Lifecycle of an [`ArchiveStore`].
///
/// `Empty` is only ever the initial state: an archive can be replaced but
/// never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No archive has been set yet.
    Empty,
    /// An archive is held but nothing has been decompressed from it.
    Archived,
    /// The whole archive has been decompressed into the extraction cache.
    Extracted,
}

/// Holds one archive blob and serves its entries from a lazily filled cache.
///
/// The first [`extract`](Self::extract) decompresses every entry in a single
/// pass. Later lookups, including lookups of names that do not exist, are
/// answered from the cache without touching the blob again.
pub struct ArchiveStore {
    archive: Option<Vec<u8>>,
    extracted: HashMap<String, Vec<u8>>,
    state: StoreState,
    passes: usize,
}

impl ArchiveStore {
    pub fn new() -> Self {
        Self {
            archive: None,
            extracted: HashMap::new(),
            state: StoreState::Empty,
            passes: 0,
        }
    }

    /// Replace the active archive, discarding everything extracted from the old one.
    pub fn set_archive(&mut self, blob: Vec<u8>) {
        tracing::debug!(bytes = blob.len(), "archive replaced");
        self.archive = Some(blob);
        self.extracted = HashMap::new();
        self.state = StoreState::Archived;
    }

    /// Raw bytes of `name` from the active archive.
    ///
    /// Returns `Ok(None)` if the archive has no such entry.
    ///
    /// # Errors
    ///
    /// Fails if no archive has been set or the archive cannot be decompressed.
    /// A failed pass leaves the extraction cache empty.
    pub fn extract(&mut self, name: &str) -> Result<Option<&[u8]>> {
        match self.state {
            StoreState::Empty => bail!("No archive has been loaded"),
            StoreState::Archived => self.unpack()?,
            StoreState::Extracted => {}
        }

        let found = self.extracted.get(name).map(Vec::as_slice);
        if found.is_none() {
            tracing::warn!(name, "entry not found in archive");
        }
        Ok(found)
    }

    fn unpack(&mut self) -> Result<()> {
        let archive = self
            .archive
            .as_deref()
            .ok_or_else(|| anyhow!("No archive has been loaded"))?;

        let files = ZipExtractor::new(archive).extract_all()?;
        tracing::debug!(entries = files.len(), "decompressed archive");

        self.extracted = files;
        self.state = StoreState::Extracted;
        self.passes += 1;
        Ok(())
    }

    /// Free the decompressed bytes while keeping the archive for a later pass.
    pub fn reset_extraction(&mut self) {
        self.extracted = HashMap::new();
        if self.state == StoreState::Extracted {
            self.state = StoreState::Archived;
        }
    }

    /// Names of every file in the active archive, read from its directory
    /// without decompressing anything.
    pub fn entry_names(&self) -> Result<Vec<String>> {
        let archive = self
            .archive
            .as_deref()
            .ok_or_else(|| anyhow!("No archive has been loaded"))?;

        Ok(ZipExtractor::new(archive)
            .list_files()?
            .into_iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.file_name)
            .collect())
    }

    pub fn archive(&self) -> Option<&[u8]> {
        self.archive.as_deref()
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Number of full decompression passes run over the store's lifetime.
    pub fn extraction_passes(&self) -> usize {
        self.passes
    }
}

impl Default for ArchiveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ArchiveBuilder;

    fn blob(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = ArchiveBuilder::new();
        for (name, data) in entries {
            builder.add_entry(name, data.to_vec()).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_extract_without_archive_fails() {
        let mut store = ArchiveStore::new();
        assert_eq!(store.state(), StoreState::Empty);
        assert!(store.extract("x").is_err());
    }

    #[test]
    fn test_single_pass_serves_every_name() {
        let mut store = ArchiveStore::new();
        store.set_archive(blob(&[("a", b"aaa"), ("b", b"bb")]));
        assert_eq!(store.state(), StoreState::Archived);

        assert_eq!(store.extract("a").unwrap(), Some(&b"aaa"[..]));
        assert_eq!(store.state(), StoreState::Extracted);
        assert_eq!(store.extract("b").unwrap(), Some(&b"bb"[..]));
        assert_eq!(store.extract("missing").unwrap(), None);
        assert_eq!(store.extraction_passes(), 1);
    }

    #[test]
    fn test_replacing_archive_drops_stale_bytes() {
        let mut store = ArchiveStore::new();
        store.set_archive(blob(&[("x", b"old")]));
        assert_eq!(store.extract("x").unwrap(), Some(&b"old"[..]));

        store.set_archive(blob(&[("x", b"new")]));
        assert_eq!(store.state(), StoreState::Archived);
        assert_eq!(store.extract("x").unwrap(), Some(&b"new"[..]));
        assert_eq!(store.extraction_passes(), 2);
    }

    #[test]
    fn test_reset_extraction_keeps_archive() {
        let mut store = ArchiveStore::new();
        store.set_archive(blob(&[("x", b"data")]));
        store.extract("x").unwrap();

        store.reset_extraction();
        assert_eq!(store.state(), StoreState::Archived);
        assert!(store.archive().is_some());
        assert_eq!(store.extract("x").unwrap(), Some(&b"data"[..]));
        assert_eq!(store.extraction_passes(), 2);
    }

    #[test]
    fn test_corrupt_archive_is_fatal_and_leaves_no_cache() {
        let mut store = ArchiveStore::new();
        store.set_archive(b"definitely not a zip archive".to_vec());

        assert!(store.extract("x").is_err());
        assert_eq!(store.state(), StoreState::Archived);
        assert_eq!(store.extraction_passes(), 0);
    }

    #[test]
    fn test_entry_names() {
        let mut store = ArchiveStore::new();
        assert!(store.entry_names().is_err());

        store.set_archive(blob(&[("b", b"1"), ("a", b"2")]));
        assert_eq!(store.entry_names().unwrap(), ["a", "b"]);
        assert_eq!(store.state(), StoreState::Archived);
    }
}
