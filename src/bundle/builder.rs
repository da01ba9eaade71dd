use std::collections::BTreeMap;

use anyhow::{Result, bail};

use super::level::CompressionLevel;
use crate::io::{AssetSource, base_name};
use crate::zip::ZipWriter;

/// One named buffer waiting to be packed.
#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    level: CompressionLevel,
}

/// Accumulates named byte buffers and packs them into a single ZIP bundle.
///
/// Adding entries is cheap; all compression happens in [`build`](Self::build).
/// Entries are kept sorted by name, so the same entry set always produces
/// the same archive bytes.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: BTreeMap<String, Entry>,
    default_level: CompressionLevel,
    output: Option<Vec<u8>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose entries default to `level` instead of 6.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            default_level: level,
            ..Self::default()
        }
    }

    /// Add or replace an entry using the builder's default level.
    ///
    /// # Errors
    ///
    /// Fails if `name` or `data` is empty. An empty buffer means the source
    /// was never fetched, which is a caller bug.
    pub fn add_entry(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let level = self.default_level;
        self.insert(name, data, level)
    }

    /// Add or replace an entry with an explicit level in `0..=9`.
    pub fn add_entry_with_level(&mut self, name: &str, data: Vec<u8>, level: u32) -> Result<()> {
        let level = CompressionLevel::new(level)?;
        self.insert(name, data, level)
    }

    /// Fetch `location` through `source` and add it under its base name.
    ///
    /// Returns the entry name used.
    pub async fn add_from_source(
        &mut self,
        source: &dyn AssetSource,
        location: &str,
    ) -> Result<String> {
        let data = source.read_all(location).await?;
        let name = base_name(location).to_string();
        self.add_entry(&name, data)?;
        Ok(name)
    }

    fn insert(&mut self, name: &str, data: Vec<u8>, level: CompressionLevel) -> Result<()> {
        if name.is_empty() {
            bail!("Entry name must not be empty");
        }
        if data.is_empty() {
            bail!("Entry {} has no data", name);
        }

        if self
            .entries
            .insert(name.to_string(), Entry { data, level })
            .is_some()
        {
            tracing::debug!(name, "replaced bundle entry");
        }
        Ok(())
    }

    /// Compress every entry into one archive.
    ///
    /// The result is also kept as the builder's current output.
    pub fn build(&mut self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new();
        for (name, entry) in &self.entries {
            writer.add(name, &entry.data, entry.level.get())?;
        }
        let blob = writer.finish()?;

        tracing::info!(
            entries = self.entries.len(),
            bytes = blob.len(),
            "built bundle"
        );
        self.output = Some(blob.clone());
        Ok(blob)
    }

    /// Archive produced by the last [`build`](Self::build), if any.
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Drop all entries so the builder can be reused.
    ///
    /// Archives already returned by `build` are unaffected.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
