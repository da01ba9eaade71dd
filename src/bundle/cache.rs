use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use super::decoder::{Decoder, Disposable, Playable};
use super::kind::{AssetKind, ImageFormat, audio_mime_type};
use super::store::{ArchiveStore, StoreState};

/// Coarse state of a [`ResourceCache`] session.
///
/// Decoded handles and extracted bytes are released independently, so the
/// state reflects what is actually still held. After
/// [`reset_decoded`](ResourceCache::reset_decoded) it reports `Extracted`,
/// not `Archived`, when the extracted bytes are still cached; it only drops
/// to `Archived` once [`reset_extraction`](ResourceCache::reset_extraction)
/// runs as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Archived,
    Extracted,
    /// At least one handle is cached.
    Decoded,
}

enum Decoded<I, A> {
    Image(Arc<I>),
    Audio(Arc<A>),
}

impl<I: Disposable, A: Disposable> Decoded<I, A> {
    fn dispose(&self) {
        match self {
            Decoded::Image(image) => image.dispose(),
            Decoded::Audio(audio) => audio.dispose(),
        }
    }
}

/// Outcome of a best-effort [`ResourceCache::preload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<String>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decodes archive entries into runtime resources, at most once per name.
///
/// The cache owns its [`ArchiveStore`]; replacing the archive through
/// [`set_archive`](Self::set_archive) disposes every decoded handle and
/// drops every extracted buffer, so nothing derived from an old archive can
/// be returned afterwards.
///
/// Missing entries and decode failures are logged and reported as `None`.
/// Only a broken archive is an error.
pub struct ResourceCache<D: Decoder> {
    store: ArchiveStore,
    decoder: D,
    decoded: HashMap<String, Decoded<D::Image, D::Audio>>,
}

impl<D: Decoder> ResourceCache<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            store: ArchiveStore::new(),
            decoder,
            decoded: HashMap::new(),
        }
    }

    /// Start a new session on `blob`.
    pub fn set_archive(&mut self, blob: Vec<u8>) {
        self.reset_decoded();
        self.store.set_archive(blob);
    }

    /// Image handle for `name`, decoding it on first request.
    ///
    /// `.ktx2` entries go through
    /// [`Decoder::decode_compressed_texture`]; everything else through
    /// [`Decoder::decode_image`].
    pub fn get_image(&mut self, name: &str) -> Result<Option<Arc<D::Image>>> {
        match self.decoded.get(name) {
            Some(Decoded::Image(image)) => {
                tracing::debug!(name, "image cache hit");
                return Ok(Some(Arc::clone(image)));
            }
            Some(Decoded::Audio(_)) => {
                tracing::warn!(name, "entry is cached as audio, not an image");
                return Ok(None);
            }
            None => {}
        }

        let Some(bytes) = self.store.extract(name)? else {
            return Ok(None);
        };

        let decoded = match AssetKind::classify(name) {
            AssetKind::CompressedTexture => self.decoder.decode_compressed_texture(bytes, name),
            _ => self
                .decoder
                .decode_image(bytes, ImageFormat::from_name(name)),
        };

        match decoded {
            Ok(image) => {
                let image = Arc::new(image);
                self.decoded
                    .insert(name.to_string(), Decoded::Image(Arc::clone(&image)));
                tracing::debug!(name, "decoded image");
                Ok(Some(image))
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "failed to decode image, skipping");
                Ok(None)
            }
        }
    }

    /// Audio handle for `name`, decoding it on first request.
    ///
    /// A cached handle is rewound before being returned again.
    pub fn get_audio(&mut self, name: &str) -> Result<Option<Arc<D::Audio>>> {
        match self.decoded.get(name) {
            Some(Decoded::Audio(audio)) => {
                tracing::debug!(name, "audio cache hit");
                audio.rewind();
                return Ok(Some(Arc::clone(audio)));
            }
            Some(Decoded::Image(_)) => {
                tracing::warn!(name, "entry is cached as an image, not audio");
                return Ok(None);
            }
            None => {}
        }

        let Some(bytes) = self.store.extract(name)? else {
            return Ok(None);
        };

        match self.decoder.decode_audio(bytes, audio_mime_type(name)) {
            Ok(audio) => {
                let audio = Arc::new(audio);
                self.decoded
                    .insert(name.to_string(), Decoded::Audio(Arc::clone(&audio)));
                tracing::debug!(name, "decoded audio");
                Ok(Some(audio))
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "failed to decode audio, skipping");
                Ok(None)
            }
        }
    }

    /// Decode every name, skipping the ones that are missing or undecodable.
    ///
    /// Each name is dispatched by [`AssetKind::classify`]. The first archive
    /// error aborts the load; handles decoded before it stay cached.
    pub fn preload<I, S>(&mut self, names: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = LoadReport::default();

        for name in names {
            let name = name.as_ref();
            let found = match AssetKind::classify(name) {
                AssetKind::Audio => self.get_audio(name)?.is_some(),
                AssetKind::StandardImage | AssetKind::CompressedTexture => {
                    self.get_image(name)?.is_some()
                }
            };

            if found {
                report.loaded += 1;
            } else {
                report.skipped.push(name.to_string());
            }
        }

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "preload finished"
        );
        if !report.is_complete() {
            tracing::warn!(skipped = ?report.skipped, "some assets were skipped");
        }

        Ok(report)
    }

    /// Free decompressed bytes; decoded handles and the archive are kept.
    pub fn reset_extraction(&mut self) {
        self.store.reset_extraction();
    }

    /// Dispose and drop every decoded handle.
    pub fn reset_decoded(&mut self) {
        for (_, resource) in self.decoded.drain() {
            resource.dispose();
        }
    }

    pub fn state(&self) -> SessionState {
        if !self.decoded.is_empty() {
            return SessionState::Decoded;
        }
        match self.store.state() {
            StoreState::Empty => SessionState::Empty,
            StoreState::Archived => SessionState::Archived,
            StoreState::Extracted => SessionState::Extracted,
        }
    }

    /// The active archive blob, e.g. for saving it to disk.
    pub fn archive(&self) -> Option<&[u8]> {
        self.store.archive()
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn is_decoded(&self, name: &str) -> bool {
        self.decoded.contains_key(name)
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded.len()
    }
}
