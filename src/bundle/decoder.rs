use anyhow::Result;

use super::kind::ImageFormat;

/// Release contract for a decoded handle.
///
/// Called once by [`ResourceCache::reset_decoded`](super::ResourceCache::reset_decoded)
/// before the cache drops its reference. Callers may still hold clones of the
/// handle afterwards; `dispose` is where host resources (GPU textures, audio
/// buffers) should be freed.
pub trait Disposable {
    fn dispose(&self) {}
}

/// A decoded sound that can be handed out more than once.
pub trait Playable: Disposable {
    /// Stop playback and seek to the start.
    ///
    /// Called every time a cached handle is returned again.
    fn rewind(&self) {}
}

/// Host capability that turns raw entry bytes into runtime resources.
///
/// The cache owns the caching and invalidation logic and only calls into the
/// decoder on a miss, so a stub implementation is enough to test it.
pub trait Decoder {
    type Image: Disposable;
    type Audio: Playable;

    /// Decode a conventional image (PNG, JPEG, ...).
    fn decode_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<Self::Image>;

    /// Decode a GPU-compressed texture container. `name` is the entry name.
    fn decode_compressed_texture(&mut self, bytes: &[u8], name: &str) -> Result<Self::Image>;

    /// Decode a sound. `mime_type` is derived from the entry's extension.
    fn decode_audio(&mut self, bytes: &[u8], mime_type: &str) -> Result<Self::Audio>;
}
