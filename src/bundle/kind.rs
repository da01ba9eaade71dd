//! Classification of bundle entries by file extension.

use std::fmt;

/// Extension marking a GPU-compressed texture container.
pub const COMPRESSED_TEXTURE_EXTENSION: &str = "ktx2";

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "oga", "wav", "m4a", "aac", "flac", "webm"];

/// What kind of runtime resource an entry decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    StandardImage,
    CompressedTexture,
    Audio,
}

impl AssetKind {
    /// Classify an entry name by its extension, ignoring case.
    ///
    /// Anything that is neither a compressed texture nor a known audio
    /// format is treated as a standard image.
    pub fn classify(name: &str) -> Self {
        match extension(name) {
            Some(ext) if ext.eq_ignore_ascii_case(COMPRESSED_TEXTURE_EXTENSION) => {
                AssetKind::CompressedTexture
            }
            Some(ext) if AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)) => {
                AssetKind::Audio
            }
            _ => AssetKind::StandardImage,
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, AssetKind::Audio)
    }
}

/// Conventional image encodings the host decoder is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    pub fn from_name(name: &str) -> Self {
        let Some(ext) = extension(name) else {
            return ImageFormat::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "gif" => ImageFormat::Gif,
            "webp" => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// MIME type handed to the audio decoder for an entry name.
pub fn audio_mime_type(name: &str) -> &'static str {
    match extension(name).map(str::to_ascii_lowercase).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

fn extension(name: &str) -> Option<&str> {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}
