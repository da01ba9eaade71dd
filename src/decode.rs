//! A host-independent [`Decoder`] that validates entries without rendering them.
//!
//! [`ProbeDecoder`] checks each entry's signature against its declared
//! format and reads dimensions from the headers it understands. The handles
//! it produces describe the asset; they hold no pixel or sample data.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use anyhow::{Result, bail};

use crate::bundle::{Decoder, Disposable, ImageFormat, Playable};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const KTX2_IDENTIFIER: &[u8] = &[
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Metadata of a decoded image or texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: &'static str,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: usize,
}

impl Disposable for ImageInfo {}

/// Metadata of a decoded sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInfo {
    pub mime_type: String,
    pub container: &'static str,
    pub size: usize,
}

impl Disposable for AudioInfo {}
impl Playable for AudioInfo {}

/// Signature-checking decoder used by the command line tool.
#[derive(Debug, Default)]
pub struct ProbeDecoder {
    decoded: usize,
}

impl ProbeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful decodes so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

fn sniff_image(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else {
        None
    }
}

fn image_dimensions(format: ImageFormat, bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    match format {
        // Signature, chunk length and "IHDR" precede width and height.
        ImageFormat::Png if bytes.len() >= 24 && &bytes[12..16] == b"IHDR" => (
            Some(BigEndian::read_u32(&bytes[16..20])),
            Some(BigEndian::read_u32(&bytes[20..24])),
        ),
        ImageFormat::Gif if bytes.len() >= 10 => (
            Some(LittleEndian::read_u16(&bytes[6..8]) as u32),
            Some(LittleEndian::read_u16(&bytes[8..10]) as u32),
        ),
        _ => (None, None),
    }
}

fn sniff_audio(bytes: &[u8]) -> Option<&'static str> {
    // MPEG frame sync; a layer field of 00 marks ADTS rather than MP3.
    let frame_sync = bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0;

    if frame_sync && bytes[1] & 0xF6 == 0xF0 {
        Some("aac")
    } else if bytes.starts_with(b"ID3") || frame_sync {
        Some("mp3")
    } else if bytes.starts_with(b"OggS") {
        Some("ogg")
    } else if bytes.starts_with(b"fLaC") {
        Some("flac")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        Some("wav")
    } else if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        Some("mp4")
    } else if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        Some("webm")
    } else {
        None
    }
}

impl Decoder for ProbeDecoder {
    type Image = ImageInfo;
    type Audio = AudioInfo;

    fn decode_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<ImageInfo> {
        let Some(sniffed) = sniff_image(bytes) else {
            bail!("unrecognized image data");
        };
        if format != ImageFormat::Unknown && format != sniffed {
            bail!("declared {} but data is {}", format, sniffed);
        }

        let (width, height) = image_dimensions(sniffed, bytes);
        self.decoded += 1;
        Ok(ImageInfo {
            format: sniffed.mime_type(),
            width,
            height,
            size: bytes.len(),
        })
    }

    fn decode_compressed_texture(&mut self, bytes: &[u8], name: &str) -> Result<ImageInfo> {
        if bytes.len() < 28 || !bytes.starts_with(KTX2_IDENTIFIER) {
            bail!("{} is not a KTX2 texture", name);
        }

        // vkFormat and typeSize sit between the identifier and the extent.
        self.decoded += 1;
        Ok(ImageInfo {
            format: "image/ktx2",
            width: Some(LittleEndian::read_u32(&bytes[20..24])),
            height: Some(LittleEndian::read_u32(&bytes[24..28])),
            size: bytes.len(),
        })
    }

    fn decode_audio(&mut self, bytes: &[u8], mime_type: &str) -> Result<AudioInfo> {
        let Some(container) = sniff_audio(bytes) else {
            bail!("unrecognized audio data");
        };

        self.decoded += 1;
        Ok(AudioInfo {
            mime_type: mime_type.to_string(),
            container,
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{AssetKind, audio_mime_type};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    fn ktx2(width: u32, height: u32) -> Vec<u8> {
        let mut data = KTX2_IDENTIFIER.to_vec();
        data.extend_from_slice(&0u32.to_le_bytes()); // vkFormat
        data.extend_from_slice(&1u32.to_le_bytes()); // typeSize
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data
    }

    #[test]
    fn test_png_dimensions() {
        let mut decoder = ProbeDecoder::new();
        let info = decoder.decode_image(&png(64, 32), ImageFormat::Png).unwrap();
        assert_eq!(info.format, "image/png");
        assert_eq!((info.width, info.height), (Some(64), Some(32)));
        assert_eq!(decoder.decoded(), 1);
    }

    #[test]
    fn test_declared_format_must_match() {
        let mut decoder = ProbeDecoder::new();
        assert!(decoder.decode_image(&png(1, 1), ImageFormat::Jpeg).is_err());
        assert!(decoder.decode_image(&png(1, 1), ImageFormat::Unknown).is_ok());
        assert!(decoder.decode_image(b"garbage", ImageFormat::Png).is_err());
    }

    #[test]
    fn test_ktx2_extent() {
        let mut decoder = ProbeDecoder::new();
        let info = decoder
            .decode_compressed_texture(&ktx2(256, 128), "die1.ktx2")
            .unwrap();
        assert_eq!((info.width, info.height), (Some(256), Some(128)));
        assert!(
            decoder
                .decode_compressed_texture(&png(1, 1), "fake.ktx2")
                .is_err()
        );
    }

    #[test]
    fn test_audio_containers() {
        let mut decoder = ProbeDecoder::new();
        let mp3 = decoder.decode_audio(b"ID3\x04\x00rest", "audio/mpeg").unwrap();
        assert_eq!(mp3.container, "mp3");
        assert_eq!(mp3.mime_type, "audio/mpeg");
        assert_eq!(
            decoder.decode_audio(b"OggS\x00\x02", "audio/ogg").unwrap().container,
            "ogg"
        );
        assert!(decoder.decode_audio(b"nope", "audio/mpeg").is_err());
    }

    #[test]
    fn test_every_audio_extension_has_a_container() {
        let samples: &[(&str, &[u8], &str)] = &[
            ("a.mp3", b"\xFF\xFB\x90\x00", "mp3"),
            ("a.aac", b"\xFF\xF1\x50\x80", "aac"),
            ("a.m4a", b"\x00\x00\x00\x20ftypM4A ", "mp4"),
            ("a.webm", b"\x1A\x45\xDF\xA3\x9F", "webm"),
            ("a.ogg", b"OggS\x00", "ogg"),
            ("a.oga", b"OggS\x00", "ogg"),
            ("a.wav", b"RIFF\x24\x00\x00\x00WAVE", "wav"),
            ("a.flac", b"fLaC\x00", "flac"),
        ];

        let mut decoder = ProbeDecoder::new();
        for &(name, bytes, container) in samples {
            assert_eq!(AssetKind::classify(name), AssetKind::Audio, "{}", name);
            let info = decoder.decode_audio(bytes, audio_mime_type(name)).unwrap();
            assert_eq!(info.container, container, "{}", name);
        }
    }
}
