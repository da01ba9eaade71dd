#![allow(dead_code)]

use anyhow::{Result, bail};
use assetzip::bundle::{ArchiveBuilder, Decoder, Disposable, ImageFormat, Playable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    });
}

/// Image or audio handle produced by [`CountingDecoder`].
#[derive(Debug)]
pub struct Stub {
    pub bytes: Vec<u8>,
    pub kind: &'static str,
    disposals: Arc<AtomicUsize>,
}

impl Disposable for Stub {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

impl Playable for Stub {}

/// Decoder stub that counts calls and rejects payloads starting with `bad`.
#[derive(Debug, Default)]
pub struct CountingDecoder {
    pub images: usize,
    pub textures: usize,
    pub audio: usize,
    pub disposals: Arc<AtomicUsize>,
}

impl CountingDecoder {
    pub fn calls(&self) -> usize {
        self.images + self.textures + self.audio
    }

    pub fn disposed(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    fn stub(&self, bytes: &[u8], kind: &'static str) -> Result<Stub> {
        if bytes.starts_with(b"bad") {
            bail!("cannot decode {}", kind);
        }
        Ok(Stub {
            bytes: bytes.to_vec(),
            kind,
            disposals: Arc::clone(&self.disposals),
        })
    }
}

impl Decoder for CountingDecoder {
    type Image = Stub;
    type Audio = Stub;

    fn decode_image(&mut self, bytes: &[u8], _format: ImageFormat) -> Result<Stub> {
        self.images += 1;
        self.stub(bytes, "image")
    }

    fn decode_compressed_texture(&mut self, bytes: &[u8], _name: &str) -> Result<Stub> {
        self.textures += 1;
        self.stub(bytes, "texture")
    }

    fn decode_audio(&mut self, bytes: &[u8], _mime_type: &str) -> Result<Stub> {
        self.audio += 1;
        self.stub(bytes, "audio")
    }
}

/// Deterministic, poorly compressible test payload.
pub fn payload(seed: u8, len: usize) -> Vec<u8> {
    let mut state = seed as u32 | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

pub fn bundle(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut builder = ArchiveBuilder::new();
    for (name, data) in entries {
        builder.add_entry(name, data.clone()).unwrap();
    }
    builder.build().unwrap()
}
