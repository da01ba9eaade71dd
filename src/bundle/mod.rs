//! Asset bundles and the lazy resource cache built on top of them.
//!
//! - [`ArchiveBuilder`] packs named buffers into one ZIP bundle.
//! - [`ArchiveStore`] holds one bundle and decompresses it once, on demand.
//! - [`ResourceCache`] turns extracted entries into image or audio handles
//!   through an injected [`Decoder`] and keeps one handle per name.
//!
//! ```
//! use assetzip::bundle::{ArchiveBuilder, ArchiveStore};
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add_entry("die1.png", vec![0x89; 2048])?;
//! let blob = builder.build()?;
//!
//! let mut store = ArchiveStore::new();
//! store.set_archive(blob);
//! assert_eq!(store.extract("die1.png")?.map(<[u8]>::len), Some(2048));
//! assert!(store.extract("die2.png")?.is_none());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod builder;
mod cache;
mod decoder;
mod kind;
mod level;
mod store;

pub use builder::ArchiveBuilder;
pub use cache::{LoadReport, ResourceCache, SessionState};
pub use decoder::{Decoder, Disposable, Playable};
pub use kind::{AssetKind, COMPRESSED_TEXTURE_EXTENSION, ImageFormat, audio_mime_type};
pub use level::CompressionLevel;
pub use store::{ArchiveStore, StoreState};
