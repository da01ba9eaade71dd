//! # assetzip
//!
//! Pack many game assets into one ZIP bundle and load them back lazily.
//!
//! A bundle is built once from named buffers, shipped as a single file, and
//! later held by a [`ResourceCache`] that decompresses it on the first
//! request and decodes each entry into an image or audio handle at most
//! once. Decoding is delegated to a host-provided [`Decoder`], which keeps
//! the caching and invalidation logic independent of any rendering or audio
//! engine.
//!
//! ## Features
//!
//! - Standard ZIP output, readable by any unzip tool
//! - Per-entry compression level (0-9, default 6), deterministic builds
//! - Single decompression pass per archive, shared by every lookup
//! - Memoized decoded handles, disposed when the archive is replaced
//! - Best-effort bulk loading that skips missing or undecodable assets
//! - Bundles and assets fetched from local paths or HTTP URLs
//!
//! ## Example
//!
//! ```
//! use assetzip::bundle::{ArchiveBuilder, ResourceCache};
//! use assetzip::decode::ProbeDecoder;
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add_entry("soundBonus.mp3", b"ID3\x04\x00...".to_vec())?;
//! let blob = builder.build()?;
//!
//! let mut cache = ResourceCache::new(ProbeDecoder::new());
//! cache.set_archive(blob);
//!
//! let report = cache.preload(["soundBonus.mp3", "die1.png"])?;
//! assert_eq!(report.loaded, 1);
//! assert_eq!(report.skipped, ["die1.png"]);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bundle;
pub mod cli;
pub mod decode;
pub mod io;
pub mod zip;

pub use bundle::{ArchiveBuilder, ArchiveStore, Decoder, ResourceCache};
pub use cli::Cli;
pub use io::{AssetSource, HttpSource, LocalFileSource};
