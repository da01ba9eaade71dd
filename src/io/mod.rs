mod http;
mod local;

pub use http::HttpSource;
pub use local::{LocalFileSource, save_archive};

use anyhow::Result;
use async_trait::async_trait;

/// File name used when persisting a bundle without an explicit name.
pub const DEFAULT_BUNDLE_NAME: &str = "bundle.zip";

/// Trait for fetching a whole asset or archive from some location
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Read every byte at the given location
    async fn read_all(&self, location: &str) -> Result<Vec<u8>>;
}

pub fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Pick the source able to serve `location`.
pub fn open_source(location: &str) -> Result<Box<dyn AssetSource>> {
    if is_http_url(location) {
        Ok(Box::new(HttpSource::new()?))
    } else {
        Ok(Box::new(LocalFileSource))
    }
}

/// Last path segment of a file path or URL, used as the entry name.
pub fn base_name(location: &str) -> &str {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
