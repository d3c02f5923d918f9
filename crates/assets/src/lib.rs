//! Asset loading: texture images and asset-root path resolution.
//!
//! Scene descriptions refer to assets by web-style paths such as
//! `/assets/textures/diffuse/sand.jpg`. An [`AssetRoot`] maps those onto the
//! local filesystem; a leading `/` means "relative to the root".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Directory that root-relative asset paths resolve against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRoot {
    dir: PathBuf,
}

impl AssetRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve an asset path. Absolute web-style paths (`/assets/..`) and
    /// plain relative paths both land under the root directory.
    pub fn resolve(&self, asset: &str) -> PathBuf {
        self.dir.join(asset.trim_start_matches('/'))
    }

    /// Resolve and decode an image.
    pub fn load_image(&self, asset: &str) -> Result<ImageData, AssetError> {
        load_image(self.resolve(asset))
    }
}

impl Default for AssetRoot {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Decoded image pixels in tightly packed RGBA8 rows.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// A single-pixel image, used as a stand-in binding for absent textures.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Decode an image file into RGBA8.
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData, AssetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    tracing::debug!("loaded image {} ({width}x{height})", path.display());

    Ok(ImageData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

pub fn crate_info() -> &'static str {
    "tableau-assets v0.1.0"
}
