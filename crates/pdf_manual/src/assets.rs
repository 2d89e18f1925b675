//! Image asset sources.
//!
//! The content builder only needs to ask whether an asset exists and to decode
//! it into pixels with known dimensions. [`FsAssets`] reads files relative to a
//! root directory; [`MemoryAssets`] serves images that were generated or
//! embedded in memory.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::GenericImageView;

use crate::error::{Error, Result};

/// A decoded raster image shared between blocks and the renderer.
#[derive(Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Arc<image::DynamicImage>,
}

impl DecodedImage {
    /// Wraps an already decoded image.
    pub fn new(image: image::DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: Arc::new(image),
        }
    }

    /// Decodes an image from in-memory bytes, guessing the format from its signature.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> std::result::Result<Self, image::ImageError> {
        image::load_from_memory(bytes.as_ref()).map(Self::new)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The decoded pixel data.
    pub fn pixels(&self) -> &image::DynamicImage {
        &self.pixels
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PartialEq for DecodedImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && (Arc::ptr_eq(&self.pixels, &other.pixels)
                || self.pixels.to_bytes() == other.pixels.to_bytes())
    }
}

/// A readable source of raster images identified by path.
pub trait ImageAssets {
    /// Returns whether an asset exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Decodes the asset at `path`.
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// Image assets stored on the local filesystem.
///
/// Relative paths are resolved against the root directory; absolute paths are
/// used as given.
#[derive(Clone, Debug)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    /// Creates an asset source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ImageAssets for FsAssets {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let resolved = self.resolve(path);
        let reader = image::io::Reader::open(&resolved).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                Error::MissingAsset(resolved.clone())
            } else {
                Error::AssetDecode {
                    path: resolved.clone(),
                    source: err.into(),
                }
            }
        })?;

        let decode_error = |source| Error::AssetDecode {
            path: resolved.clone(),
            source,
        };
        let image = reader
            .with_guessed_format()
            .map_err(|err| decode_error(err.into()))?
            .decode()
            .map_err(decode_error)?;
        Ok(DecodedImage::new(image))
    }
}

/// Image assets held in memory, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    images: BTreeMap<PathBuf, MemoryAsset>,
}

#[derive(Clone, Debug)]
enum MemoryAsset {
    Decoded(DecodedImage),
    Encoded(Vec<u8>),
}

impl MemoryAssets {
    /// Creates an empty asset store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a decoded image under `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, image: image::DynamicImage) {
        self.images
            .insert(path.into(), MemoryAsset::Decoded(DecodedImage::new(image)));
    }

    /// Stores encoded bytes under `path`; decoding happens on lookup.
    pub fn insert_bytes(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.images
            .insert(path.into(), MemoryAsset::Encoded(bytes.into()));
    }

    /// Stores a decoded image and returns the store.
    pub fn with(mut self, path: impl Into<PathBuf>, image: image::DynamicImage) -> Self {
        self.insert(path, image);
        self
    }
}

impl ImageAssets for MemoryAssets {
    fn exists(&self, path: &Path) -> bool {
        self.images.contains_key(path)
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        match self.images.get(path) {
            Some(MemoryAsset::Decoded(image)) => Ok(image.clone()),
            Some(MemoryAsset::Encoded(bytes)) => {
                DecodedImage::from_bytes(bytes).map_err(|source| Error::AssetDecode {
                    path: path.to_path_buf(),
                    source,
                })
            }
            None => Err(Error::MissingAsset(path.to_path_buf())),
        }
    }
}
