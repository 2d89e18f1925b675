//! Error taxonomy shared by every stage of manual generation.

use std::io;
use std::path::PathBuf;

/// Errors produced while building, laying out or writing a manual.
///
/// Asset problems ([`Error::InvalidImage`], [`Error::MissingAsset`] and
/// [`Error::AssetDecode`]) are recovered by the content builder, which swaps
/// the image for a placeholder paragraph. Everything else aborts generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A block referenced a style name that is not registered.
    #[error("unknown style '{0}'")]
    UnknownStyle(String),

    /// Table rows (or the column widths) disagree on the number of cells.
    #[error("malformed table: row {row} has {found} cells, expected {expected}")]
    MalformedTable {
        /// Index of the offending row; `usize::MAX` denotes the column widths.
        row: usize,
        /// Cell count of the first row.
        expected: usize,
        /// Cell count that was found instead.
        found: usize,
    },

    /// Image dimensions cannot be fitted into a box.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImage {
        /// Source (or box) width.
        width: f64,
        /// Source (or box) height.
        height: f64,
    },

    /// The image asset does not exist.
    #[error("image asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// The image asset exists but could not be decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    AssetDecode {
        /// Path of the asset.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },

    /// The default or a configured font family could not be loaded.
    #[error("failed to load fonts")]
    FontLoad(#[source] genpdf::error::Error),

    /// The rendering backend failed to serialize the document.
    #[error("failed to render document")]
    Render(#[source] genpdf::error::Error),

    /// The artifact could not be written to disk.
    #[error("failed to write {}", path.display())]
    RenderWrite {
        /// Destination of the artifact.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration could not be loaded or deserialized.
    #[error("invalid configuration")]
    Config(#[from] config::ConfigError),

    /// The PDF outline could not be embedded.
    #[cfg(feature = "bookmarks")]
    #[error("failed to embed bookmarks")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}

impl Error {
    /// Returns whether the content builder may replace the failing block with a placeholder.
    pub fn is_recoverable_asset_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidImage { .. } | Error::MissingAsset(_) | Error::AssetDecode { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
