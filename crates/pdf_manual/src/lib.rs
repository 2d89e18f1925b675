//! Styled block composition and pagination for generated PDF manuals.
//!
//! A manual is assembled from pure section builders into a [`Document`]: an
//! ordered list of [`ContentBlock`]s that reference styles by name. The
//! [`DocumentRenderer`] measures those blocks, flows them onto fixed-size
//! pages (honouring keep-with-next and repeating table headers) and hands the
//! positioned pages to a [`RenderBackend`], by default `genpdf`.
//!
//! ```no_run
//! use pdf_manual::{
//!     ContentBuilder, Document, DocumentRenderer, GenpdfBackend, MemoryAssets, PageGeometry,
//!     Section, StyleRegistry,
//! };
//! use pdf_manual::fonts::FontSet;
//! use pdf_manual::style::names;
//!
//! # fn main() -> pdf_manual::Result<()> {
//! let styles = StyleRegistry::manual_defaults()?;
//! let assets = MemoryAssets::new();
//! let builder = ContentBuilder::new(&styles, &assets);
//!
//! let intro = Section::builder("Introduction")
//!     .push(builder.text(names::SECTION_TITLE, "1. Introduction")?)
//!     .push(builder.text(names::BODY, "Hello, manual!")?)
//!     .build();
//! let document = Document::compose("Example", PageGeometry::letter(), [intro]);
//!
//! let fonts = FontSet::discover(None, None).map_err(pdf_manual::Error::FontLoad)?;
//! let renderer = DocumentRenderer::new(&styles, fonts.metrics(), GenpdfBackend::new(fonts));
//! renderer.render_to_file(&document, "example.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
#[cfg(feature = "bookmarks")]
pub mod bookmarks;
pub mod config;
pub mod content;
pub mod error;
pub mod fit;
pub mod fonts;
pub mod layout;
pub mod manual;
pub mod measure;
pub mod model;
pub mod paginate;
pub mod render;
pub mod style;
pub mod toc;

pub use assets::{DecodedImage, FsAssets, ImageAssets, MemoryAssets};
pub use config::ManualConfig;
pub use content::ContentBuilder;
pub use error::{Error, Result};
pub use fit::{fit, FitResult};
pub use layout::DrawOp;
pub use measure::{FixedWidthMetrics, TextMetrics};
pub use model::{
    ContentBlock, Document, HorizontalAlignment, ImageBlock, Margins, OutlineEntry,
    PageGeometry, Section, SectionBuilder, TableBlock,
};
pub use paginate::{Page, Pagination, Placement};
pub use render::{
    DocumentRenderer, GenpdfBackend, PageFooter, RenderBackend, RenderJob, RenderReport,
    RenderedDocument,
};
pub use style::{FontSpec, FontWeight, Rgb, StyleDefinition, StyleOverrides, StyleRegistry};
