//! Data structures describing the logical content of a manual.
//!
//! A [`Document`] is an ordered list of [`ContentBlock`]s plus the page
//! geometry it will be flowed onto. Blocks only reference styles by name and
//! never carry rendering-crate types, so section builders stay independent of
//! the backend that eventually draws them.

use std::path::{Path, PathBuf};

use crate::assets::DecodedImage;
use crate::error::{Error, Result};
use crate::fit::FitResult;

/// Horizontal placement of text lines and images within the content width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs. The last line of a paragraph is left aligned.
    Justified,
}

/// Rectangular table content with a header row.
///
/// Construction validates that every row has the same number of cells, so a
/// `TableBlock` value is always well formed.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
    column_widths: Vec<f64>,
    header_style: String,
    body_style: String,
}

impl TableBlock {
    /// Builds a table from rows of cell text. The first row is the header.
    ///
    /// `column_widths` are millimetres; pass an empty vector to split the
    /// content width evenly.
    pub fn new<R, C>(
        rows: R,
        column_widths: Vec<f64>,
        header_style: impl Into<String>,
        body_style: impl Into<String>,
    ) -> Result<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(Error::MalformedTable {
                row,
                expected,
                found: cells.len(),
            });
        }

        if !column_widths.is_empty() && column_widths.len() != expected {
            return Err(Error::MalformedTable {
                row: usize::MAX,
                expected,
                found: column_widths.len(),
            });
        }

        Ok(Self {
            rows,
            column_widths,
            header_style: header_style.into(),
            body_style: body_style.into(),
        })
    }

    /// All rows, header first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The header row, if the table has any rows.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Requested column widths in millimetres; empty means "split evenly".
    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    /// Style applied to the header row.
    pub fn header_style(&self) -> &str {
        &self.header_style
    }

    /// Style applied to body rows.
    pub fn body_style(&self) -> &str {
        &self.body_style
    }
}

/// An image already fitted into its bounding box, with an optional caption.
///
/// The caption is laid out directly below the image and the two are kept on
/// the same page.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    source: PathBuf,
    caption: Option<String>,
    caption_style: String,
    alignment: HorizontalAlignment,
    max_width: f64,
    max_height: f64,
    fit: FitResult,
    image: DecodedImage,
}

impl ImageBlock {
    /// Creates an image block from a decoded image and its fitted size.
    pub fn new(
        source: impl Into<PathBuf>,
        image: DecodedImage,
        fit: FitResult,
        max_width: f64,
        max_height: f64,
    ) -> Self {
        Self {
            source: source.into(),
            caption: None,
            caption_style: String::new(),
            alignment: HorizontalAlignment::Center,
            max_width,
            max_height,
            fit,
            image,
        }
    }

    /// Path the image was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Caption text, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Style used for the caption.
    pub fn caption_style(&self) -> &str {
        &self.caption_style
    }

    /// Horizontal placement of the image.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Maximum box width in millimetres.
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Maximum box height in millimetres.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Fitted size in millimetres.
    pub fn fit(&self) -> FitResult {
        self.fit
    }

    /// Decoded pixels.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// Sets the caption and its style and returns the updated block.
    pub fn with_caption(mut self, caption: impl Into<String>, style: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self.caption_style = style.into();
        self
    }

    /// Sets the alignment and returns the updated block.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// One unit of document content.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentBlock {
    /// Styled paragraph.
    Text {
        /// Name of the style in the registry.
        style: String,
        /// Paragraph text; `\n` forces a line break.
        content: String,
    },
    /// Table with a header row.
    Table(TableBlock),
    /// Fitted image with optional caption.
    Image(ImageBlock),
    /// Vertical gap in millimetres.
    Spacer {
        /// Height of the gap.
        height: f64,
    },
    /// Forces the next block onto a fresh page.
    PageBreak,
}

impl ContentBlock {
    /// Convenience helper for building a text block.
    pub fn text(style: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Text {
            style: style.into(),
            content: content.into(),
        }
    }

    /// Convenience helper for building a spacer.
    pub fn spacer(height: f64) -> Self {
        Self::Spacer { height }
    }

    /// Convenience helper that yields an explicit page break block.
    pub fn page_break() -> Self {
        Self::PageBreak
    }

    /// Returns whether this is a [`ContentBlock::PageBreak`].
    pub fn is_page_break(&self) -> bool {
        matches!(self, Self::PageBreak)
    }
}

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// Same margin on all four sides.
    pub fn uniform(margin: f64) -> Self {
        Self::trbl(margin, margin, margin, margin)
    }

    /// Margins in CSS order: top, right, bottom, left.
    pub fn trbl(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Fixed page size and margins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    width: f64,
    height: f64,
    margins: Margins,
}

impl PageGeometry {
    /// Creates a page of `width × height` millimetres.
    pub fn new(width: f64, height: f64, margins: Margins) -> Self {
        Self {
            width,
            height,
            margins,
        }
    }

    /// US Letter with three-quarter-inch margins.
    pub fn letter() -> Self {
        Self::new(215.9, 279.4, Margins::uniform(19.05))
    }

    /// ISO A4 with 20 mm margins.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0, Margins::uniform(20.0))
    }

    /// Replaces the margins and returns the updated geometry.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Page width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Page height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Page margins.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Width available to content between the left and right margins.
    pub fn content_width(&self) -> f64 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    /// Height available to content between the top and bottom margins.
    pub fn content_height(&self) -> f64 {
        (self.height - self.margins.top - self.margins.bottom).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Logical section of a manual: an optional title and its blocks.
///
/// Untitled sections (such as a cover page) are excluded from the outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    identifier: Option<String>,
    title: Option<String>,
    blocks: Vec<ContentBlock>,
}

impl Section {
    /// Creates an empty titled section.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            title: Some(title.into()),
            blocks: Vec::new(),
        }
    }

    /// Creates an empty section that does not appear in the outline.
    pub fn untitled() -> Self {
        Self {
            identifier: None,
            title: None,
            blocks: Vec::new(),
        }
    }

    /// Returns the section identifier used for bookmarks.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Returns the title of the section.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the blocks contained in the section.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Sets the identifier and returns the updated section.
    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = ContentBlock>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Creates a builder for a titled section.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(Some(title.into()))
    }

    /// Creates a builder for a section that stays out of the outline.
    pub fn untitled_builder() -> SectionBuilder {
        SectionBuilder::new(None)
    }
}

/// Builder for [`Section`] values.
///
/// Callers decide per section whether it ends with a forced page break via
/// [`SectionBuilder::break_after`]; the builder never emits two consecutive
/// trailing breaks.
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    identifier: Option<String>,
    title: Option<String>,
    blocks: Vec<ContentBlock>,
    break_after: bool,
}

impl SectionBuilder {
    fn new(title: Option<String>) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    /// Marks the section to end with a page break.
    pub fn break_after(mut self, break_after: bool) -> Self {
        self.break_after = break_after;
        self
    }

    /// Sets the identifier for the section.
    pub fn identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Pushes an additional block into the section.
    pub fn push(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the builder with multiple blocks.
    pub fn extend<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = ContentBlock>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Builds the final section, appending a trailing page break when requested.
    pub fn build(mut self) -> Section {
        if self.break_after && !self.blocks.last().is_some_and(ContentBlock::is_page_break) {
            self.blocks.push(ContentBlock::PageBreak);
        }

        Section {
            identifier: self.identifier,
            title: self.title,
            blocks: self.blocks,
        }
    }
}

/// Outline entry pointing at the first block of a titled section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    pub identifier: Option<String>,
    pub first_block: usize,
}

/// The complete block sequence of one output artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    title: String,
    geometry: PageGeometry,
    blocks: Vec<ContentBlock>,
    outline: Vec<OutlineEntry>,
}

impl Document {
    /// Creates a document from a flat block sequence.
    pub fn new(title: impl Into<String>, geometry: PageGeometry, blocks: Vec<ContentBlock>) -> Self {
        Self {
            title: title.into(),
            geometry,
            blocks,
            outline: Vec::new(),
        }
    }

    /// Concatenates sections in the given order and records an outline entry
    /// for every titled section that contributes at least one block.
    pub fn compose<I>(title: impl Into<String>, geometry: PageGeometry, sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        let mut blocks = Vec::new();
        let mut outline = Vec::new();

        for section in sections {
            if let Some(title) = section.title {
                if !section.blocks.is_empty() {
                    outline.push(OutlineEntry {
                        title,
                        identifier: section.identifier,
                        first_block: blocks.len(),
                    });
                }
            }
            blocks.extend(section.blocks);
        }

        Self {
            title: title.into(),
            geometry,
            blocks,
            outline,
        }
    }

    /// Document title, used as PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page geometry.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Titled sections and the index of their first block.
    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_trailing_page_break() {
        let section = Section::builder("Intro")
            .break_after(true)
            .push(ContentBlock::text("Body", "hello"))
            .build();

        assert!(matches!(section.blocks().last(), Some(ContentBlock::PageBreak)));
        assert_eq!(section.blocks().len(), 2);
    }

    #[test]
    fn builder_does_not_duplicate_page_break() {
        let section = Section::builder("Intro")
            .break_after(true)
            .push(ContentBlock::PageBreak)
            .build();

        assert_eq!(section.blocks(), &[ContentBlock::PageBreak]);
    }

    #[test]
    fn builder_without_break_flows_on() {
        let section = Section::builder("Intro")
            .push(ContentBlock::text("Body", "hello"))
            .build();
        assert!(!section.blocks().iter().any(ContentBlock::is_page_break));
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let err = TableBlock::new(
            vec![vec!["a", "b"], vec!["c"]],
            Vec::new(),
            "TableHeader",
            "TableBody",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedTable {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn table_rejects_mismatched_widths() {
        let err = TableBlock::new(
            vec![vec!["a", "b"], vec!["c", "d"]],
            vec![40.0, 40.0, 40.0],
            "TableHeader",
            "TableBody",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedTable { found: 3, .. }));
    }

    #[test]
    fn table_splits_header_and_body() {
        let table = TableBlock::new(
            vec![vec!["Status", "Meaning"], vec!["Valid", "ok"], vec!["Expired", "blocked"]],
            vec![30.0, 100.0],
            "TableHeader",
            "TableBody",
        )
        .unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header().unwrap(), ["Status", "Meaning"]);
        assert_eq!(table.body().len(), 2);
    }

    #[test]
    fn compose_preserves_order_and_records_outline() {
        let cover = Section::untitled()
            .with_block(ContentBlock::text("CoverTitle", "Manual"))
            .with_block(ContentBlock::PageBreak);
        let intro = Section::new("1. Getting Started")
            .with_identifier(Some("start".to_string()))
            .with_block(ContentBlock::text("Body", "a"));
        let empty = Section::new("Empty");
        let next = Section::new("2. Dashboard").with_block(ContentBlock::text("Body", "b"));

        let document = Document::compose("Manual", PageGeometry::letter(), [cover, intro, empty, next]);

        assert_eq!(document.blocks().len(), 4);
        assert_eq!(
            document.outline(),
            &[
                OutlineEntry {
                    title: "1. Getting Started".to_string(),
                    identifier: Some("start".to_string()),
                    first_block: 2,
                },
                OutlineEntry {
                    title: "2. Dashboard".to_string(),
                    identifier: None,
                    first_block: 3,
                },
            ]
        );
    }

    #[test]
    fn letter_geometry_content_area() {
        let geometry = PageGeometry::letter();
        assert!((geometry.content_width() - 177.8).abs() < 1e-9);
        assert!((geometry.content_height() - 241.3).abs() < 1e-9);
    }
}
