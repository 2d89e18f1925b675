//! Turning a [`Document`] into a finished PDF.
//!
//! [`DocumentRenderer`] runs layout and pagination against a
//! [`StyleRegistry`] and hands the positioned pages to a [`RenderBackend`].
//! [`GenpdfBackend`] is the backend used in production; it replays every page
//! through a single `genpdf` element that draws one page per render call.

use std::fs;
use std::path::{Path, PathBuf};

use genpdf::elements::Image;
use genpdf::error::Error as GenpdfError;
use genpdf::render::Area;
use genpdf::style::{Color, Style};
use genpdf::{Context, Element, Mm, Position, RenderResult, Scale, Size};
use image::GenericImageView;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::fonts::{FontHandles, FontSet};
use crate::layout::{self, DrawOp};
use crate::measure::TextMetrics;
use crate::model::{Document, OutlineEntry, PageGeometry};
use crate::paginate::{self, Page, Pagination};
use crate::style::{Rgb, StyleRegistry};

const MM_PER_INCH: f64 = 25.4;

/// Resolution genpdf assumes for embedded images.
const DEFAULT_IMAGE_DPI: f64 = 300.0;

/// Width of a single stroke drawn by genpdf, in millimetres (1 pt).
const STROKE_WIDTH_MM: f64 = 0.3528;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn position(x: f64, y: f64) -> Position {
    Position::new(mm_from_f64(x), mm_from_f64(y))
}

/// Everything a backend needs to serialise a paginated document.
#[derive(Clone, Copy, Debug)]
pub struct RenderJob<'a> {
    /// Document title for the PDF metadata.
    pub title: &'a str,
    /// Page size and margins.
    pub geometry: &'a PageGeometry,
    /// Pages with draw operations in page coordinates.
    pub pages: &'a [Page],
}

/// Serialises paginated pages into artifact bytes.
pub trait RenderBackend {
    /// Renders `job` and returns the encoded artifact.
    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<u8>>;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &B {
    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<u8>> {
        (**self).render(job)
    }
}

/// Backend that writes PDF through `genpdf`.
#[derive(Clone, Debug)]
pub struct GenpdfBackend {
    fonts: FontSet,
}

impl GenpdfBackend {
    /// Creates a backend using the given fonts.
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// The fonts used to draw text.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }
}

impl RenderBackend for GenpdfBackend {
    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<u8>> {
        let (mut document, handles) = self.fonts.install();
        document.set_title(job.title);
        document.set_paper_size(Size::new(
            mm_from_f64(job.geometry.width()),
            mm_from_f64(job.geometry.height()),
        ));
        document.push(PageSequence {
            pages: job.pages.to_vec(),
            next: 0,
            handles,
        });

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(Error::Render)?;
        Ok(bytes)
    }
}

/// Draws one pre-paginated page per call and asks for another page until all are drawn.
struct PageSequence {
    pages: Vec<Page>,
    next: usize,
    handles: FontHandles,
}

impl PageSequence {
    fn draw(&self, context: &Context, area: &Area<'_>, op: &DrawOp) -> std::result::Result<(), GenpdfError> {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                color,
            } => {
                let style = self.handles.style(font, *color);
                area.print_str(&context.font_cache, position(*x, *y), style, text)?;
            }
            DrawOp::Rule {
                from, to, color, ..
            } => {
                area.draw_line(
                    vec![position(from.0, from.1), position(to.0, to.1)],
                    stroke_style(*color),
                );
            }
            DrawOp::Fill {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(area, *x, *y, *width, *height, *color),
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image: decoded,
            } => {
                let pixels = decoded.pixels();
                let pixels = if pixels.color().has_alpha() {
                    image::DynamicImage::ImageRgb8(pixels.to_rgb8())
                } else {
                    pixels.clone()
                };
                let (px_width, px_height) = pixels.dimensions();
                let natural_width = MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI;
                let natural_height = MM_PER_INCH * f64::from(px_height) / DEFAULT_IMAGE_DPI;

                let mut element = Image::from_dynamic_image(pixels)?
                    .with_scale(Scale::new(width / natural_width, height / natural_height));
                let mut image_area = area.clone();
                image_area.add_offset(position(*x, *y));
                element.render(context, image_area, Style::new())?;
            }
        }
        Ok(())
    }
}

impl Element for PageSequence {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        _style: Style,
    ) -> std::result::Result<RenderResult, GenpdfError> {
        if let Some(page) = self.pages.get(self.next) {
            for op in page.ops() {
                self.draw(context, &area, op)?;
            }
            self.next += 1;
        }

        let mut result = RenderResult::default();
        result.size = area.size();
        result.has_more = self.next < self.pages.len();
        Ok(result)
    }
}

fn stroke_style(color: Rgb) -> Style {
    Style::new().with_color(Color::Rgb(color.0, color.1, color.2))
}

/// genpdf only strokes 1 pt lines, so rectangles are filled with
/// overlapping horizontal strokes.
fn fill_rect(area: &Area<'_>, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
    let step = STROKE_WIDTH_MM * 0.8;
    let strokes = (height / step).ceil().max(1.0) as usize;
    for i in 0..strokes {
        let line_y = if strokes == 1 {
            y + height / 2.0
        } else {
            let span = (height - STROKE_WIDTH_MM).max(0.0);
            y + STROKE_WIDTH_MM / 2.0 + span * i as f64 / (strokes - 1) as f64
        };
        area.draw_line(
            vec![position(x, line_y), position(x + width, line_y)],
            stroke_style(color),
        );
    }
}

/// Page number text drawn in the bottom margin of every page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageFooter {
    template: String,
    style: String,
}

impl PageFooter {
    /// Creates a footer from a template containing `{page}` and/or `{pages}`.
    pub fn new(template: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            style: style.into(),
        }
    }

    /// Footer text for `page` out of `pages`.
    pub fn text(&self, page: usize, pages: usize) -> String {
        self.template
            .replace("{page}", &page.to_string())
            .replace("{pages}", &pages.to_string())
    }

    /// Name of the style the footer is set in.
    pub fn style(&self) -> &str {
        &self.style
    }
}

/// Bytes of a rendered document together with its pagination.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    /// Encoded artifact.
    pub bytes: Vec<u8>,
    /// Pages and block placements the artifact was drawn from.
    pub pagination: Pagination,
}

/// Summary of an artifact written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderReport {
    /// Destination path.
    pub path: PathBuf,
    /// Size of the written file.
    pub bytes_written: u64,
    /// Number of pages in the artifact.
    pub page_count: usize,
}

/// Lays out, paginates and renders documents.
pub struct DocumentRenderer<'a, M, B> {
    styles: &'a StyleRegistry,
    metrics: M,
    backend: B,
    footer: Option<PageFooter>,
    bookmarks: bool,
}

impl<'a, M, B> DocumentRenderer<'a, M, B>
where
    M: TextMetrics,
    B: RenderBackend,
{
    /// Creates a renderer that reads styles from `styles`.
    pub fn new(styles: &'a StyleRegistry, metrics: M, backend: B) -> Self {
        Self {
            styles,
            metrics,
            backend,
            footer: None,
            bookmarks: false,
        }
    }

    /// Draws `footer` on every page.
    pub fn with_footer(mut self, footer: impl Into<Option<PageFooter>>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Embeds a PDF outline built from the document's titled sections.
    ///
    /// Has no effect unless the `bookmarks` feature is enabled.
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// The metrics used for measuring text.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Flows `document` onto pages without producing any output.
    pub fn paginate(&self, document: &Document) -> Result<Pagination> {
        let flowables = layout::lay_out(document, self.styles, &self.metrics)?;
        let mut pagination = paginate::paginate(&flowables, document.geometry());
        debug!(
            "'{}': {} blocks on {} pages",
            document.title(),
            document.blocks().len(),
            pagination.page_count()
        );

        if let Some(footer) = &self.footer {
            self.draw_footer(footer, document.geometry(), &mut pagination)?;
        }
        Ok(pagination)
    }

    /// Paginates and renders `document` into memory.
    pub fn render(&self, document: &Document) -> Result<RenderedDocument> {
        let pagination = self.paginate(document)?;
        let job = RenderJob {
            title: document.title(),
            geometry: document.geometry(),
            pages: pagination.pages(),
        };
        let bytes = self.backend.render(&job)?;
        let bytes = self.apply_outline(bytes, document.outline(), &pagination)?;
        Ok(RenderedDocument { bytes, pagination })
    }

    /// Renders `document` and writes it to `path`, replacing an existing file.
    ///
    /// Nothing is written when rendering fails; a partially written file is removed.
    pub fn render_to_file(&self, document: &Document, path: impl AsRef<Path>) -> Result<RenderReport> {
        let path = path.as_ref();
        let rendered = self.render(document)?;

        if let Err(source) = fs::write(path, &rendered.bytes) {
            let _ = fs::remove_file(path);
            return Err(Error::RenderWrite {
                path: path.to_path_buf(),
                source,
            });
        }

        let report = RenderReport {
            path: path.to_path_buf(),
            bytes_written: rendered.bytes.len() as u64,
            page_count: rendered.pagination.page_count(),
        };
        info!(
            "wrote {} ({} pages, {} bytes)",
            report.path.display(),
            report.page_count,
            report.bytes_written
        );
        Ok(report)
    }

    fn draw_footer(
        &self,
        footer: &PageFooter,
        geometry: &PageGeometry,
        pagination: &mut Pagination,
    ) -> Result<()> {
        let style = self.styles.resolve(footer.style())?;
        let margins = geometry.margins();
        let available = geometry.content_width();
        let y = geometry.height() - margins.bottom / 2.0 - style.leading_mm() / 2.0;
        let total = pagination.page_count();

        for page in pagination.pages_mut() {
            let text = footer.text(page.number(), total);
            let width = self.metrics.text_width(style.font(), &text);
            let offset = layout::aligned_offset(style.alignment(), available, width);
            page.push_op(DrawOp::Text {
                x: margins.left + offset,
                y,
                text,
                font: style.font().clone(),
                color: style.color(),
            });
        }
        Ok(())
    }

    #[cfg(feature = "bookmarks")]
    fn apply_outline(
        &self,
        bytes: Vec<u8>,
        outline: &[OutlineEntry],
        pagination: &Pagination,
    ) -> Result<Vec<u8>> {
        if !self.bookmarks || outline.is_empty() {
            return Ok(bytes);
        }
        let pages = outline_pages(outline, pagination);
        Ok(crate::bookmarks::apply_outline(&bytes, outline, &pages)?)
    }

    #[cfg(not(feature = "bookmarks"))]
    fn apply_outline(
        &self,
        bytes: Vec<u8>,
        outline: &[OutlineEntry],
        _pagination: &Pagination,
    ) -> Result<Vec<u8>> {
        if self.bookmarks && !outline.is_empty() {
            debug!("bookmarks requested but the `bookmarks` feature is disabled");
        }
        Ok(bytes)
    }
}

/// First page of every outline entry: the page of the first block at or
/// after the entry's first block that draws anything.
pub fn outline_pages(outline: &[OutlineEntry], pagination: &Pagination) -> Vec<Option<usize>> {
    outline
        .iter()
        .map(|entry| {
            pagination
                .placements()
                .iter()
                .find(|placement| placement.block >= entry.first_block)
                .map(|placement| placement.page)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::measure::FixedWidthMetrics;
    use crate::model::{ContentBlock, Margins, Section};
    use crate::style::names;

    /// Records the jobs it receives and returns a fixed payload.
    #[derive(Default)]
    struct RecordingBackend {
        pages: RefCell<Vec<usize>>,
    }

    impl RenderBackend for RecordingBackend {
        fn render(&self, job: &RenderJob<'_>) -> Result<Vec<u8>> {
            self.pages.borrow_mut().push(job.pages.len());
            Ok(b"%PDF-stub".to_vec())
        }
    }

    fn sample_document() -> Document {
        let sections = vec![
            Section::builder("One")
                .break_after(true)
                .push(ContentBlock::text(names::SECTION_TITLE, "1. One"))
                .push(ContentBlock::text(names::BODY, "first"))
                .build(),
            Section::builder("Two")
                .push(ContentBlock::text(names::SECTION_TITLE, "2. Two"))
                .push(ContentBlock::text(names::BODY, "second"))
                .build(),
        ];
        Document::compose("Sample", PageGeometry::letter(), sections)
    }

    #[test]
    fn footer_numbers_every_page() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default())
            .with_footer(PageFooter::new("Page {page} of {pages}", names::FOOTER));
        let pagination = renderer.paginate(&sample_document()).unwrap();

        assert_eq!(pagination.page_count(), 2);
        for page in pagination.pages() {
            let expected = format!("Page {} of 2", page.number());
            let footer = page.ops().last().unwrap();
            assert!(matches!(footer, DrawOp::Text { text, y, .. }
                if *text == expected && *y > PageGeometry::letter().height() - 19.05));
        }
    }

    #[test]
    fn footer_with_unknown_style_fails() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default())
            .with_footer(PageFooter::new("{page}", "Missing"));
        let err = renderer.paginate(&sample_document()).unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(_)));
    }

    #[test]
    fn outline_pages_follow_section_starts() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default());
        let document = sample_document();
        let pagination = renderer.paginate(&document).unwrap();
        assert_eq!(outline_pages(document.outline(), &pagination), [Some(1), Some(2)]);
    }

    #[test]
    fn render_passes_all_pages_to_backend() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let backend = RecordingBackend::default();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), &backend);
        let rendered = renderer.render(&sample_document()).unwrap();
        assert_eq!(rendered.bytes, b"%PDF-stub");
        assert_eq!(*backend.pages.borrow(), [2]);
    }

    #[test]
    fn render_to_file_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        fs::write(&path, b"stale contents that are longer").unwrap();

        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default());
        let report = renderer.render_to_file(&sample_document(), &path).unwrap();

        assert_eq!(report.bytes_written, 9);
        assert_eq!(report.page_count, 2);
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-stub");
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("manual.pdf");

        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default());
        let err = renderer.render_to_file(&sample_document(), &path).unwrap_err();
        assert!(matches!(err, Error::RenderWrite { path: failed, .. } if failed == path));
        assert!(!path.exists());
    }

    #[test]
    fn margins_bound_the_flow_area() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), RecordingBackend::default());
        let geometry = PageGeometry::a4().with_margins(Margins::uniform(30.0));
        let document = Document::new("A4", geometry, vec![ContentBlock::text(names::BODY, "x")]);
        let pagination = renderer.paginate(&document).unwrap();
        assert!(matches!(pagination.pages()[0].ops()[0], DrawOp::Text { x, y, .. } if x >= 30.0 && y >= 30.0));
    }
}
