use image::{DynamicImage, RgbImage};
use pdf_manual::config::{self, ManualConfig};
use pdf_manual::render::outline_pages;
use pdf_manual::style::names;
use pdf_manual::{
    manual, ContentBlock, Document, DocumentRenderer, DrawOp, FixedWidthMetrics, FontSpec,
    Margins, MemoryAssets, PageFooter, PageGeometry, Pagination, RenderBackend, RenderJob,
    Section, StyleDefinition, StyleRegistry,
};

struct NoOutput;

impl RenderBackend for NoOutput {
    fn render(&self, _job: &RenderJob<'_>) -> pdf_manual::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

fn defaults() -> ManualConfig {
    config::load_defaults().expect("default configuration")
}

fn compose(styles: &StyleRegistry, assets: &MemoryAssets) -> (Document, Pagination) {
    let renderer = DocumentRenderer::new(styles, FixedWidthMetrics::default(), NoOutput);
    manual::compose(&renderer, styles, assets, &defaults()).expect("manual to compose")
}

fn texts_in<'a>(document: &'a Document, style_name: &'a str) -> impl Iterator<Item = &'a str> {
    document.blocks().iter().filter_map(move |block| match block {
        ContentBlock::Text { style, content } if style == style_name => Some(content.as_str()),
        _ => None,
    })
}

#[test]
fn missing_screenshots_become_placeholders() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let (document, _) = compose(&styles, &MemoryAssets::new());

    let placeholders: Vec<&str> = texts_in(&document, names::BODY)
        .filter(|text| text.starts_with("[Image not found: "))
        .collect();
    assert_eq!(placeholders.len(), 7);
    assert!(placeholders.contains(&"[Image not found: 01-dashboard.png]"));
    assert!(!document
        .blocks()
        .iter()
        .any(|block| matches!(block, ContentBlock::Image(_))));
}

#[test]
fn available_screenshot_is_embedded_with_caption() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let assets = MemoryAssets::new().with(
        "01-dashboard.png",
        DynamicImage::ImageRgb8(RgbImage::new(1600, 900)),
    );
    let (document, pagination) = compose(&styles, &assets);

    let (index, image) = document
        .blocks()
        .iter()
        .enumerate()
        .find_map(|(index, block)| match block {
            ContentBlock::Image(image) => Some((index, image)),
            _ => None,
        })
        .expect("dashboard screenshot embedded");
    assert_eq!(image.image().width(), 1600);
    assert_eq!(
        image.caption(),
        Some("Figure 2.1: Main dashboard with live metrics and activity feed")
    );
    assert_eq!(pagination.pages_of_block(index).len(), 1);
}

#[test]
fn contents_lists_every_chapter_with_its_page() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let (document, pagination) = compose(&styles, &MemoryAssets::new());

    let outline = document.outline();
    assert_eq!(outline.len(), 10);
    assert_eq!(outline[0].title, "1. Executive Summary");

    let pages = outline_pages(outline, &pagination);
    let entries: Vec<&str> = texts_in(&document, names::TOC_ENTRY).collect();
    assert_eq!(entries.len(), outline.len());

    for ((entry, chapter), page) in entries.iter().zip(outline).zip(&pages) {
        let page = page.expect("every chapter is placed");
        assert!(entry.starts_with(&chapter.title), "{entry}");
        assert!(entry.ends_with(&format!(" {page}")), "{entry} should end with {page}");
    }
}

#[test]
fn chapters_start_on_fresh_pages() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let (document, pagination) = compose(&styles, &MemoryAssets::new());

    let pages = outline_pages(document.outline(), &pagination);
    assert_eq!(pages.first().copied().flatten(), Some(3), "cover and contents come first");

    for (entry, page) in document.outline().iter().zip(&pages) {
        let page = page.expect("chapter placed");
        let first_block = pagination.pages()[page - 1].blocks().first().copied();
        assert_eq!(first_block, Some(entry.first_block), "{}", entry.title);
    }
}

#[test]
fn composition_is_deterministic() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let (first_document, first_pagination) = compose(&styles, &MemoryAssets::new());
    let (second_document, second_pagination) = compose(&styles, &MemoryAssets::new());

    assert_eq!(first_document, second_document);
    assert_eq!(first_pagination, second_pagination);
}

#[test]
fn every_manual_page_has_content_and_footer() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), NoOutput)
        .with_footer(PageFooter::new("Page {page} of {pages}", names::FOOTER));
    let (_, pagination) =
        manual::compose(&renderer, &styles, &MemoryAssets::new(), &defaults()).unwrap();

    let total = pagination.page_count();
    for page in pagination.pages() {
        assert!(page.ops().len() > 1, "page {} is blank", page.number());
        match page.ops().last() {
            Some(DrawOp::Text { text, .. }) => {
                assert_eq!(text, &format!("Page {} of {}", page.number(), total));
            }
            other => panic!("page {} ends with {other:?}", page.number()),
        }
    }
}

/// Registry whose single-line blocks are exactly `height` millimetres tall.
fn fixed_height_style(name: &str, height: f64, keep_with_next: bool) -> StyleDefinition {
    StyleDefinition::new(name, FontSpec::new(10))
        .with_leading(height * 72.0 / 25.4)
        .with_keep_with_next(keep_with_next)
}

fn paginate(geometry: PageGeometry, styles: &StyleRegistry, blocks: Vec<ContentBlock>) -> Pagination {
    let document = Document::compose(
        "Fixed",
        geometry,
        [Section::untitled().with_blocks(blocks)],
    );
    DocumentRenderer::new(styles, FixedWidthMetrics::default(), NoOutput)
        .paginate(&document)
        .unwrap()
}

#[test]
fn blocks_flow_onto_the_next_page_when_full() {
    let styles = StyleRegistry::new().with(fixed_height_style("Block", 40.0, false));
    let pagination = paginate(
        PageGeometry::new(100.0, 100.0, Margins::uniform(0.0)),
        &styles,
        vec![
            ContentBlock::text("Block", "a"),
            ContentBlock::text("Block", "b"),
            ContentBlock::text("Block", "c"),
        ],
    );

    assert_eq!(pagination.page_count(), 2);
    let pages: Vec<_> = (0..3).map(|block| pagination.first_page_of(block)).collect();
    assert_eq!(pages, vec![Some(1), Some(1), Some(2)]);
}

#[test]
fn heading_moves_with_the_block_it_introduces() {
    let styles = StyleRegistry::new()
        .with(fixed_height_style("Filler", 100.0, false))
        .with(fixed_height_style("Heading", 30.0, true))
        .with(fixed_height_style("Body", 90.0, false));
    let pagination = paginate(
        PageGeometry::new(100.0, 200.0, Margins::uniform(0.0)),
        &styles,
        vec![
            ContentBlock::text("Filler", "filler"),
            ContentBlock::text("Heading", "heading"),
            ContentBlock::text("Body", "body"),
        ],
    );

    assert_eq!(pagination.first_page_of(0), Some(1));
    assert_eq!(pagination.first_page_of(1), Some(2));
    assert_eq!(pagination.first_page_of(2), Some(2));
}

#[test]
fn paragraph_stays_when_only_its_trailing_space_overflows() {
    let styles = StyleRegistry::new()
        .with(fixed_height_style("Block", 40.0, false))
        .with(fixed_height_style("Spaced", 52.0, false).with_spacing(12.0, 12.0));
    let pagination = paginate(
        PageGeometry::new(100.0, 100.0, Margins::uniform(0.0)),
        &styles,
        vec![
            ContentBlock::text("Block", "a"),
            ContentBlock::text("Spaced", "b"),
            ContentBlock::text("Spaced", "c"),
        ],
    );

    assert_eq!(pagination.first_page_of(1), Some(1));
    let first_on_page_two = pagination.placements()[2];
    assert_eq!(first_on_page_two.page, 2);
    assert_eq!(first_on_page_two.top, 0.0, "no leading space at the top of a page");
}

#[test]
fn page_break_starts_a_new_page() {
    let styles = StyleRegistry::new().with(fixed_height_style("Block", 10.0, false));
    let pagination = paginate(
        PageGeometry::new(100.0, 100.0, Margins::uniform(0.0)),
        &styles,
        vec![
            ContentBlock::text("Block", "before"),
            ContentBlock::page_break(),
            ContentBlock::text("Block", "after"),
        ],
    );

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(pagination.first_page_of(0), Some(1));
    assert_eq!(pagination.first_page_of(2), Some(2));
}

#[test]
fn long_tables_repeat_their_header() {
    let styles = StyleRegistry::manual_defaults().unwrap();
    let rows = std::iter::once(["Name".to_string(), "Value".to_string()])
        .chain((1..=40).map(|n| [format!("row {n}"), n.to_string()]));
    let table = pdf_manual::TableBlock::new(rows, Vec::new(), names::TABLE_HEADER, names::TABLE_BODY)
        .unwrap();
    let pagination = paginate(PageGeometry::letter(), &styles, vec![ContentBlock::Table(table)]);

    assert!(pagination.page_count() >= 2);
    assert_eq!(pagination.pages_of_block(0).len(), pagination.page_count());
    for page in pagination.pages() {
        let first_text = page.ops().iter().find_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        });
        assert_eq!(first_text, Some("Name"), "page {}", page.number());
    }
}
