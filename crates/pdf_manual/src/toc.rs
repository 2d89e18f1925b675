//! Printed table of contents.
//!
//! Page numbers are only known after pagination, and inserting the contents
//! page can itself shift later sections. [`resolve_contents`] therefore builds
//! the document, paginates it, fills in the numbers it found and repeats
//! until the numbers stop changing.

use log::{debug, warn};

use crate::error::Result;
use crate::measure::TextMetrics;
use crate::model::{ContentBlock, Document, PageGeometry, Section};
use crate::paginate::Pagination;
use crate::render::{outline_pages, DocumentRenderer, RenderBackend};
use crate::style::{names, StyleRegistry};

/// Heading printed above the entries.
pub const CONTENTS_TITLE: &str = "Table of Contents";

/// Characters a leader line is padded to.
const LEADER_WIDTH: usize = 50;

/// Minimum number of leader dots between title and page number.
const MIN_LEADER_DOTS: usize = 3;

/// Gap between the heading and the first entry (0.3 in).
const HEADING_GAP_MM: f64 = 7.62;

/// Passes after which pagination is accepted even if numbers still move.
const MAX_PASSES: usize = 3;

/// `"<title> ....... <page>"`, padded with dots to a fixed character count.
///
/// An unknown page leaves the number blank.
pub fn leader_line(title: &str, page: Option<usize>) -> String {
    let page = page.map(|page| page.to_string()).unwrap_or_default();
    let used = title.chars().count() + page.chars().count();
    let dots = LEADER_WIDTH.saturating_sub(used).max(MIN_LEADER_DOTS);
    format!("{} {} {}", title, ".".repeat(dots), page).trim_end().to_string()
}

/// Builds the contents page for `entries` of `(title, first page)`.
///
/// The section is untitled so it does not list itself, and ends with a page break.
pub fn toc_section(styles: &StyleRegistry, entries: &[(String, Option<usize>)]) -> Result<Section> {
    styles.resolve(names::SECTION_TITLE)?;
    styles.resolve(names::TOC_ENTRY)?;

    Ok(Section::untitled_builder()
        .identifier(Some("contents".to_string()))
        .break_after(true)
        .push(ContentBlock::text(names::SECTION_TITLE, CONTENTS_TITLE))
        .push(ContentBlock::spacer(HEADING_GAP_MM))
        .extend(
            entries
                .iter()
                .map(|(title, page)| ContentBlock::text(names::TOC_ENTRY, leader_line(title, *page))),
        )
        .build())
}

/// Composes `front`, a contents page and `body`, with page numbers that
/// match the final pagination.
///
/// Titled, non-empty `body` sections are listed. Returns the document with its
/// pagination.
pub fn resolve_contents<M, B>(
    renderer: &DocumentRenderer<'_, M, B>,
    styles: &StyleRegistry,
    title: &str,
    geometry: PageGeometry,
    front: &[Section],
    body: &[Section],
) -> Result<(Document, Pagination)>
where
    M: TextMetrics,
    B: RenderBackend,
{
    let titles: Vec<String> = body
        .iter()
        .filter(|section| !section.blocks().is_empty())
        .filter_map(|section| section.title().map(str::to_string))
        .collect();
    let mut pages: Vec<Option<usize>> = vec![None; titles.len()];

    let mut pass = 1;
    loop {
        let entries: Vec<(String, Option<usize>)> =
            titles.iter().cloned().zip(pages.iter().copied()).collect();
        let contents = toc_section(styles, &entries)?;

        let sections = front
            .iter()
            .cloned()
            .chain(std::iter::once(contents))
            .chain(body.iter().cloned());
        let document = Document::compose(title, geometry, sections);
        let pagination = renderer.paginate(&document)?;

        let outline = document.outline();
        let listed = &outline[outline.len().saturating_sub(titles.len())..];
        let found = outline_pages(listed, &pagination);

        if found == pages {
            debug!("contents stable after {} pass(es)", pass);
            return Ok((document, pagination));
        }
        if pass == MAX_PASSES {
            warn!(
                "contents page numbers still changing after {} passes; using the last layout",
                MAX_PASSES
            );
            return Ok((document, pagination));
        }
        pages = found;
        pass += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedWidthMetrics;
    use crate::render::RenderJob;

    struct NoOutput;

    impl RenderBackend for NoOutput {
        fn render(&self, _job: &RenderJob<'_>) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn leader_line_pads_to_fixed_width() {
        let line = leader_line("1. Executive Summary", Some(3));
        assert_eq!(line.chars().count(), LEADER_WIDTH + 2);
        assert!(line.starts_with("1. Executive Summary ..."));
        assert!(line.ends_with(" 3"));
    }

    #[test]
    fn leader_line_keeps_minimum_dots() {
        let title = "A very long section title that leaves no room for any leader dots";
        assert!(leader_line(title, Some(12)).contains(" ... 12"));
    }

    #[test]
    fn unknown_page_leaves_number_blank() {
        assert!(leader_line("Intro", None).ends_with('.'));
    }

    #[test]
    fn contents_numbers_match_section_pages() {
        let styles = StyleRegistry::manual_defaults().unwrap();
        let renderer = DocumentRenderer::new(&styles, FixedWidthMetrics::default(), NoOutput);

        let cover = Section::untitled_builder()
            .break_after(true)
            .push(ContentBlock::text(names::COVER_TITLE, "Manual"))
            .build();
        let body: Vec<Section> = (1..=3)
            .map(|n| {
                Section::builder(format!("{n}. Chapter"))
                    .break_after(true)
                    .push(ContentBlock::text(names::SECTION_TITLE, format!("{n}. Chapter")))
                    .push(ContentBlock::text(names::BODY, "text"))
                    .build()
            })
            .collect();

        let (document, pagination) = resolve_contents(
            &renderer,
            &styles,
            "Manual",
            PageGeometry::letter(),
            &[cover],
            &body,
        )
        .unwrap();

        assert_eq!(pagination.page_count(), 5);
        let entries: Vec<String> = document
            .blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { style, content } if style == names::TOC_ENTRY => {
                    Some(content.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(entries.len(), 3);
        for (entry, page) in entries.iter().zip(3..) {
            assert!(entry.ends_with(&format!(" {page}")), "{entry}");
        }
    }
}
