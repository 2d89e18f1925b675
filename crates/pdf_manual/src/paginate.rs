//! Flowing measured blocks onto fixed-size pages.
//!
//! The paginator walks the flowables in order with a vertical cursor. A block
//! that does not fit in the space left on the current page moves to a new one,
//! except when it is taller than a whole page: text and tables are then split,
//! and anything else is placed at the top of a fresh page and clipped. Pages
//! are only created once something is drawn on them, so page breaks never
//! leave blank pages behind.

use log::{debug, warn};

use crate::layout::{lines_height, DrawOp, FlowKind, Flowable, Strip};
use crate::model::PageGeometry;

/// Slack for floating point comparisons of heights, in millimetres.
const EPSILON: f64 = 1e-6;

/// A single output page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    number: usize,
    ops: Vec<DrawOp>,
    blocks: Vec<usize>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Draw operations in page coordinates.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Indices of the blocks with content on this page, in order.
    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }

    pub(crate) fn push_op(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

/// Where (part of) a block landed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Index of the block in the document.
    pub block: usize,
    /// 1-based page number.
    pub page: usize,
    /// Distance from the top of the content area, in millimetres.
    pub top: f64,
    /// Height occupied on that page, in millimetres.
    pub height: f64,
}

/// The result of flowing a document onto pages.
#[derive(Clone, Debug, PartialEq)]
pub struct Pagination {
    pages: Vec<Page>,
    placements: Vec<Placement>,
}

impl Pagination {
    /// All pages in order. Never empty.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every placement, in flow order. Split blocks have one entry per page.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Page numbers a block occupies, in order.
    pub fn pages_of_block(&self, block: usize) -> Vec<usize> {
        self.placements
            .iter()
            .filter(|placement| placement.block == block)
            .map(|placement| placement.page)
            .collect()
    }

    /// First page a block appears on, if it draws anything.
    pub fn first_page_of(&self, block: usize) -> Option<usize> {
        self.placements
            .iter()
            .find(|placement| placement.block == block)
            .map(|placement| placement.page)
    }
}

/// Flows `flowables` onto pages of the given geometry.
pub(crate) fn paginate(flowables: &[Flowable], geometry: &PageGeometry) -> Pagination {
    let mut flow = Flow::new(geometry);

    for (index, flowable) in flowables.iter().enumerate() {
        flow.keep_with_followers(flowables, index);
        flow.place(flowable);
    }

    flow.finish()
}

struct Flow {
    left: f64,
    top: f64,
    full: f64,
    cursor: f64,
    current: Option<Page>,
    pages: Vec<Page>,
    placements: Vec<Placement>,
}

impl Flow {
    fn new(geometry: &PageGeometry) -> Self {
        let margins = geometry.margins();
        Self {
            left: margins.left,
            top: margins.top,
            full: geometry.content_height(),
            cursor: 0.0,
            current: None,
            pages: Vec::new(),
            placements: Vec::new(),
        }
    }

    fn remaining(&self) -> f64 {
        self.full - self.cursor
    }

    fn fits(&self, height: f64) -> bool {
        height <= self.remaining() + EPSILON
    }

    /// Closes the current page. Space consumed on a page with no content is discarded.
    fn new_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
        self.cursor = 0.0;
    }

    /// Makes room for `height`, moving to a new page when the current one is too full.
    fn ensure_room(&mut self, height: f64) {
        if !self.fits(height) {
            self.new_page();
        }
    }

    fn put(&mut self, block: usize, strip: &Strip) {
        let number = self.pages.len() + 1;
        let page = self.current.get_or_insert_with(|| Page::new(number));
        let (dx, dy) = (self.left, self.top + self.cursor);
        page.ops
            .extend(strip.ops.iter().map(|op| op.translated(dx, dy)));
        if page.blocks.last() != Some(&block) {
            page.blocks.push(block);
        }

        match self.placements.last_mut() {
            Some(last) if last.block == block && last.page == number => {
                last.height = self.cursor + strip.height - last.top;
            }
            _ => self.placements.push(Placement {
                block,
                page: number,
                top: self.cursor,
                height: strip.height,
            }),
        }

        if strip.height > self.full + EPSILON {
            warn!(
                "block {} is {:.1} mm tall but a page holds {:.1} mm; it will be clipped",
                block, strip.height, self.full
            );
        }
        self.cursor += strip.height;
    }

    /// Vertical space that is dropped when it does not fit.
    fn advance(&mut self, height: f64) {
        if self.fits(height) {
            self.cursor += height;
        } else {
            self.new_page();
        }
    }

    /// Moves to a new page when the keep-with-next chain starting at `index`
    /// does not fit in the remaining space but would fit on an empty page.
    fn keep_with_followers(&mut self, flowables: &[Flowable], index: usize) {
        let Some(end) = chain_end(flowables, index) else {
            return;
        };
        // Only the head of a chain decides; later members were already accounted for.
        if index > 0 && chain_end(flowables, index - 1).is_some() {
            return;
        }

        let need = flowables[index..end].iter().map(Flowable::height).sum::<f64>()
            + flowables[end].lead_height(self.full);

        if need > self.full + EPSILON {
            debug!(
                "keep-with-next chain at block {} needs {:.1} mm, more than a page; placing without constraint",
                flowables[index].block, need
            );
        } else if !self.fits(need) {
            self.new_page();
        }
    }

    fn place(&mut self, flowable: &Flowable) {
        let block = flowable.block;
        match &flowable.kind {
            FlowKind::Unit(strip) => {
                self.ensure_room(strip.height);
                self.put(block, strip);
            }
            FlowKind::Lines {
                space_before,
                space_after,
                lines,
            } => self.place_lines(block, *space_before, *space_after, lines),
            FlowKind::Table { header, rows } => self.place_table(block, header, rows),
            FlowKind::Spacer(height) => self.advance(*height),
            FlowKind::Break => self.new_page(),
        }
    }

    /// Space above a block. It is dropped at the top of a page.
    fn space_before(&mut self, height: f64) {
        if self.cursor > EPSILON {
            self.cursor += height;
        }
    }

    /// Only the leading space and the lines must fit; trailing space is absorbed.
    fn place_lines(&mut self, block: usize, before: f64, after: f64, lines: &[Strip]) {
        let body = lines_height(lines);

        if body <= self.full + EPSILON {
            self.ensure_room(before + body);
            self.space_before(before);
            for line in lines {
                self.put(block, line);
            }
            self.advance(after);
            return;
        }

        debug!(
            "block {} ({:.1} mm) is taller than a page; splitting between lines",
            block, body
        );
        let first = lines.first().map(|line| line.height).unwrap_or(0.0);
        self.ensure_room(before + first);
        self.space_before(before);
        for line in lines {
            self.ensure_room(line.height);
            self.put(block, line);
        }
        self.advance(after);
    }

    fn place_table(&mut self, block: usize, header: &Strip, rows: &[Strip]) {
        let lead = header.height + rows.first().map(|row| row.height).unwrap_or(0.0);
        self.ensure_room(lead);
        self.put(block, header);

        for row in rows {
            if !self.fits(row.height) {
                debug!("table block {} continues on a new page", block);
                self.new_page();
                self.put(block, header);
            }
            self.put(block, row);
        }
    }

    fn finish(mut self) -> Pagination {
        self.new_page();
        if self.pages.is_empty() {
            self.pages.push(Page::new(1));
        }
        Pagination {
            pages: self.pages,
            placements: self.placements,
        }
    }
}

/// Index of the block that ends the keep-with-next chain starting at `index`,
/// or `None` when `index` is not kept with anything.
fn chain_end(flowables: &[Flowable], index: usize) -> Option<usize> {
    let mut end = index;
    while flowables[end].keep_with_next
        && end + 1 < flowables.len()
        && !flowables[end + 1].is_break()
    {
        end += 1;
    }
    (end > index).then_some(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Margins;

    /// A page whose content area is `height` millimetres tall, with no margins.
    fn geometry(height: f64) -> PageGeometry {
        PageGeometry::new(100.0, height, Margins::uniform(0.0))
    }

    fn unit(block: usize, height: f64) -> Flowable {
        let op = DrawOp::Fill {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height,
            color: crate::style::Rgb::BLACK,
        };
        Flowable::new(block, FlowKind::Unit(Strip::new(height, vec![op])))
    }

    fn lines(block: usize, count: usize, line_height: f64) -> Flowable {
        spaced_lines(block, count, line_height, 0.0, 0.0)
    }

    fn spaced_lines(block: usize, count: usize, line_height: f64, before: f64, after: f64) -> Flowable {
        let line = Strip::new(
            line_height,
            vec![DrawOp::Fill {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: line_height,
                color: crate::style::Rgb::BLACK,
            }],
        );
        Flowable::new(
            block,
            FlowKind::Lines {
                space_before: before,
                space_after: after,
                lines: vec![line; count],
            },
        )
    }

    fn table(block: usize, header: f64, rows: &[f64]) -> Flowable {
        let strip = |height: f64| {
            Strip::new(
                height,
                vec![DrawOp::Fill {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height,
                    color: crate::style::Rgb::BLACK,
                }],
            )
        };
        Flowable::new(
            block,
            FlowKind::Table {
                header: strip(header),
                rows: rows.iter().copied().map(strip).collect(),
            },
        )
    }

    fn page_break(block: usize) -> Flowable {
        Flowable::new(block, FlowKind::Break)
    }

    fn spacer(block: usize, height: f64) -> Flowable {
        Flowable::new(block, FlowKind::Spacer(height))
    }

    fn first_pages(pagination: &Pagination, blocks: usize) -> Vec<Option<usize>> {
        (0..blocks).map(|b| pagination.first_page_of(b)).collect()
    }

    #[test]
    fn blocks_fill_pages_in_order() {
        let flows = [unit(0, 40.0), unit(1, 40.0), unit(2, 40.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.page_count(), 2);
        assert_eq!(first_pages(&result, 3), [Some(1), Some(1), Some(2)]);
        assert_eq!(result.pages()[1].blocks(), [2]);
        assert!((result.placements()[1].top - 40.0).abs() < 1e-9);
    }

    #[test]
    fn exact_fit_stays_on_page() {
        let flows = [unit(0, 60.0), unit(1, 40.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.page_count(), 1);
    }

    #[test]
    fn keep_with_next_moves_pair_together() {
        let flows = [
            unit(0, 100.0),
            unit(1, 30.0).with_keep_with_next(true),
            unit(2, 90.0),
        ];
        let result = paginate(&flows, &geometry(200.0));
        assert_eq!(first_pages(&result, 3), [Some(1), Some(2), Some(2)]);
    }

    #[test]
    fn keep_with_next_pair_that_fits_stays() {
        let flows = [
            unit(0, 100.0),
            unit(1, 30.0).with_keep_with_next(true),
            unit(2, 60.0),
        ];
        let result = paginate(&flows, &geometry(200.0));
        assert_eq!(first_pages(&result, 3), [Some(1), Some(1), Some(1)]);
    }

    #[test]
    fn keep_with_next_chains_move_as_one() {
        let flows = [
            unit(0, 50.0),
            unit(1, 10.0).with_keep_with_next(true),
            unit(2, 10.0).with_keep_with_next(true),
            unit(3, 40.0),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(first_pages(&result, 4), [Some(1), Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn oversized_keep_with_next_chain_is_placed_without_constraint() {
        let flows = [
            unit(0, 50.0),
            unit(1, 30.0).with_keep_with_next(true),
            unit(2, 90.0),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(first_pages(&result, 3), [Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn keep_with_next_uses_lead_of_following_table() {
        let flows = [
            unit(0, 70.0),
            unit(1, 10.0).with_keep_with_next(true),
            table(2, 10.0, &[5.0, 30.0, 30.0]),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.first_page_of(1), Some(1));
        assert_eq!(result.pages_of_block(2), [1, 2]);
    }

    #[test]
    fn keep_with_next_stops_at_page_break() {
        let flows = [
            unit(0, 80.0),
            unit(1, 10.0).with_keep_with_next(true),
            page_break(2),
            unit(3, 50.0),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.first_page_of(1), Some(1));
        assert_eq!(result.first_page_of(3), Some(2));
    }

    #[test]
    fn page_break_separates_blocks() {
        let flows = [unit(0, 10.0), page_break(1), unit(2, 10.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.page_count(), 2);
        assert_eq!(first_pages(&result, 3), [Some(1), None, Some(2)]);
    }

    #[test]
    fn consecutive_breaks_do_not_produce_blank_pages() {
        let flows = [
            page_break(0),
            unit(1, 10.0),
            page_break(2),
            page_break(3),
            unit(4, 10.0),
            page_break(5),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.page_count(), 2);
        assert!(result.pages().iter().all(|page| !page.ops().is_empty()));
    }

    #[test]
    fn empty_document_has_one_page() {
        let result = paginate(&[], &geometry(100.0));
        assert_eq!(result.page_count(), 1);
        assert_eq!(result.pages()[0].number(), 1);
        assert!(result.pages()[0].ops().is_empty());
    }

    #[test]
    fn overflowing_spacer_is_absorbed_by_page_change() {
        let flows = [unit(0, 80.0), spacer(1, 30.0), unit(2, 10.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.first_page_of(2), Some(2));
        assert_eq!(result.placements()[1].top, 0.0);
    }

    #[test]
    fn oversized_unit_is_placed_alone_and_clipped() {
        let flows = [unit(0, 10.0), unit(1, 150.0), unit(2, 10.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(first_pages(&result, 3), [Some(1), Some(2), Some(3)]);
        assert_eq!(result.placements()[1].top, 0.0);
    }

    #[test]
    fn tall_text_splits_between_lines() {
        let flows = [unit(0, 20.0), lines(1, 30, 5.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.pages_of_block(1), [1, 2]);
        let heights: Vec<f64> = result.placements()[1..].iter().map(|p| p.height).collect();
        assert_eq!(heights, [80.0, 70.0]);
    }

    #[test]
    fn short_text_moves_whole() {
        let flows = [unit(0, 90.0), lines(1, 3, 5.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.pages_of_block(1), [2]);
    }

    #[test]
    fn trailing_space_does_not_push_a_paragraph_to_the_next_page() {
        // 40 mm used, 60 mm left: 2 + 56 mm of lines fit, the 4 mm after them does not.
        let flows = [
            unit(0, 40.0),
            spaced_lines(1, 8, 7.0, 2.0, 4.0),
            unit(2, 10.0),
        ];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(first_pages(&result, 3), [Some(1), Some(1), Some(2)]);
        assert!((result.placements()[1].top - 42.0).abs() < 1e-9);
        assert_eq!(result.placements()[2].top, 0.0);
    }

    #[test]
    fn space_before_is_dropped_at_the_top_of_a_page() {
        let flows = [unit(0, 90.0), spaced_lines(1, 2, 5.0, 8.0, 0.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.pages_of_block(1), [2]);
        assert_eq!(result.placements()[1].top, 0.0);
    }

    #[test]
    fn space_before_applies_below_other_content() {
        let flows = [unit(0, 10.0), spaced_lines(1, 1, 5.0, 8.0, 0.0)];
        let result = paginate(&flows, &geometry(100.0));
        assert!((result.placements()[1].top - 18.0).abs() < 1e-9);
    }

    #[test]
    fn table_repeats_header_on_continuation_pages() {
        let flows = [table(0, 10.0, &[30.0, 30.0, 30.0, 30.0])];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.pages_of_block(0), [1, 2]);
        // header + 3 rows on page 1, header + 1 row on page 2
        assert_eq!(result.pages()[0].ops().len(), 4);
        assert_eq!(result.pages()[1].ops().len(), 2);
        assert!(matches!(
            result.pages()[1].ops()[0],
            DrawOp::Fill { y, height, .. } if y == 0.0 && height == 10.0
        ));
    }

    #[test]
    fn table_without_room_for_header_and_row_moves() {
        let flows = [unit(0, 75.0), table(1, 10.0, &[20.0])];
        let result = paginate(&flows, &geometry(100.0));
        assert_eq!(result.pages_of_block(1), [2]);
    }

    #[test]
    fn ops_are_shifted_into_page_coordinates() {
        let geometry = PageGeometry::new(100.0, 120.0, Margins::trbl(10.0, 5.0, 10.0, 15.0));
        let flows = [unit(0, 20.0), unit(1, 20.0)];
        let result = paginate(&flows, &geometry);
        assert!(matches!(
            result.pages()[0].ops()[1],
            DrawOp::Fill { x, y, .. } if x == 15.0 && y == 30.0
        ));
    }
}
