//! Measurement of content blocks into flowables.
//!
//! Every block is turned into a [`Flowable`]: its vertical extent plus the draw
//! operations that render it, positioned relative to the block's top-left
//! corner at the left edge of the content area. The paginator later shifts
//! those operations onto a page.

use log::debug;

use crate::assets::DecodedImage;
use crate::error::Result;
use crate::measure::{wrap_lines, TextMetrics};
use crate::model::{ContentBlock, Document, HorizontalAlignment, ImageBlock, TableBlock};
use crate::style::{pt_to_mm, FontSpec, Rgb, StyleDefinition, StyleRegistry};

/// Inner padding of table cells, in points.
const TABLE_CELL_PADDING_PT: f64 = 6.0;

/// Stroke width of table grid lines, in points.
const TABLE_GRID_WIDTH_PT: f64 = 1.0;

const TABLE_GRID_COLOR: Rgb = Rgb::BLACK;

/// A positioned drawing primitive. Coordinates are millimetres from the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// A run of text whose line box starts at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: FontSpec,
        color: Rgb,
    },
    /// A straight stroke.
    Rule {
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Rgb,
    },
    /// A filled rectangle.
    Fill {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    /// A raster image scaled to `width × height`.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: DecodedImage,
    },
}

impl DrawOp {
    /// Returns a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> DrawOp {
        let mut op = self.clone();
        match &mut op {
            DrawOp::Text { x, y, .. } | DrawOp::Fill { x, y, .. } | DrawOp::Image { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            DrawOp::Rule { from, to, .. } => {
                from.0 += dx;
                from.1 += dy;
                to.0 += dx;
                to.1 += dy;
            }
        }
        op
    }
}

/// A horizontal strip of draw operations with a fixed height.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Strip {
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl Strip {
    pub fn new(height: f64, ops: Vec<DrawOp>) -> Self {
        Self { height, ops }
    }
}

/// Measured shape of a block, as seen by the paginator.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FlowKind {
    /// Placed as a whole; never split.
    Unit(Strip),
    /// Paragraph lines; split between lines only when taller than a page.
    Lines {
        space_before: f64,
        space_after: f64,
        lines: Vec<Strip>,
    },
    /// Table rows; the header strip is repeated on continuation pages.
    Table { header: Strip, rows: Vec<Strip> },
    /// Vertical gap.
    Spacer(f64),
    /// Forced page break.
    Break,
}

/// A measured block ready for pagination.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Flowable {
    pub block: usize,
    pub keep_with_next: bool,
    pub kind: FlowKind,
}

impl Flowable {
    pub fn new(block: usize, kind: FlowKind) -> Self {
        Self {
            block,
            keep_with_next: false,
            kind,
        }
    }

    pub fn with_keep_with_next(mut self, keep: bool) -> Self {
        self.keep_with_next = keep;
        self
    }

    /// Height of the whole block if placed on one page.
    pub fn height(&self) -> f64 {
        match &self.kind {
            FlowKind::Unit(strip) => strip.height,
            FlowKind::Lines {
                space_before,
                space_after,
                lines,
            } => space_before + space_after + lines_height(lines),
            FlowKind::Table { header, rows } => {
                header.height + rows.iter().map(|row| row.height).sum::<f64>()
            }
            FlowKind::Spacer(height) => *height,
            FlowKind::Break => 0.0,
        }
    }

    /// Height of the smallest piece that has to land on the current page
    /// for the block to start there. Trailing paragraph space is not part of it.
    pub fn lead_height(&self, page_height: f64) -> f64 {
        match &self.kind {
            FlowKind::Lines {
                space_before,
                lines,
                ..
            } => {
                let body = lines_height(lines);
                if body > page_height {
                    space_before + lines.first().map(|line| line.height).unwrap_or(0.0)
                } else {
                    space_before + body
                }
            }
            FlowKind::Table { header, rows } => {
                header.height + rows.first().map(|row| row.height).unwrap_or(0.0)
            }
            _ => self.height(),
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self.kind, FlowKind::Break)
    }
}

/// Measures every block of `document`.
///
/// Fails with [`crate::Error::UnknownStyle`] as soon as a block references a
/// style that is not registered.
pub(crate) fn lay_out<M>(
    document: &Document,
    styles: &StyleRegistry,
    metrics: &M,
) -> Result<Vec<Flowable>>
where
    M: TextMetrics + ?Sized,
{
    let width = document.geometry().content_width();
    let layout = BlockLayout {
        styles,
        metrics,
        width,
    };

    document
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| layout.block(index, block))
        .collect()
}

struct BlockLayout<'a, M: ?Sized> {
    styles: &'a StyleRegistry,
    metrics: &'a M,
    width: f64,
}

impl<M> BlockLayout<'_, M>
where
    M: TextMetrics + ?Sized,
{
    fn block(&self, index: usize, block: &ContentBlock) -> Result<Flowable> {
        let flowable = match block {
            ContentBlock::Text { style, content } => {
                let style = self.styles.resolve(style)?;
                Flowable::new(index, self.text(style, content))
                    .with_keep_with_next(style.keep_with_next())
            }
            ContentBlock::Table(table) => {
                let keep = self.styles.resolve(table.header_style())?.keep_with_next();
                Flowable::new(index, self.table(table)?).with_keep_with_next(keep)
            }
            ContentBlock::Image(image) => {
                // An image follows its caption style.
                let keep = match image.caption() {
                    Some(_) => self.styles.resolve(image.caption_style())?.keep_with_next(),
                    None => false,
                };
                Flowable::new(index, FlowKind::Unit(self.image(image)?)).with_keep_with_next(keep)
            }
            ContentBlock::Spacer { height } => Flowable::new(index, FlowKind::Spacer(height.max(0.0))),
            ContentBlock::PageBreak => Flowable::new(index, FlowKind::Break),
        };
        Ok(flowable)
    }

    fn text(&self, style: &StyleDefinition, content: &str) -> FlowKind {
        let indent = style.left_indent_mm();
        let available = (self.width - indent).max(0.0);
        let line_height = style.leading_mm();

        let lines = self
            .paragraph_lines(style, content, available)
            .into_iter()
            .map(|(text, justify)| {
                let mut ops = Vec::new();
                if let Some(color) = style.background() {
                    ops.push(DrawOp::Fill {
                        x: indent,
                        y: 0.0,
                        width: available,
                        height: line_height,
                        color,
                    });
                }
                ops.extend(self.line_ops(style, &text, indent, available, 0.0, justify));
                Strip::new(line_height, ops)
            })
            .collect();

        FlowKind::Lines {
            space_before: style.space_before_mm(),
            space_after: style.space_after_mm(),
            lines,
        }
    }

    /// Wraps `content` and flags the lines that may be stretched to full width.
    fn paragraph_lines(
        &self,
        style: &StyleDefinition,
        content: &str,
        available: f64,
    ) -> Vec<(String, bool)> {
        let justified = style.alignment() == HorizontalAlignment::Justified;
        let mut out = Vec::new();
        for paragraph in content.split('\n') {
            let lines = wrap_lines(self.metrics, style.font(), paragraph, available);
            let last = lines.len().saturating_sub(1);
            out.extend(
                lines
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| (line, justified && i < last)),
            );
        }
        out
    }

    fn line_ops(
        &self,
        style: &StyleDefinition,
        text: &str,
        left: f64,
        available: f64,
        y: f64,
        justify: bool,
    ) -> Vec<DrawOp> {
        if text.is_empty() {
            return Vec::new();
        }

        let font = style.font();
        let text_op = |x: f64, text: &str| DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: font.clone(),
            color: style.color(),
        };

        let words: Vec<&str> = text.split(' ').filter(|word| !word.is_empty()).collect();
        if justify && words.len() > 1 {
            let natural: f64 = words
                .iter()
                .map(|word| self.metrics.text_width(font, word))
                .sum();
            let gap = (available - natural) / (words.len() - 1) as f64;
            let mut x = left;
            return words
                .iter()
                .map(|word| {
                    let op = text_op(x, word);
                    x += self.metrics.text_width(font, word) + gap;
                    op
                })
                .collect();
        }

        let width = self.metrics.text_width(font, text);
        let x = left + aligned_offset(style.alignment(), available, width);
        vec![text_op(x, text)]
    }

    fn table(&self, table: &TableBlock) -> Result<FlowKind> {
        let header_style = self.styles.resolve(table.header_style())?;
        let body_style = self.styles.resolve(table.body_style())?;

        let widths = self.column_widths(table);
        let padding = pt_to_mm(TABLE_CELL_PADDING_PT);

        let mut strips = table.rows().iter().enumerate().map(|(index, row)| {
            let style = if index == 0 { header_style } else { body_style };
            self.table_row(style, row, &widths, padding)
        });

        let header = strips.next().unwrap_or_default();
        let rows = strips.collect();
        Ok(FlowKind::Table { header, rows })
    }

    fn column_widths(&self, table: &TableBlock) -> Vec<f64> {
        let columns = table.column_count();
        if columns == 0 {
            return Vec::new();
        }
        if table.column_widths().is_empty() {
            return vec![self.width / columns as f64; columns];
        }

        let total: f64 = table.column_widths().iter().sum();
        if total > self.width && total > 0.0 {
            debug!(
                "table columns ({:.1} mm) exceed content width ({:.1} mm); scaling down",
                total, self.width
            );
            let factor = self.width / total;
            table.column_widths().iter().map(|w| w * factor).collect()
        } else {
            table.column_widths().to_vec()
        }
    }

    fn table_row(
        &self,
        style: &StyleDefinition,
        cells: &[String],
        widths: &[f64],
        padding: f64,
    ) -> Strip {
        let line_height = style.leading_mm();
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                wrap_lines(self.metrics, style.font(), cell, (width - 2.0 * padding).max(0.0))
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = line_count as f64 * line_height + 2.0 * padding;
        let row_width: f64 = widths.iter().sum();

        let mut ops = Vec::new();
        if let Some(color) = style.background() {
            ops.push(DrawOp::Fill {
                x: 0.0,
                y: 0.0,
                width: row_width,
                height,
                color,
            });
        }

        let mut x = 0.0;
        for (lines, width) in wrapped.iter().zip(widths) {
            let inner = (width - 2.0 * padding).max(0.0);
            for (i, line) in lines.iter().enumerate() {
                let y = padding + i as f64 * line_height;
                ops.extend(self.line_ops(style, line, x + padding, inner, y, false));
            }
            x += width;
        }

        let grid = |from: (f64, f64), to: (f64, f64)| DrawOp::Rule {
            from,
            to,
            thickness: pt_to_mm(TABLE_GRID_WIDTH_PT),
            color: TABLE_GRID_COLOR,
        };
        ops.push(grid((0.0, 0.0), (row_width, 0.0)));
        ops.push(grid((0.0, height), (row_width, height)));
        let mut edge = 0.0;
        ops.push(grid((edge, 0.0), (edge, height)));
        for width in widths {
            edge += width;
            ops.push(grid((edge, 0.0), (edge, height)));
        }

        Strip::new(height, ops)
    }

    fn image(&self, block: &ImageBlock) -> Result<Strip> {
        let fit = block.fit();
        let x = aligned_offset(block.alignment(), self.width, fit.width);
        let mut ops = vec![DrawOp::Image {
            x,
            y: 0.0,
            width: fit.width,
            height: fit.height,
            image: block.image().clone(),
        }];
        let mut height = fit.height;

        if let Some(caption) = block.caption() {
            let style = self.styles.resolve(block.caption_style())?;
            let indent = style.left_indent_mm();
            let available = (self.width - indent).max(0.0);
            height += style.space_before_mm();
            for (line, justify) in self.paragraph_lines(style, caption, available) {
                ops.extend(self.line_ops(style, &line, indent, available, height, justify));
                height += style.leading_mm();
            }
            height += style.space_after_mm();
        }

        Ok(Strip::new(height, ops))
    }
}

pub(crate) fn lines_height(lines: &[Strip]) -> f64 {
    lines.iter().map(|line| line.height).sum()
}

pub(crate) fn aligned_offset(alignment: HorizontalAlignment, available: f64, width: f64) -> f64 {
    let slack = (available - width).max(0.0);
    match alignment {
        HorizontalAlignment::Left | HorizontalAlignment::Justified => 0.0,
        HorizontalAlignment::Center => slack / 2.0,
        HorizontalAlignment::Right => slack,
    }
}
