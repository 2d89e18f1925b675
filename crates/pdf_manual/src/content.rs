//! Helpers that turn manual content into blocks.
//!
//! [`ContentBuilder`] resolves every style it is asked to use up front and
//! returns fresh blocks from each call, so section functions can stay pure:
//! they take a builder and return their own block sequence. Image problems
//! never escape the builder; a missing or broken screenshot becomes a short
//! placeholder paragraph instead.

use std::path::Path;

use log::warn;

use crate::assets::ImageAssets;
use crate::error::Result;
use crate::fit::fit;
use crate::model::{ContentBlock, HorizontalAlignment, ImageBlock, TableBlock};
use crate::style::{names, StyleRegistry};

/// Default screenshot box width: 6.5 inches.
pub const SCREENSHOT_MAX_WIDTH_MM: f64 = 165.1;

/// Default screenshot box height: 4.5 inches.
pub const SCREENSHOT_MAX_HEIGHT_MM: f64 = 114.3;

/// Gap above and below a screenshot, in millimetres.
const SCREENSHOT_PADDING_MM: f64 = 2.8;

/// Builds content blocks against a style registry and an image source.
#[derive(Clone, Copy)]
pub struct ContentBuilder<'a> {
    styles: &'a StyleRegistry,
    assets: &'a dyn ImageAssets,
    max_width: f64,
    max_height: f64,
}

impl<'a> ContentBuilder<'a> {
    /// Creates a builder with the default screenshot box.
    pub fn new(styles: &'a StyleRegistry, assets: &'a dyn ImageAssets) -> Self {
        Self {
            styles,
            assets,
            max_width: SCREENSHOT_MAX_WIDTH_MM,
            max_height: SCREENSHOT_MAX_HEIGHT_MM,
        }
    }

    /// Overrides the screenshot box, in millimetres.
    pub fn with_image_box(mut self, max_width: f64, max_height: f64) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// The registry styles are resolved against.
    pub fn styles(&self) -> &'a StyleRegistry {
        self.styles
    }

    /// A paragraph in `style`.
    pub fn text(&self, style: &str, content: impl Into<String>) -> Result<ContentBlock> {
        self.styles.resolve(style)?;
        Ok(ContentBlock::text(style, content))
    }

    /// One bullet paragraph per item.
    pub fn bullets<I, S>(&self, items: I) -> Result<Vec<ContentBlock>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.styles.resolve(names::BULLET_ITEM)?;
        Ok(items
            .into_iter()
            .map(|item| ContentBlock::text(names::BULLET_ITEM, format!("\u{2022} {}", item.as_ref())))
            .collect())
    }

    /// Numbered steps, starting at 1.
    pub fn numbered<I, S>(&self, steps: I) -> Result<Vec<ContentBlock>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.styles.resolve(names::BULLET_ITEM)?;
        Ok(steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| ContentBlock::text(names::BULLET_ITEM, format!("{}. {}", i + 1, step.as_ref())))
            .collect())
    }

    /// A table with the standard header and body styles. The first row is the header.
    pub fn table<R, C>(&self, rows: R, column_widths: Vec<f64>) -> Result<ContentBlock>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.styles.resolve(names::TABLE_HEADER)?;
        self.styles.resolve(names::TABLE_BODY)?;
        let table = TableBlock::new(rows, column_widths, names::TABLE_HEADER, names::TABLE_BODY)?;
        Ok(ContentBlock::Table(table))
    }

    /// Vertical space, in millimetres.
    pub fn spacer(&self, height: f64) -> ContentBlock {
        ContentBlock::spacer(height)
    }

    /// Forced page break.
    pub fn page_break(&self) -> ContentBlock {
        ContentBlock::page_break()
    }

    /// A centred image fitted into the screenshot box, with an optional caption.
    ///
    /// Returns a placeholder paragraph when the asset is missing or cannot be
    /// decoded. Only style errors are returned.
    pub fn image(&self, path: impl AsRef<Path>, caption: Option<&str>) -> Result<ContentBlock> {
        self.styles.resolve(names::IMAGE_CAPTION)?;
        self.styles.resolve(names::BODY)?;

        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if !self.assets.exists(path) {
            warn!("screenshot {} not found; inserting placeholder", path.display());
            return Ok(placeholder(format!("[Image not found: {name}]")));
        }

        let fitted = self.assets.decode(path).and_then(|image| {
            let result = fit(
                f64::from(image.width()),
                f64::from(image.height()),
                self.max_width,
                self.max_height,
            )?;
            Ok((image, result))
        });

        match fitted {
            Ok((image, result)) => {
                let mut block = ImageBlock::new(path, image, result, self.max_width, self.max_height)
                    .with_alignment(HorizontalAlignment::Center);
                if let Some(caption) = caption {
                    block = block.with_caption(caption, names::IMAGE_CAPTION);
                }
                Ok(ContentBlock::Image(block))
            }
            Err(err) if err.is_recoverable_asset_error() => {
                warn!("screenshot {} unusable ({}); inserting placeholder", path.display(), err);
                Ok(placeholder(format!("[Image invalid: {name}]")))
            }
            Err(err) => Err(err),
        }
    }

    /// [`ContentBuilder::image`] padded with a small spacer above and below.
    pub fn screenshot(&self, path: impl AsRef<Path>, caption: Option<&str>) -> Result<Vec<ContentBlock>> {
        Ok(vec![
            self.spacer(SCREENSHOT_PADDING_MM),
            self.image(path, caption)?,
            self.spacer(SCREENSHOT_PADDING_MM),
        ])
    }
}

fn placeholder(text: String) -> ContentBlock {
    ContentBlock::text(names::BODY, text)
}
