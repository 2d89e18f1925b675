//! The bundled operations manual and the end-to-end generation run.

pub mod sections;

use std::fs;

use log::{debug, info};

use crate::assets::{FsAssets, ImageAssets};
use crate::config::ManualConfig;
use crate::content::ContentBuilder;
use crate::error::{Error, Result};
use crate::fonts::FontSet;
use crate::measure::TextMetrics;
use crate::model::{Document, Section};
use crate::paginate::Pagination;
use crate::render::{DocumentRenderer, GenpdfBackend, PageFooter, RenderBackend, RenderReport};
use crate::style::{names, StyleRegistry};
use crate::toc;

/// Sections before and after the table of contents.
#[derive(Clone, Debug)]
pub struct ManualSections {
    /// Cover and other front matter.
    pub front: Vec<Section>,
    /// Numbered chapters listed in the contents.
    pub body: Vec<Section>,
}

/// Builds the manual's sections from `assets`.
pub fn sections(
    styles: &StyleRegistry,
    assets: &dyn ImageAssets,
    config: &ManualConfig,
) -> Result<ManualSections> {
    let builder = ContentBuilder::new(styles, assets);
    let front = vec![sections::cover(&builder, &config.document)?];
    let body = sections::body(&builder)?;
    debug!("built {} front and {} body sections", front.len(), body.len());
    Ok(ManualSections { front, body })
}

/// Lays out the manual with a resolved table of contents.
pub fn compose<M, B>(
    renderer: &DocumentRenderer<'_, M, B>,
    styles: &StyleRegistry,
    assets: &dyn ImageAssets,
    config: &ManualConfig,
) -> Result<(Document, Pagination)>
where
    M: TextMetrics,
    B: RenderBackend,
{
    let ManualSections { front, body } = sections(styles, assets, config)?;
    toc::resolve_contents(
        renderer,
        styles,
        &config.document.title,
        config.page.geometry(),
        &front,
        &body,
    )
}

/// Generates the manual described by `config` and writes it to `config.output.path`.
pub fn generate(config: &ManualConfig) -> Result<RenderReport> {
    let styles = StyleRegistry::manual_defaults()?;
    let fonts = FontSet::discover(config.fonts.dir.as_deref(), config.fonts.monospace.as_deref())
        .map_err(Error::FontLoad)?;
    let assets = FsAssets::new(&config.assets.screenshots_dir);
    info!("reading screenshots from {}", assets.root().display());

    let renderer = DocumentRenderer::new(&styles, fonts.metrics(), GenpdfBackend::new(fonts))
        .with_footer(
            config
                .document
                .footer()
                .map(|template| PageFooter::new(template, names::FOOTER)),
        )
        .with_bookmarks(config.document.bookmarks);

    let (document, _) = compose(&renderer, &styles, &assets, config)?;

    let output = &config.output.path;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::RenderWrite {
            path: output.clone(),
            source,
        })?;
    }
    renderer.render_to_file(&document, output)
}
