//! Layered configuration for manual generation.
//!
//! `defaults/manual.default.toml` is embedded into the crate. Callers layer a
//! user file and `PDF_MANUAL_*` environment variables on top through
//! [`Loader`] before deserializing into [`ManualConfig`].

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::model::{Margins, PageGeometry};

const DEFAULT_TOML: &str = include_str!("../defaults/manual.default.toml");

/// Prefix of environment variable overrides, e.g. `PDF_MANUAL_OUTPUT__PATH`.
pub const ENV_PREFIX: &str = "PDF_MANUAL";

/// Top-level configuration of a generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualConfig {
    pub output: OutputConfig,
    pub assets: AssetsConfig,
    pub page: PageConfig,
    pub fonts: FontsConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub screenshots_dir: PathBuf,
}

/// Paper size and uniform margin.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    pub size: PageSize,
    pub margins_mm: f64,
}

impl PageConfig {
    /// Page geometry described by this configuration.
    pub fn geometry(&self) -> PageGeometry {
        let base = match self.size {
            PageSize::Letter => PageGeometry::letter(),
            PageSize::A4 => PageGeometry::a4(),
        };
        base.with_margins(Margins::uniform(self.margins_mm))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    Letter,
    A4,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FontsConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub monospace: Option<String>,
}

/// Text and output options of the generated document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub title: String,
    pub subtitle: String,
    pub version: String,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub bookmarks: bool,
}

impl DocumentConfig {
    /// Footer template, or `None` when page numbers are disabled.
    pub fn footer(&self) -> Option<&str> {
        self.footer
            .as_deref()
            .filter(|template| !template.trim().is_empty())
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `PDF_MANUAL_<SECTION>__<KEY>` environment variables.
    pub fn with_env(mut self) -> Self {
        self.builder = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ManualConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualConfig {
    /// Defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut loader = Loader::new();
        if let Some(path) = path {
            loader = loader.with_file(path);
        }
        Ok(loader.with_env().build()?)
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ManualConfig, ConfigError> {
    Loader::new().build()
}
