//! Font discovery and text measurement for the `pdf_manual` crate.
//!
//! The default family is loaded from the bundled font directory and falls back
//! to the Windows Arial family when the bundled files are missing. Extra named
//! families (such as the monospace family used by code blocks) are optional;
//! styles that name a family which failed to load use the default one.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, Font, FontCache, FontData, FontFamily};
use log::{debug, warn};

use crate::measure::TextMetrics;
use crate::style::{FontSpec, Rgb};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable that overrides the bundled font directory.
pub const FONTS_DIR_ENV: &str = "PDF_MANUAL_FONTS_DIR";

/// Environment variable that overrides the Windows system font directory.
pub const WINDOWS_FONTS_DIR_ENV: &str = "PDF_MANUAL_WINDOWS_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

const WINDOWS_FALLBACK_FAMILY_NAME: &str = "Arial";

struct WindowsFontFiles {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const WINDOWS_FONT_FILES: WindowsFontFiles = WindowsFontFiles {
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

/// Directory the crate ships its fonts in.
pub fn bundled_fonts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = preferred {
        push_unique(&mut candidates, path.to_path_buf());
    }

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(&mut candidates, path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(&mut candidates, bundled_fonts_dir());
    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory(preferred: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(preferred) {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate font directory. Checked: {}. Set fonts.dir or {}.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_family(directory: &Path, name: &str) -> Result<FontFamily<FontData>, Error> {
    fonts::from_files(directory, name, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                name,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn load_windows_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load Windows fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn windows_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    Ok(FontFamily {
        regular: load_windows_font(&directory, WINDOWS_FONT_FILES.regular, "regular")?,
        bold: load_windows_font(&directory, WINDOWS_FONT_FILES.bold, "bold")?,
        italic: load_windows_font(&directory, WINDOWS_FONT_FILES.italic, "italic")?,
        bold_italic: load_windows_font(&directory, WINDOWS_FONT_FILES.bold_italic, "bold italic")?,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the default family from `preferred` or the usual search paths, falling
/// back to the Windows Arial family when no Roboto files are found.
pub fn default_font_family(preferred: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let bundled = resolve_font_directory(preferred)
        .and_then(|directory| load_family(&directory, DEFAULT_FONT_FAMILY_NAME));

    match bundled {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match windows_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to Windows '{}' family.",
                    err, WINDOWS_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); Windows fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Bundled fonts unavailable and Windows fallback failed: {}",
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether the default font family can be found without the Windows fallback.
pub fn default_fonts_available(preferred: Option<&Path>) -> bool {
    resolve_font_directory(preferred).is_ok()
}

/// The font families available to a render.
///
/// The default family backs every style; extra families are addressed by the
/// name a [`FontSpec`] carries.
#[derive(Clone, Debug)]
pub struct FontSet {
    default: FontFamily<FontData>,
    extra: Vec<(String, FontFamily<FontData>)>,
}

impl FontSet {
    /// Creates a set containing only `default`.
    pub fn new(default: FontFamily<FontData>) -> Self {
        Self {
            default,
            extra: Vec::new(),
        }
    }

    /// Discovers the default family and, when `monospace` names a family in the
    /// same directory, loads it under [`crate::style::MONOSPACE_FAMILY`].
    ///
    /// A missing monospace family is logged and skipped.
    pub fn discover(directory: Option<&Path>, monospace: Option<&str>) -> Result<Self, Error> {
        let mut set = Self::new(default_font_family(directory)?);

        if let Some(name) = monospace.filter(|name| !name.trim().is_empty()) {
            let loaded = resolve_font_directory(directory)
                .and_then(|directory| load_family(&directory, name));
            match loaded {
                Ok(family) => set.add_family(crate::style::MONOSPACE_FAMILY, family),
                Err(err) => warn!(
                    "Monospace family '{}' unavailable ({}); code blocks use the default family.",
                    name, err
                ),
            }
        }

        Ok(set)
    }

    /// Registers an extra family under `name`, replacing an earlier one.
    pub fn add_family(&mut self, name: impl Into<String>, family: FontFamily<FontData>) {
        let name = name.into();
        self.extra.retain(|(existing, _)| existing != &name);
        self.extra.push((name, family));
    }

    /// The default family.
    pub fn default_family(&self) -> &FontFamily<FontData> {
        &self.default
    }

    /// Names of the extra families, in registration order.
    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.extra.iter().map(|(name, _)| name.as_str())
    }

    /// Creates a genpdf document using the default family and adds the extra families.
    pub fn install(&self) -> (genpdf::Document, FontHandles) {
        let mut document = genpdf::Document::new(self.default.clone());
        let families = self
            .extra
            .iter()
            .map(|(name, family)| (name.clone(), document.add_font_family(family.clone())))
            .collect();
        (document, FontHandles { families })
    }

    /// Metrics backed by the glyph advances of these fonts.
    pub fn metrics(&self) -> FontMetrics {
        let mut cache = FontCache::new(self.default.clone());
        let families = self
            .extra
            .iter()
            .map(|(name, family)| (name.clone(), cache.add_font_family(family.clone())))
            .collect();
        FontMetrics {
            cache,
            handles: FontHandles { families },
        }
    }
}

/// Handles to the extra families loaded into a font cache.
#[derive(Clone, Debug, Default)]
pub struct FontHandles {
    families: Vec<(String, FontFamily<Font>)>,
}

impl FontHandles {
    /// Converts a [`FontSpec`] into a genpdf style.
    ///
    /// Families that were not loaded resolve to the default family.
    pub fn style(&self, spec: &FontSpec, color: Rgb) -> genpdf::style::Style {
        let mut style = genpdf::style::Style::new()
            .with_font_size(spec.size())
            .with_color(genpdf::style::Color::Rgb(color.0, color.1, color.2));
        if spec.is_bold() {
            style = style.bold();
        }
        if spec.is_italic() {
            style = style.italic();
        }
        match self.families.iter().find(|(name, _)| name == spec.family()) {
            Some((_, family)) => style.with_font_family(*family),
            None => {
                if spec.family() != crate::style::DEFAULT_FAMILY {
                    debug!("font family '{}' not loaded; using default", spec.family());
                }
                style
            }
        }
    }
}

/// [`TextMetrics`] computed from real glyph advances.
pub struct FontMetrics {
    cache: FontCache,
    handles: FontHandles,
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("handles", &self.handles)
            .finish_non_exhaustive()
    }
}

impl TextMetrics for FontMetrics {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        let style = self.handles.style(font, Rgb::BLACK);
        let width: printpdf::Mm = style.str_width(&self.cache, text).into();
        width.0
    }
}
