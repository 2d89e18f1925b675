//! Named style definitions and the registry that resolves them.
//!
//! Styles describe typography (family, weight, slant, size), colour, vertical
//! spacing, alignment and the keep-with-next pagination hint. Blocks only carry
//! a style *name*; the registry is the single source of truth and is built once
//! per generation run, then borrowed read-only by the content builder and the
//! renderer.
//!
//! Sizes and spacing are expressed in typographic points, page geometry in
//! millimetres. [`pt_to_mm`] converts between the two.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::model::HorizontalAlignment;

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Name of the font family installed as the document default.
pub const DEFAULT_FAMILY: &str = "default";

/// Name under which the optional monospace family is installed.
pub const MONOSPACE_FAMILY: &str = "monospace";

/// Converts typographic points into millimetres.
pub fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_POINT
}

/// An sRGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Plain black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// Plain white.
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parses a `#RRGGBB` (or `RRGGBB`) hex string.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Stroke weight of a font face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

/// Typography of a style: family, weight, slant and size.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    family: String,
    weight: FontWeight,
    italic: bool,
    size: u8,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: DEFAULT_FAMILY.to_string(),
            weight: FontWeight::Regular,
            italic: false,
            size: 10,
        }
    }
}

impl FontSpec {
    /// Creates a regular upright font of the default family at `size` points.
    pub fn new(size: u8) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Returns the family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the weight.
    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// Returns whether the face is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns whether the face is bold.
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    /// Returns the size in points.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Sets the family and returns the updated font.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    /// Sets the weight and returns the updated font.
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the italic flag and returns the updated font.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Sets the size in points and returns the updated font.
    pub fn with_size(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    /// Shorthand for a bold face.
    pub fn bold(self) -> Self {
        self.with_weight(FontWeight::Bold)
    }

    /// Shorthand for an italic face.
    pub fn italic(self) -> Self {
        self.with_italic(true)
    }
}

/// A complete, named style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleDefinition {
    name: String,
    font: FontSpec,
    color: Rgb,
    space_before: f64,
    space_after: f64,
    leading: f64,
    alignment: HorizontalAlignment,
    left_indent: f64,
    background: Option<Rgb>,
    keep_with_next: bool,
}

impl StyleDefinition {
    /// Creates a style with the given name and font. Leading defaults to 1.2 × the font size.
    pub fn new(name: impl Into<String>, font: FontSpec) -> Self {
        let leading = f64::from(font.size()) * 1.2;
        Self {
            name: name.into(),
            font,
            color: Rgb::BLACK,
            space_before: 0.0,
            space_after: 0.0,
            leading,
            alignment: HorizontalAlignment::Left,
            left_indent: 0.0,
            background: None,
            keep_with_next: false,
        }
    }

    /// Returns the unique style name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the typography.
    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    /// Returns the text colour.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Returns the space above the block in points.
    pub fn space_before(&self) -> f64 {
        self.space_before
    }

    /// Returns the space below the block in points.
    pub fn space_after(&self) -> f64 {
        self.space_after
    }

    /// Returns the baseline-to-baseline distance in points.
    pub fn leading(&self) -> f64 {
        self.leading
    }

    /// Returns the horizontal alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Returns the left indent in points.
    pub fn left_indent(&self) -> f64 {
        self.left_indent
    }

    /// Returns the background fill, if any.
    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    /// Returns whether the block must stay on the same page as its successor.
    pub fn keep_with_next(&self) -> bool {
        self.keep_with_next
    }

    /// Renames the style and returns it.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the font and returns the updated style.
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Sets the colour and returns the updated style.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Sets the space before and after (in points) and returns the updated style.
    pub fn with_spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Sets the leading in points and returns the updated style.
    pub fn with_leading(mut self, leading: f64) -> Self {
        self.leading = leading;
        self
    }

    /// Sets the alignment and returns the updated style.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the left indent in points and returns the updated style.
    pub fn with_left_indent(mut self, indent: f64) -> Self {
        self.left_indent = indent;
        self
    }

    /// Sets the background fill and returns the updated style.
    pub fn with_background(mut self, background: impl Into<Option<Rgb>>) -> Self {
        self.background = background.into();
        self
    }

    /// Sets the keep-with-next flag and returns the updated style.
    pub fn with_keep_with_next(mut self, keep: bool) -> Self {
        self.keep_with_next = keep;
        self
    }

    /// Space before the block in millimetres.
    pub fn space_before_mm(&self) -> f64 {
        pt_to_mm(self.space_before)
    }

    /// Space after the block in millimetres.
    pub fn space_after_mm(&self) -> f64 {
        pt_to_mm(self.space_after)
    }

    /// Line height in millimetres.
    pub fn leading_mm(&self) -> f64 {
        pt_to_mm(self.leading)
    }

    /// Left indent in millimetres.
    pub fn left_indent_mm(&self) -> f64 {
        pt_to_mm(self.left_indent)
    }

    fn merged(&self, name: &str, overrides: &StyleOverrides) -> StyleDefinition {
        let mut font = self.font.clone();
        if let Some(family) = &overrides.family {
            font.family = family.clone();
        }
        if let Some(weight) = overrides.weight {
            font.weight = weight;
        }
        if let Some(italic) = overrides.italic {
            font.italic = italic;
        }
        if let Some(size) = overrides.size {
            font.size = size;
        }

        // A size change without an explicit leading keeps the base proportion.
        let leading = match (overrides.leading, overrides.size) {
            (Some(leading), _) => leading,
            (None, Some(size)) if self.font.size > 0 => {
                self.leading * f64::from(size) / f64::from(self.font.size)
            }
            _ => self.leading,
        };

        StyleDefinition {
            name: name.to_string(),
            font,
            color: overrides.color.unwrap_or(self.color),
            space_before: overrides.space_before.unwrap_or(self.space_before),
            space_after: overrides.space_after.unwrap_or(self.space_after),
            leading,
            alignment: overrides.alignment.unwrap_or(self.alignment),
            left_indent: overrides.left_indent.unwrap_or(self.left_indent),
            background: overrides.background.unwrap_or(self.background),
            keep_with_next: overrides.keep_with_next.unwrap_or(self.keep_with_next),
        }
    }
}

/// Field-wise replacements applied when deriving a style from a base.
///
/// `None` keeps the base value. `background` is doubly optional so that a
/// derived style can also clear an inherited fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleOverrides {
    pub family: Option<String>,
    pub weight: Option<FontWeight>,
    pub italic: Option<bool>,
    pub size: Option<u8>,
    pub color: Option<Rgb>,
    pub space_before: Option<f64>,
    pub space_after: Option<f64>,
    pub leading: Option<f64>,
    pub alignment: Option<HorizontalAlignment>,
    pub left_indent: Option<f64>,
    pub background: Option<Option<Rgb>>,
    pub keep_with_next: Option<bool>,
}

impl StyleOverrides {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = Some(FontWeight::Bold);
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = Some(before);
        self.space_after = Some(after);
        self
    }

    pub fn leading(mut self, leading: f64) -> Self {
        self.leading = Some(leading);
        self
    }

    pub fn alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn left_indent(mut self, indent: f64) -> Self {
        self.left_indent = Some(indent);
        self
    }

    pub fn background(mut self, background: Option<Rgb>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn keep_with_next(mut self, keep: bool) -> Self {
        self.keep_with_next = Some(keep);
        self
    }
}

/// Map from style name to definition.
///
/// Registration order is irrelevant and the last registration for a name wins.
#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    styles: BTreeMap<String, StyleDefinition>,
}

impl StyleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the style stored under the definition's name.
    pub fn register(&mut self, definition: StyleDefinition) {
        self.styles.insert(definition.name.clone(), definition);
    }

    /// Registers a style and returns the registry, for chained construction.
    pub fn with(mut self, definition: StyleDefinition) -> Self {
        self.register(definition);
        self
    }

    /// Looks up a style by name.
    pub fn resolve(&self, name: &str) -> Result<&StyleDefinition> {
        self.styles
            .get(name)
            .ok_or_else(|| Error::UnknownStyle(name.to_string()))
    }

    /// Registers `name` as a copy of `base` with `overrides` applied.
    pub fn derive(&mut self, name: &str, base: &str, overrides: StyleOverrides) -> Result<()> {
        let derived = self.resolve(base)?.merged(name, &overrides);
        self.register(derived);
        Ok(())
    }

    /// Returns whether a style with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Iterates over the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Number of registered styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns whether no style is registered.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Builds the style taxonomy used by the bundled manual.
    pub fn manual_defaults() -> Result<Self> {
        let mut registry = StyleRegistry::new()
            .with(StyleDefinition::new(names::NORMAL, FontSpec::new(10)).with_leading(12.0))
            .with(
                StyleDefinition::new(names::TITLE, FontSpec::new(18).bold())
                    .with_alignment(HorizontalAlignment::Center)
                    .with_spacing(0.0, 6.0),
            )
            .with(
                StyleDefinition::new(names::HEADING1, FontSpec::new(18).bold())
                    .with_spacing(10.0, 6.0)
                    .with_keep_with_next(true),
            );

        registry.derive(
            names::HEADING2,
            names::HEADING1,
            StyleOverrides::new().size(14).spacing(10.0, 6.0),
        )?;
        registry.derive(
            names::HEADING3,
            names::HEADING1,
            StyleOverrides::new().size(12).spacing(10.0, 6.0),
        )?;

        registry.derive(
            names::COVER_TITLE,
            names::TITLE,
            StyleOverrides::new()
                .size(42)
                .color(palette::GOLD)
                .spacing(0.0, 20.0),
        )?;
        registry.derive(
            names::COVER_SUBTITLE,
            names::NORMAL,
            StyleOverrides::new()
                .size(20)
                .color(palette::ELECTRIC)
                .alignment(HorizontalAlignment::Center)
                .spacing(0.0, 12.0),
        )?;
        registry.derive(
            names::COVER_VERSION,
            names::NORMAL,
            StyleOverrides::new()
                .size(14)
                .alignment(HorizontalAlignment::Center)
                .spacing(0.0, 30.0),
        )?;
        registry.derive(
            names::SECTION_TITLE,
            names::HEADING1,
            StyleOverrides::new()
                .size(22)
                .color(palette::ELECTRIC)
                .spacing(20.0, 12.0),
        )?;
        registry.derive(
            names::SUB_SECTION,
            names::HEADING2,
            StyleOverrides::new()
                .size(16)
                .color(palette::ROYAL)
                .spacing(12.0, 8.0),
        )?;
        registry.derive(
            names::SUB_SUB_SECTION,
            names::HEADING3,
            StyleOverrides::new().size(13).spacing(10.0, 6.0),
        )?;
        registry.derive(
            names::BODY,
            names::NORMAL,
            StyleOverrides::new()
                .size(11)
                .leading(15.0)
                .spacing(6.0, 6.0)
                .alignment(HorizontalAlignment::Justified),
        )?;
        registry.derive(
            names::IMAGE_CAPTION,
            names::NORMAL,
            StyleOverrides::new()
                .size(10)
                .italic()
                .color(palette::CAPTION_GREY)
                .alignment(HorizontalAlignment::Center)
                .spacing(4.0, 12.0),
        )?;
        registry.derive(
            names::BULLET_ITEM,
            names::NORMAL,
            StyleOverrides::new()
                .size(11)
                .left_indent(20.0)
                .spacing(3.0, 3.0),
        )?;
        registry.derive(
            names::CODE_BLOCK,
            names::NORMAL,
            StyleOverrides::new()
                .family(MONOSPACE_FAMILY)
                .left_indent(20.0)
                .spacing(6.0, 6.0)
                .background(Some(palette::CODE_BACKGROUND)),
        )?;
        registry.derive(
            names::TABLE_HEADER,
            names::NORMAL,
            StyleOverrides::new()
                .bold()
                .color(palette::GOLD)
                .background(Some(palette::DARK_BACKGROUND)),
        )?;
        registry.derive(names::TABLE_BODY, names::NORMAL, StyleOverrides::new())?;
        registry.derive(
            names::TOC_ENTRY,
            names::NORMAL,
            StyleOverrides::new().size(11).leading(15.0).spacing(2.0, 2.0),
        )?;
        registry.derive(
            names::FOOTER,
            names::NORMAL,
            StyleOverrides::new()
                .size(8)
                .color(palette::CAPTION_GREY)
                .alignment(HorizontalAlignment::Right),
        )?;

        Ok(registry)
    }
}

/// Names of the styles registered by [`StyleRegistry::manual_defaults`].
pub mod names {
    pub const NORMAL: &str = "Normal";
    pub const TITLE: &str = "Title";
    pub const HEADING1: &str = "Heading1";
    pub const HEADING2: &str = "Heading2";
    pub const HEADING3: &str = "Heading3";
    pub const COVER_TITLE: &str = "CoverTitle";
    pub const COVER_SUBTITLE: &str = "CoverSubtitle";
    pub const COVER_VERSION: &str = "CoverVersion";
    pub const SECTION_TITLE: &str = "SectionTitle";
    pub const SUB_SECTION: &str = "SubSection";
    pub const SUB_SUB_SECTION: &str = "SubSubSection";
    pub const BODY: &str = "Body";
    pub const IMAGE_CAPTION: &str = "ImageCaption";
    pub const BULLET_ITEM: &str = "BulletItem";
    pub const CODE_BLOCK: &str = "CodeBlock";
    pub const TABLE_HEADER: &str = "TableHeader";
    pub const TABLE_BODY: &str = "TableBody";
    pub const TOC_ENTRY: &str = "TocEntry";
    pub const FOOTER: &str = "Footer";
}

/// Brand colours of the bundled manual.
pub mod palette {
    use super::Rgb;

    pub const GOLD: Rgb = Rgb(0xF5, 0x9E, 0x0B);
    pub const ELECTRIC: Rgb = Rgb(0x3B, 0x82, 0xF6);
    pub const ROYAL: Rgb = Rgb(0x8B, 0x5C, 0xF6);
    pub const DARK_BACKGROUND: Rgb = Rgb(0x0F, 0x17, 0x2A);
    pub const SUCCESS: Rgb = Rgb(0x22, 0xC5, 0x5E);
    pub const DANGER: Rgb = Rgb(0xDC, 0x26, 0x26);
    pub const CAPTION_GREY: Rgb = Rgb(0x55, 0x55, 0x55);
    pub const CODE_BACKGROUND: Rgb = Rgb(0xF5, 0xF5, 0xF5);
}
