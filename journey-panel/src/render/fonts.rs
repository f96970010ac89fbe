//! Named font sizes and the bitmap fonts that render them.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::mapping::GlyphMapping;
use profont::{
    PROFONT_7_POINT, PROFONT_9_POINT, PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_14_POINT,
    PROFONT_18_POINT, PROFONT_24_POINT,
};
use serde::Deserialize;

/// Logical text sizes used by the layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSize {
    Small,
    Medium,
    MediumLarge,
    Large,
}

/// Pixel heights for each logical size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub small: u32,
    pub medium: u32,
    pub medium_large: u32,
    pub large: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            small: 16,
            medium: 32,
            medium_large: 36,
            large: 42,
        }
    }
}

/// Glyph ProFont draws for characters it lacks.
const REPLACEMENT_GLYPH: char = '?';

/// Available fonts, smallest first.
const PROFONTS: [&MonoFont<'static>; 7] = [
    &PROFONT_7_POINT,
    &PROFONT_9_POINT,
    &PROFONT_10_POINT,
    &PROFONT_12_POINT,
    &PROFONT_14_POINT,
    &PROFONT_18_POINT,
    &PROFONT_24_POINT,
];

/// Fonts resolved for each logical size.
#[derive(Clone, Copy)]
pub struct FontSet {
    small: &'static MonoFont<'static>,
    medium: &'static MonoFont<'static>,
    medium_large: &'static MonoFont<'static>,
    large: &'static MonoFont<'static>,
}

impl FontSet {
    /// Pick, for each size, the tallest font not exceeding its pixel height.
    pub fn from_sizes(sizes: &FontSizes) -> Self {
        Self {
            small: closest_font(sizes.small),
            medium: closest_font(sizes.medium),
            medium_large: closest_font(sizes.medium_large),
            large: closest_font(sizes.large),
        }
    }

    pub fn get(&self, size: FontSize) -> &'static MonoFont<'static> {
        match size {
            FontSize::Small => self.small,
            FontSize::Medium => self.medium,
            FontSize::MediumLarge => self.medium_large,
            FontSize::Large => self.large,
        }
    }
    /// Characters of `text` the font for `size` would draw as a replacement
    /// glyph, in order of first appearance.
    pub fn missing_glyphs(&self, size: FontSize, text: &str) -> Vec<char> {
        let mapping = self.get(size).glyph_mapping;
        let replacement = mapping.index(REPLACEMENT_GLYPH);

        let mut missing = Vec::new();
        for c in text.chars() {
            if c != REPLACEMENT_GLYPH && mapping.index(c) == replacement && !missing.contains(&c) {
                missing.push(c);
            }
        }
        missing
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::from_sizes(&FontSizes::default())
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("small", &self.small.character_size)
            .field("medium", &self.medium.character_size)
            .field("medium_large", &self.medium_large.character_size)
            .field("large", &self.large.character_size)
            .finish()
    }
}

fn closest_font(px: u32) -> &'static MonoFont<'static> {
    PROFONTS
        .iter()
        .rev()
        .find(|font| font.character_size.height <= px)
        .copied()
        .unwrap_or(PROFONTS[0])
}
