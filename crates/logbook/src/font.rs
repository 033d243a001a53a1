//! Embedded typefaces and their metrics.
//!
//! The logbook is set in DejaVu Sans Condensed. Both faces are compiled into
//! the binary and embedded in the PDF, so names and remarks in any script the
//! font covers print as written. Layout measures text with the same glyph
//! advances the PDF viewer will use.

use std::sync::OnceLock;

use ttf_parser::Face;

use crate::layout::MM_PER_PT;

/// Regular face, TrueType.
pub const REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSansCondensed.ttf");
/// Bold face, TrueType.
pub const BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSansCondensed-Bold.ttf");

/// Advance used for characters the face has no glyph for, in em.
const FALLBACK_ADVANCE: f32 = 0.55;

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weight {
    /// Body text.
    #[default]
    Regular,
    /// Headers and totals labels.
    Bold,
}

impl Weight {
    /// `Bold` when `bold` is set.
    #[must_use]
    pub fn from_bold(bold: bool) -> Self {
        if bold {
            Self::Bold
        } else {
            Self::Regular
        }
    }

    /// Font file of this weight.
    #[must_use]
    pub fn data(self) -> &'static [u8] {
        match self {
            Self::Regular => REGULAR,
            Self::Bold => BOLD,
        }
    }

    fn face(self) -> Option<&'static Face<'static>> {
        static REGULAR_FACE: OnceLock<Option<Face<'static>>> = OnceLock::new();
        static BOLD_FACE: OnceLock<Option<Face<'static>>> = OnceLock::new();

        let cell = match self {
            Self::Regular => &REGULAR_FACE,
            Self::Bold => &BOLD_FACE,
        };
        cell.get_or_init(|| Face::parse(self.data(), 0).ok()).as_ref()
    }
}

/// Horizontal advance of `ch` in em.
fn advance(face: Option<&Face<'_>>, ch: char) -> f32 {
    face.and_then(|face| {
        let glyph = face.glyph_index(ch)?;
        let advance = face.glyph_hor_advance(glyph)?;
        Some(f32::from(advance) / f32::from(face.units_per_em()))
    })
    .unwrap_or(FALLBACK_ADVANCE)
}

/// Width in mm of `text` set at `font_size` points.
#[must_use]
pub fn text_width(text: &str, font_size: f32, weight: Weight) -> f32 {
    let face = weight.face();
    text.chars().map(|ch| advance(face, ch)).sum::<f32>() * font_size * MM_PER_PT
}

/// Characters of `text` the face cannot draw.
#[must_use]
pub fn missing_glyphs(text: &str, weight: Weight) -> Vec<char> {
    let face = weight.face();
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .filter(|&ch| face.and_then(|f| f.glyph_index(ch)).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_parse() {
        assert!(Weight::Regular.face().is_some());
        assert!(Weight::Bold.face().is_some());
    }

    #[test]
    fn test_non_latin_names_have_glyphs() {
        for name in ["Łukasz Żółw", "Волков", "Ærøskøbing", "Müller-Lüdenscheidt"] {
            assert!(missing_glyphs(name, Weight::Regular).is_empty(), "{name}");
            assert!(missing_glyphs(name, Weight::Bold).is_empty(), "{name}");
        }
    }

    #[test]
    fn test_missing_glyphs_reported() {
        assert_eq!(missing_glyphs("A\u{10FFFD}B", Weight::Regular), vec!['\u{10FFFD}']);
    }

    #[test]
    fn test_text_width() {
        assert!(text_width("", 6.0, Weight::Regular).abs() < f32::EPSILON);

        let narrow = text_width("iiii", 6.0, Weight::Regular);
        let wide = text_width("MMMM", 6.0, Weight::Regular);
        assert!(narrow < wide);

        let regular = text_width("TOTAL TIME", 6.0, Weight::Regular);
        assert!(text_width("TOTAL TIME", 6.0, Weight::Bold) > regular);
        assert!((text_width("TOTAL TIME", 12.0, Weight::Regular) - 2.0 * regular).abs() < 1e-3);
        assert!(text_width("Волков", 6.0, Weight::Regular) > 0.0);
    }
}
