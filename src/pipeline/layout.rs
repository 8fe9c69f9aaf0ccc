//! Page geometry for the translated output: encoding fallback, word wrap
//! and pagination.
//!
//! Pure functions only; [`super::write`] turns the resulting lines into
//! pdfium text objects. Measurements use the standard Helvetica metrics so
//! wrapping matches what the built-in font actually draws.
//!
//! ```text
//!  ┌──────────── A4, 210 × 297 mm ────────────┐
//!  │ 10 mm margin                             │
//!  │   body lines, 5 mm apart, Helvetica 7 pt │
//!  │   ...                                    │
//!  │ 20 mm bottom margin ─────────────────────│
//!  │            Page 3/12  (15 mm from bottom)│
//!  └──────────────────────────────────────────┘
//! ```

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;
pub const BOTTOM_MARGIN_MM: f32 = 20.0;
pub const LINE_HEIGHT_MM: f32 = 5.0;
pub const FOOTER_OFFSET_MM: f32 = 15.0;

pub const DEFAULT_FONT_SIZE: f32 = 7.0;
pub const FOOTER_FONT_SIZE: f32 = 8.0;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Width used for characters outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

/// Replace every character the single-byte output font cannot encode
/// (anything above U+00FF) with `?`.
///
/// Characters are substituted, never dropped, so the text keeps its length
/// in characters.
pub fn to_latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c } else { '?' })
        .collect()
}

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c) as u32).sum();
    units as f32 * font_size / 1000.0
}

/// Geometry of one output page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub body_width: f32,
    pub lines_per_page: usize,
}

impl PageLayout {
    /// A4 layout for the given body font size (points).
    ///
    /// Line height is 5 mm, or 1.2 × the font size for fonts too large to
    /// fit in it.
    pub fn a4(font_size: f32) -> Self {
        let line_height = (LINE_HEIGHT_MM * PT_PER_MM).max(font_size * 1.2);
        let body_height = (PAGE_HEIGHT_MM - MARGIN_MM - BOTTOM_MARGIN_MM) * PT_PER_MM;
        Self {
            font_size,
            line_height,
            body_width: (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM,
            lines_per_page: ((body_height / line_height).floor() as usize).max(1),
        }
    }

    pub fn page_width(&self) -> f32 {
        PAGE_WIDTH_MM * PT_PER_MM
    }

    pub fn page_height(&self) -> f32 {
        PAGE_HEIGHT_MM * PT_PER_MM
    }

    pub fn margin(&self) -> f32 {
        MARGIN_MM * PT_PER_MM
    }

    /// Baseline y of body line `index` (0-based) on a page.
    pub fn line_baseline(&self, index: usize) -> f32 {
        self.page_height() - self.margin() - self.line_height * (index as f32 + 1.0)
            + (self.line_height - self.font_size) / 2.0
    }

    /// Baseline y of the footer.
    pub fn footer_baseline(&self) -> f32 {
        FOOTER_OFFSET_MM * PT_PER_MM - FOOTER_FONT_SIZE
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4(DEFAULT_FONT_SIZE)
    }
}

/// Greedy word wrap. `\n` is a hard break, blank lines are kept, and a word
/// wider than the line is broken between characters.
pub fn wrap_lines(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        let mut current = String::new();
        for word in hard_line.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font_size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, font_size) > max_width {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Wrap `text` and cut it into pages of at most `layout.lines_per_page`
/// lines. Always returns at least one (possibly empty) page.
pub fn paginate(text: &str, layout: &PageLayout) -> Vec<Vec<String>> {
    let lines = wrap_lines(text, layout.body_width, layout.font_size);
    let mut pages: Vec<Vec<String>> = lines
        .chunks(layout.lines_per_page)
        .map(<[String]>::to_vec)
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_replaces_instead_of_dropping() {
        assert_eq!(to_latin1_lossy("Größe €5 — ok"), "Größe ?5 ? ok");
        assert_eq!(to_latin1_lossy("漢字").chars().count(), 2);
    }

    #[test]
    fn widths_follow_helvetica() {
        assert_eq!(text_width(" ", 1000.0), 278.0);
        assert_eq!(text_width("W", 10.0), 9.44);
        assert!(text_width("iii", 7.0) < text_width("mmm", 7.0));
    }

    #[test]
    fn wrap_respects_width() {
        let text = "Die Bilanzsumme der Bank erhöhte sich im Berichtsjahr deutlich. ".repeat(20);
        let width = 200.0;
        for line in wrap_lines(&text, width, 7.0) {
            assert!(text_width(&line, 7.0) <= width, "{line:?}");
        }
    }

    #[test]
    fn hard_breaks_and_blank_lines_are_kept() {
        let lines = wrap_lines("eins\n\nzwei", 500.0, 7.0);
        assert_eq!(lines, vec!["eins", "", "zwei"]);
    }

    #[test]
    fn overlong_word_is_broken() {
        let word = "x".repeat(400);
        let lines = wrap_lines(&word, 100.0, 7.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn a4_default_geometry() {
        let layout = PageLayout::default();
        assert_eq!(layout.lines_per_page, 53);
        assert!((layout.body_width - 190.0 * PT_PER_MM).abs() < 0.01);
        assert!(layout.line_baseline(0) < layout.page_height() - layout.margin());
        assert!(layout.line_baseline(layout.lines_per_page - 1) > layout.footer_baseline());
    }

    #[test]
    fn paginate_overflows_onto_extra_pages() {
        let layout = PageLayout::default();
        let text = vec!["Zeile"; 120].join("\n");
        let pages = paginate(&text, &layout);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 53);
        assert_eq!(pages[2].len(), 120 - 106);
    }

    #[test]
    fn empty_text_is_one_empty_page() {
        let pages = paginate("", &PageLayout::default());
        assert_eq!(pages.len(), 1);
    }
}
