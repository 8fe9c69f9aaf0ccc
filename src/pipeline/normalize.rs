//! Page text normalisation: page-number detection and paragraph rebuilding.
//!
//! PDF text extraction hands back one string per page in which every visual
//! line ends with a line break, whether it closes a paragraph or is just the
//! right margin wrapping a sentence. Translation works far better on whole
//! paragraphs, so this stage rebuilds them:
//!
//! ```text
//! "13\nDie Bank hat im\nJahr 1978.\nDer Umsatz"
//!   │
//!   ├─ first line "13" is numeric  → page number 13, line dropped
//!   ├─ "Die Bank hat im"           → wrap artifact, joined
//!   ├─ "Jahr 1978."                → paragraph end, followed by "\n\n"
//!   └─ "Der Umsatz"                → last line, emitted as-is
//!
//! "Die Bank hat imJahr 1978.\n\nDer Umsatz"
//! ```
//!
//! Wrap artifacts are joined with no intervening character; the source PDFs
//! this targets usually keep the trailing space on wrapped lines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The source page number carried from page to page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageNumber {
    /// A numeric page number, printed on the page or inferred from the last one.
    Known(u64),
    /// No numeric page number has been observed yet.
    #[default]
    Unknown,
}

impl PageNumber {
    /// The page number the next page is assumed to carry when it prints none.
    pub fn successor(self) -> Self {
        match self {
            PageNumber::Known(n) => PageNumber::Known(n.saturating_add(1)),
            PageNumber::Unknown => PageNumber::Unknown,
        }
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageNumber::Known(n) => write!(f, "{n}"),
            PageNumber::Unknown => f.write_str("?"),
        }
    }
}

/// Output of [`normalize`] for a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPage {
    /// Cleaned text: wrap artifacts joined, paragraphs separated by `"\n\n"`.
    pub text: String,
    /// Page number after this page has been seen.
    pub page_number: PageNumber,
}

/// One raw line tagged with whether it closes a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub text: &'a str,
    pub is_paragraph_end: bool,
}

/// Normalise one extracted page.
///
/// An empty (or whitespace-only) page yields an empty string and leaves
/// `prior` untouched; such pages must never be sent to translation.
pub fn normalize(raw: &str, prior: PageNumber) -> NormalizedPage {
    if raw.trim().is_empty() {
        return NormalizedPage {
            text: String::new(),
            page_number: prior,
        };
    }

    let (body, page_number) = match split_page_number(raw) {
        Some((number, rest)) => (rest, PageNumber::Known(number)),
        None => (raw, prior.successor()),
    };

    NormalizedPage {
        text: rebuild_paragraphs(body),
        page_number,
    }
}

/// If the first line is purely numeric, return it and the remaining text.
///
/// The remaining text starts after the first line break. A page without any
/// line break is tested as a whole.
fn split_page_number(raw: &str) -> Option<(u64, &str)> {
    let (first, rest) = match raw.find('\n') {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };
    let candidate = first.trim();
    if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    candidate.parse::<u64>().ok().map(|n| (n, rest))
}

/// Tag every line with whether the break after it is a paragraph boundary.
///
/// A break is a paragraph boundary when the line ends in a period, optionally
/// followed by one space. The final line has no break after it and is never
/// tagged.
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine<'_>> {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| ClassifiedLine {
            text: line,
            is_paragraph_end: i < last && (line.ends_with('.') || line.ends_with(". ")),
        })
        .collect()
}

/// Join wrap artifacts and turn paragraph boundaries into `".\n\n"`.
pub fn rebuild_paragraphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for line in classify_lines(text) {
        if line.is_paragraph_end {
            out.push_str(line.text.strip_suffix(' ').unwrap_or(line.text));
            out.push_str("\n\n");
        } else {
            out.push_str(line.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_first_line_becomes_page_number() {
        let page = normalize("13\ndes Produktionspotentials anzusehen.", PageNumber::Unknown);
        assert_eq!(page.page_number, PageNumber::Known(13));
        assert_eq!(page.text, "des Produktionspotentials anzusehen.");
    }

    #[test]
    fn page_number_with_surrounding_spaces() {
        let page = normalize(" 42 \nText", PageNumber::Known(3));
        assert_eq!(page.page_number, PageNumber::Known(42));
        assert_eq!(page.text, "Text");
    }

    #[test]
    fn missing_page_number_counts_forward() {
        let page = normalize("Kapitel II\nText", PageNumber::Known(13));
        assert_eq!(page.page_number, PageNumber::Known(14));
        assert_eq!(page.text, "Kapitel IIText");
    }

    #[test]
    fn unknown_page_number_stays_unknown() {
        let page = normalize("Vorwort\nText", PageNumber::Unknown);
        assert_eq!(page.page_number, PageNumber::Unknown);
    }

    #[test]
    fn empty_page_passes_prior_through() {
        let page = normalize("", PageNumber::Known(9));
        assert_eq!(page.text, "");
        assert_eq!(page.page_number, PageNumber::Known(9));

        let blank = normalize(" \n \n", PageNumber::Unknown);
        assert_eq!(blank.text, "");
        assert_eq!(blank.page_number, PageNumber::Unknown);
    }

    #[test]
    fn page_consisting_only_of_a_number() {
        let page = normalize("17", PageNumber::Unknown);
        assert_eq!(page.page_number, PageNumber::Known(17));
        assert_eq!(page.text, "");
    }

    #[test]
    fn mixed_first_line_is_not_a_page_number() {
        let page = normalize("1978 Bericht\nText", PageNumber::Unknown);
        assert_eq!(page.page_number, PageNumber::Unknown);
        assert_eq!(page.text, "1978 BerichtText");
    }

    #[test]
    fn paragraph_breaks_are_rebuilt() {
        let text = "Die Bank hat im \nJahr 1978.\nDer Umsatz stieg. \nEnde";
        assert_eq!(
            rebuild_paragraphs(text),
            "Die Bank hat im Jahr 1978.\n\nDer Umsatz stieg.\n\nEnde"
        );
    }

    #[test]
    fn existing_blank_lines_do_not_multiply() {
        assert_eq!(rebuild_paragraphs("Satz.\n\nNeu"), "Satz.\n\nNeu");
    }

    #[test]
    fn trailing_period_on_last_line_gets_no_break() {
        assert_eq!(rebuild_paragraphs("Eins\nZwei."), "EinsZwei.");
    }

    #[test]
    fn classify_marks_only_period_lines() {
        let lines = classify_lines("a.\nb\nc. \nd.");
        let tags: Vec<bool> = lines.iter().map(|l| l.is_paragraph_end).collect();
        assert_eq!(tags, vec![true, false, true, false]);
    }

    #[test]
    fn marker_like_text_is_left_alone() {
        // Text that happens to look like a substitution marker must survive.
        let text = "Kosten ****\nweiter.";
        assert_eq!(rebuild_paragraphs(text), "Kosten ****weiter.");
    }

    #[test]
    fn page_number_display() {
        assert_eq!(PageNumber::Known(5).to_string(), "5");
        assert_eq!(PageNumber::Unknown.to_string(), "?");
    }

    proptest! {
        #[test]
        fn text_without_breaks_is_unchanged(s in "[^\n]{0,200}") {
            prop_assert_eq!(rebuild_paragraphs(&s), s);
        }

        #[test]
        fn paragraph_count_matches_period_lines(
            lines in proptest::collection::vec("[a-z ]{1,20}\\.?", 1..20)
        ) {
            let text = lines.join("\n");
            let ends = classify_lines(&text).iter().filter(|l| l.is_paragraph_end).count();
            let rebuilt = rebuild_paragraphs(&text);
            prop_assert_eq!(rebuilt.matches("\n\n").count(), ends);
            prop_assert!(!rebuilt.replace("\n\n", "").contains('\n'));
        }
    }
}
