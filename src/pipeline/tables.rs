//! Ruled-table detection and character filtering.
//!
//! Tables in the source reports are balance sheets and statistics. Their
//! cells come out of text extraction as a soup of numbers that translation
//! can only make worse, so they are dropped.
//!
//! Detection works on the vector paths of a page: every stroked line or
//! rectangle becomes one or more axis-aligned [`Edge`]s, edges that touch
//! (within [`JOIN_TOLERANCE`]) are grouped, and a group with enough
//! horizontal *and* vertical rules to form at least two cells is a table.
//! A character is dropped when its centre falls inside a table region; the
//! same test pdfplumber uses for its `within_bbox` filter.
//!
//! All coordinates are PDF user space: origin bottom-left, y growing up.

/// Maximum thickness (points) for a path to count as a single rule.
pub const RULE_THICKNESS: f32 = 2.0;

/// Gap (points) under which two edges are considered connected.
pub const JOIN_TOLERANCE: f32 = 3.0;

/// Axis-aligned rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left: left.min(right),
            bottom: bottom.min(top),
            right: left.max(right),
            top: bottom.max(top),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }

    /// Half-open containment: left/bottom inclusive, right/top exclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.bottom && y < self.top
    }

    fn expanded(&self, by: f32) -> Rect {
        Rect {
            left: self.left - by,
            bottom: self.bottom - by,
            right: self.right + by,
            top: self.top + by,
        }
    }

    fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || other.right < self.left
            || self.top < other.bottom
            || other.top < self.bottom)
    }

    fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One ruling line derived from a path object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub bounds: Rect,
    pub orientation: Orientation,
}

/// Turn the bounds of one path object into ruling edges.
///
/// A thin path is one rule; a larger path is treated as a rectangle and
/// contributes its four sides. Degenerate dots contribute nothing.
pub fn edges_from_path(bounds: Rect) -> Vec<Edge> {
    let (w, h) = (bounds.width(), bounds.height());
    if w <= RULE_THICKNESS && h <= RULE_THICKNESS {
        return Vec::new();
    }
    if h <= RULE_THICKNESS {
        return vec![Edge {
            bounds,
            orientation: Orientation::Horizontal,
        }];
    }
    if w <= RULE_THICKNESS {
        return vec![Edge {
            bounds,
            orientation: Orientation::Vertical,
        }];
    }
    let Rect {
        left,
        bottom,
        right,
        top,
    } = bounds;
    vec![
        Edge {
            bounds: Rect::new(left, top, right, top),
            orientation: Orientation::Horizontal,
        },
        Edge {
            bounds: Rect::new(left, bottom, right, bottom),
            orientation: Orientation::Horizontal,
        },
        Edge {
            bounds: Rect::new(left, bottom, left, top),
            orientation: Orientation::Vertical,
        },
        Edge {
            bounds: Rect::new(right, bottom, right, top),
            orientation: Orientation::Vertical,
        },
    ]
}

/// Group connected edges and return the bounding box of every table-like group.
pub fn detect_table_regions(edges: &[Edge]) -> Vec<Rect> {
    let n = edges.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        let grown = edges[i].bounds.expanded(JOIN_TOLERANCE);
        for j in (i + 1)..n {
            if grown.intersects(&edges[j].bounds) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[a] = b;
                }
            }
        }
    }

    // (bounds, horizontal count, vertical count) per group root
    let mut groups: Vec<(usize, Rect, usize, usize)> = Vec::new();
    for (i, edge) in edges.iter().enumerate() {
        let root = find(&mut parent, i);
        let idx = match groups.iter().position(|g| g.0 == root) {
            Some(idx) => idx,
            None => {
                groups.push((root, edge.bounds, 0, 0));
                groups.len() - 1
            }
        };
        let entry = &mut groups[idx];
        entry.1 = entry.1.union(&edge.bounds);
        match edge.orientation {
            Orientation::Horizontal => entry.2 += 1,
            Orientation::Vertical => entry.3 += 1,
        }
    }

    groups
        .into_iter()
        .filter(|&(_, _, h, v)| h >= 2 && v >= 2 && h + v >= 5)
        .map(|(_, bounds, _, _)| bounds)
        .collect()
}

/// A character with its position on the page, as handed over by extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedChar {
    pub ch: char,
    /// `None` for characters pdfium synthesises (line breaks, spaces).
    pub bounds: Option<Rect>,
}

/// Rebuild page text without the characters that sit inside `regions`.
///
/// With no regions the text is returned unfiltered.
pub fn filter_table_text(chars: &[PositionedChar], regions: &[Rect]) -> String {
    chars
        .iter()
        .filter(|c| match c.bounds {
            Some(b) if !regions.is_empty() => {
                let (x, y) = b.center();
                !regions.iter().any(|r| r.contains(x, y))
            }
            _ => true,
        })
        .map(|c| c.ch)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(left: f32, right: f32, y: f32) -> Rect {
        Rect::new(left, y - 0.5, right, y + 0.5)
    }

    fn v(x: f32, bottom: f32, top: f32) -> Rect {
        Rect::new(x - 0.5, bottom, x + 0.5, top)
    }

    /// A 2×2 ruled grid spanning (100,100)–(300,200).
    fn grid() -> Vec<Edge> {
        [
            h(100.0, 300.0, 100.0),
            h(100.0, 300.0, 150.0),
            h(100.0, 300.0, 200.0),
            v(100.0, 100.0, 200.0),
            v(200.0, 100.0, 200.0),
            v(300.0, 100.0, 200.0),
        ]
        .into_iter()
        .flat_map(edges_from_path)
        .collect()
    }

    fn positioned(text: &str, x: f32, y: f32) -> Vec<PositionedChar> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| PositionedChar {
                ch,
                bounds: Some(Rect::new(
                    x + i as f32 * 5.0,
                    y,
                    x + i as f32 * 5.0 + 4.0,
                    y + 8.0,
                )),
            })
            .collect()
    }

    #[test]
    fn thin_paths_become_single_rules() {
        assert_eq!(
            edges_from_path(h(0.0, 50.0, 10.0))[0].orientation,
            Orientation::Horizontal
        );
        assert_eq!(
            edges_from_path(v(10.0, 0.0, 50.0))[0].orientation,
            Orientation::Vertical
        );
        assert!(edges_from_path(Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn rectangles_become_four_rules() {
        let edges = edges_from_path(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn ruled_grid_is_a_table() {
        let regions = detect_table_regions(&grid());
        assert_eq!(regions.len(), 1);
        let r = regions[0];
        assert!(r.left <= 100.0 && r.right >= 300.0);
        assert!(r.bottom <= 100.0 && r.top >= 200.0);
    }

    #[test]
    fn single_frame_is_not_a_table() {
        let edges = edges_from_path(Rect::new(20.0, 20.0, 575.0, 822.0));
        assert!(detect_table_regions(&edges).is_empty());
    }

    #[test]
    fn lone_underline_is_not_a_table() {
        let edges = edges_from_path(h(50.0, 250.0, 400.0));
        assert!(detect_table_regions(&edges).is_empty());
    }

    #[test]
    fn filter_drops_chars_inside_tables() {
        let mut chars = positioned("Text", 100.0, 500.0);
        chars.push(PositionedChar {
            ch: '\n',
            bounds: None,
        });
        chars.extend(positioned("1234", 120.0, 120.0));
        let regions = detect_table_regions(&grid());
        assert_eq!(filter_table_text(&chars, &regions), "Text\n");
    }

    #[test]
    fn no_regions_means_unfiltered() {
        let chars = positioned("Bilanz 1978", 120.0, 120.0);
        assert_eq!(filter_table_text(&chars, &[]), "Bilanz 1978");
    }

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(!r.contains(10.0, 5.0));
        assert!(!r.contains(5.0, 10.0));
    }
}
