//! Priority-aware width enforcement.

use super::palette::RESET;
use super::template::Expansion;
use super::width::{has_escape, truncate_at_word, truncate_visible, visible_width};
use crate::segment::Segment;

const ELLIPSIS: &str = "...";

/// Smallest budget a segment may be shrunk into (one column plus `...`).
const MIN_SHRINK_BUDGET: usize = 4;

/// Fit an expanded line into `width` visible columns.
///
/// - `width == 0` means unlimited.
/// - A line already within budget is returned unchanged.
/// - `width <= 3` yields `width` dots.
/// - Otherwise the lowest-priority segment that made it into the line
///   (first such segment in `segments` order) is shrunk with an ellipsis;
///   if that cannot make the line fit, the whole line is hard-cut to
///   `width - 3` columns plus `...`.
pub fn fit(expansion: &Expansion, segments: &[Segment], width: usize) -> String {
    let line = expansion.line.as_str();
    if width == 0 {
        return line.to_string();
    }
    let total = visible_width(line);
    if total <= width {
        return line.to_string();
    }
    if width <= ELLIPSIS.len() {
        return ".".repeat(width);
    }

    if let Some(shrunk) = shrink_lowest(expansion, segments, total, width) {
        return shrunk;
    }
    hard_cut(line, width)
}

/// Try to fit by shrinking the lowest-priority contributing segment.
fn shrink_lowest(
    expansion: &Expansion,
    segments: &[Segment],
    total: usize,
    width: usize,
) -> Option<String> {
    let candidate = segments
        .iter()
        .filter(|s| !s.is_empty() && expansion.spans.iter().any(|sp| sp.id == s.id))
        .min_by_key(|s| s.priority)?;

    // The last occurrence is the one nearest the overflow.
    let span = expansion.spans.iter().rev().find(|sp| sp.id == candidate.id)?;
    let line = expansion.line.as_str();
    let before = line.get(..span.range.start)?;
    let text = line.get(span.range.clone())?;
    let after = line.get(span.range.end..)?;

    let rest = total - visible_width(text);
    let budget = width.checked_sub(rest)?;
    if budget < MIN_SHRINK_BUDGET {
        return None;
    }

    let cut = truncate_at_word(text, budget - ELLIPSIS.len());
    let mut out = String::with_capacity(line.len());
    out.push_str(before);
    out.push_str(&cut.text);
    if cut.saw_escape {
        out.push_str(RESET);
    }
    out.push_str(ELLIPSIS);
    out.push_str(after);

    (visible_width(&out) <= width).then_some(out)
}

/// Cut the whole line to `width - 3` columns and append `...`.
fn hard_cut(line: &str, width: usize) -> String {
    let cut = truncate_visible(line, width - ELLIPSIS.len());
    let mut out = cut.text;
    if cut.saw_escape || has_escape(&out) {
        out.push_str(RESET);
    }
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::Palette;
    use crate::render::template::expand;

    fn seg(id: &str, text: &str, priority: i32) -> Segment {
        Segment {
            id: id.into(),
            text: text.into(),
            priority,
            ..Default::default()
        }
    }

    fn render(template: &str, segs: &[Segment], width: usize) -> String {
        fit(&expand(template, segs, &Palette::plain()), segs, width)
    }

    #[test]
    fn zero_width_is_unlimited() {
        let segs = [seg("a", &"x".repeat(500), 50)];
        assert_eq!(render("{a}", &segs, 0).len(), 500);
    }

    #[test]
    fn tiny_widths_are_all_dots() {
        let segs = [seg("a", "abcdef", 50)];
        assert_eq!(render("{a}", &segs, 1), ".");
        assert_eq!(render("{a}", &segs, 3), "...");
    }

    #[test]
    fn shrinks_lowest_priority_segment() {
        let segs = [
            seg("model", "Opus", 90),
            seg("prompt", "please refactor the parser module", 20),
        ];
        let out = render("{model} {prompt}", &segs, 24);
        assert!(out.starts_with("Opus "));
        assert!(out.ends_with("..."));
        assert!(visible_width(&out) <= 24);
    }

    #[test]
    fn ties_go_to_first_in_segment_order() {
        let segs = [seg("b", "bbbbbbbbbb", 10), seg("a", "aaaaaaaaaa", 10)];
        // `b` comes first in the slice even though `a` comes first in the line.
        let out = render("{a} {b}", &segs, 16);
        assert_eq!(out, "aaaaaaaaaa bb...");
    }

    #[test]
    fn repeated_text_shrinks_the_right_occurrence() {
        let segs = [seg("cwd", "main", 90), seg("git", "main-feature-branch", 10)];
        let out = render("{cwd} {git}", &segs, 12);
        assert!(out.starts_with("main main"));
        assert_eq!(visible_width(&out), 12);
    }

    #[test]
    fn hard_cut_preserves_escapes_and_resets() {
        let mut s = seg("a", "abcdefghijklmnop", 50);
        s.style = "red".into();
        let segs = [s];
        let exp = expand("{a}{a}", &segs, &Palette::default());
        // Budget after removing one copy is zero, so hard-cut.
        let out = fit(&exp, &segs, 10);
        assert!(out.starts_with("\x1b[31mabcdefg"));
        assert!(out.ends_with(&format!("{RESET}...")));
        assert_eq!(visible_width(&out), 10);
    }

    #[test]
    fn no_segments_falls_back_to_hard_cut() {
        assert_eq!(render("literal text only", &[], 10), "literal...");
    }
}
