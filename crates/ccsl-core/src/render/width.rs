//! Visible-width measurement and cutting over text that may carry ANSI
//! escape sequences.
//!
//! Escapes occupy zero columns and are never split. Characters are measured
//! with `unicode-width`, so wide glyphs count as two columns and combining
//! marks as zero. Cuts always land on a char boundary.

use unicode_width::UnicodeWidthChar;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// A lexical unit of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// A complete escape sequence (or a lone ESC).
    Escape(&'a str),
    Char(char),
}

/// Iterator over `(byte offset, token)` pairs.
pub(crate) struct Tokens<'a> {
    s: &'a str,
    pos: usize,
}

pub(crate) fn tokens(s: &str) -> Tokens<'_> {
    Tokens { s, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.s.get(self.pos..)?;
        let ch = rest.chars().next()?;
        let start = self.pos;
        if ch != '\x1b' {
            self.pos += ch.len_utf8();
            return Some((start, Token::Char(ch)));
        }
        let len = escape_len(rest.as_bytes());
        self.pos += len;
        rest.get(..len).map(|esc| (start, Token::Escape(esc)))
    }
}

/// Length in bytes of the escape sequence at the start of `b` (`b[0]` is
/// ESC). Every returned length ends on an ASCII byte or at the end of input,
/// so it is always a char boundary.
fn escape_len(b: &[u8]) -> usize {
    match b.get(1) {
        // CSI: parameters 0x30-0x3F, intermediates 0x20-0x2F, final 0x40-0x7E.
        Some(b'[') => {
            let mut i = 2;
            while let Some(&c) = b.get(i) {
                if (0x40..=0x7e).contains(&c) {
                    return i + 1;
                }
                if !(0x20..=0x3f).contains(&c) {
                    return i;
                }
                i += 1;
            }
            i
        }
        // OSC: terminated by BEL or ST (ESC \).
        Some(b']') => {
            let mut i = 2;
            while let Some(&c) = b.get(i) {
                if c == BEL {
                    return i + 1;
                }
                if c == ESC && b.get(i + 1) == Some(&b'\\') {
                    return i + 2;
                }
                i += 1;
            }
            i
        }
        Some(&c) if (0x20..=0x7e).contains(&c) => 2,
        _ => 1,
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Display columns of `s`, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    tokens(s)
        .map(|(_, tok)| match tok {
            Token::Char(ch) => char_width(ch),
            Token::Escape(_) => 0,
        })
        .sum()
}

/// Whether `s` contains any escape sequence.
pub fn has_escape(s: &str) -> bool {
    s.as_bytes().contains(&ESC)
}

/// Result of cutting a line to a column budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut {
    /// The kept prefix, escapes included.
    pub text: String,
    /// Visible width of `text`.
    pub width: usize,
    /// At least one escape sequence was kept.
    pub saw_escape: bool,
    /// Something visible was dropped.
    pub truncated: bool,
}

/// Keep the longest prefix of `s` whose visible width fits in `max`.
///
/// Escapes before the cut point are kept whole. A wide character that would
/// straddle the limit is dropped entirely.
pub fn truncate_visible(s: &str, max: usize) -> Cut {
    let mut cut = Cut {
        text: String::with_capacity(s.len()),
        width: 0,
        saw_escape: false,
        truncated: false,
    };
    for (_, tok) in tokens(s) {
        match tok {
            Token::Escape(esc) => {
                cut.text.push_str(esc);
                cut.saw_escape = true;
            }
            Token::Char(ch) => {
                let w = char_width(ch);
                if cut.width + w > max {
                    cut.truncated = true;
                    break;
                }
                cut.text.push(ch);
                cut.width += w;
            }
        }
    }
    cut
}

/// Like [`truncate_visible`], but backs up to the last whitespace when it
/// sits at or past two thirds of `max`, so words are not chopped in half.
pub fn truncate_at_word(s: &str, max: usize) -> Cut {
    let cut = truncate_visible(s, max);
    if !cut.truncated {
        return cut;
    }

    let mut width = 0;
    let mut last_space = None;
    for (offset, tok) in tokens(&cut.text) {
        if let Token::Char(ch) = tok {
            if ch.is_whitespace() {
                last_space = Some((offset, width));
            }
            width += char_width(ch);
        }
    }

    match last_space {
        Some((offset, before)) if before > 0 && before * 3 >= max * 2 => {
            let kept = cut.text.get(..offset).unwrap_or_default().trim_end();
            Cut {
                text: kept.to_string(),
                width: visible_width(kept),
                saw_escape: has_escape(kept),
                truncated: true,
            }
        }
        _ => cut,
    }
}
