//! Template parsing and placeholder expansion.
//!
//! A template is literal text with placeholders of the form `{id}` or
//! `{id?prefix=...&suffix=...}`. The query is form-urlencoded (`+` is a
//! space, `%XX` escapes work). Prefix and suffix are spliced around the
//! styled segment text and are not themselves styled. A placeholder whose
//! segment is missing or empty vanishes together with its prefix and
//! suffix. Anything that is not a well-formed placeholder is literal text.

use super::palette::{Palette, RESET};
use crate::segment::Segment;
use std::collections::HashMap;
use std::ops::Range;

/// A parsed `{id?...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub id: &'a str,
    pub prefix: String,
    pub suffix: String,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Placeholder(Placeholder<'a>),
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
}

/// Parse the placeholder body between `{` and `}`.
fn placeholder(body: &str) -> Option<Placeholder<'_>> {
    let (id, query) = match body.split_once('?') {
        Some((id, query)) => (id, Some(query)),
        None => (body, None),
    };
    if id.is_empty() || !id.chars().all(is_id_char) {
        return None;
    }

    let mut prefix = None;
    let mut suffix = None;
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "prefix" if prefix.is_none() => prefix = Some(value.into_owned()),
                "suffix" if suffix.is_none() => suffix = Some(value.into_owned()),
                _ => {}
            }
        }
    }
    Some(Placeholder {
        id,
        prefix: prefix.unwrap_or_default(),
        suffix: suffix.unwrap_or_default(),
    })
}

/// Every well-formed placeholder with the byte range of its `{...}`.
pub fn placeholders(template: &str) -> Vec<(Range<usize>, Placeholder<'_>)> {
    let mut found = Vec::new();
    let mut search = 0;

    while let Some(rel) = template.get(search..).and_then(|s| s.find('{')) {
        let open = search + rel;
        let body_start = open + 1;
        let parsed = template.get(body_start..).and_then(|rest| {
            let close = rest.find('}')?;
            let body = rest.get(..close)?;
            placeholder(body).map(|p| (p, body_start + close + 1))
        });

        match parsed {
            Some((ph, end)) => {
                found.push((open..end, ph));
                search = end;
            }
            None => search = body_start,
        }
    }
    found
}

/// Split a template into literal runs and placeholders, left to right.
pub fn parse(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal_start = 0;

    for (range, ph) in placeholders(template) {
        if range.start > literal_start
            && let Some(lit) = template.get(literal_start..range.start)
        {
            pieces.push(Piece::Literal(lit));
        }
        pieces.push(Piece::Placeholder(ph));
        literal_start = range.end;
    }

    if let Some(lit) = template.get(literal_start..)
        && !lit.is_empty()
    {
        pieces.push(Piece::Literal(lit));
    }
    pieces
}

/// Placeholder ids in first-occurrence order, without duplicates.
pub fn placeholder_ids(template: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for piece in parse(template) {
        if let Piece::Placeholder(ph) = piece
            && !ids.iter().any(|id| id == ph.id)
        {
            ids.push(ph.id.to_string());
        }
    }
    ids
}

/// Where one segment's raw text landed in the expanded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub id: String,
    /// Byte range of the segment text, inside its style wrapper.
    pub range: Range<usize>,
}

/// An expanded line plus the spans of every substituted segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub line: String,
    pub spans: Vec<Span>,
}

/// Substitute `segments` into `template`.
///
/// When several segments share an id the first one wins.
pub fn expand(template: &str, segments: &[Segment], palette: &Palette) -> Expansion {
    let mut by_id: HashMap<&str, &Segment> = HashMap::with_capacity(segments.len());
    for seg in segments.iter().filter(|s| !s.is_empty()) {
        by_id.entry(seg.id.as_str()).or_insert(seg);
    }

    let mut out = Expansion::default();
    for piece in parse(template) {
        match piece {
            Piece::Literal(text) => out.line.push_str(text),
            Piece::Placeholder(ph) => {
                let Some(seg) = by_id.get(ph.id) else {
                    continue;
                };
                let open = palette.open(&seg.style);
                out.line.push_str(&ph.prefix);
                out.line.push_str(&open);
                let start = out.line.len();
                out.line.push_str(&seg.text);
                out.spans.push(Span {
                    id: seg.id.clone(),
                    range: start..out.line.len(),
                });
                if !open.is_empty() {
                    out.line.push_str(RESET);
                }
                out.line.push_str(&ph.suffix);
            }
        }
    }
    out
}
