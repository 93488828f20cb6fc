//! Template rendering: placeholder expansion, styling, and width
//! enforcement.
//!
//! ```
//! use ccsl_core::render::{Palette, render_line};
//! use ccsl_core::Segment;
//!
//! let segs = vec![Segment {
//!     id: "model".into(),
//!     text: "Opus".into(),
//!     priority: 90,
//!     ..Default::default()
//! }];
//! let line = render_line("[{model}]", &segs, &Palette::plain(), 80);
//! assert_eq!(line, "[Opus]");
//! ```

pub mod palette;
pub mod template;
pub mod truncate;
pub mod width;

pub use palette::Palette;
pub use template::{Expansion, Span, expand};
pub use truncate::fit;
pub use width::visible_width;

use crate::segment::Segment;

/// Expand `template` against `segments`, style it, and fit it to `width`
/// visible columns (`0` for unlimited).
pub fn render_line(template: &str, segments: &[Segment], palette: &Palette, width: usize) -> String {
    let expansion = expand(template, segments, palette);
    fit(&expansion, segments, width)
}
