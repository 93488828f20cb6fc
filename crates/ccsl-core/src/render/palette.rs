//! Style tags to ANSI SGR sequences.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const ITALIC: &str = "\x1b[3m";
pub const UNDERLINE: &str = "\x1b[4m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const GRAY: &str = "\x1b[90m";

/// Resolves segment styles at render time.
///
/// A style is either a raw escape prefix (anything containing `ESC [`),
/// passed through verbatim, or one or more names joined by spaces or `+`
/// (`"bold+red"`). Unknown names, `normal` and the empty style produce no
/// styling. With ANSI disabled every style resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    ansi: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self { ansi: true }
    }
}

impl Palette {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    /// A palette that never emits escapes.
    pub fn plain() -> Self {
        Self { ansi: false }
    }

    pub fn ansi_enabled(&self) -> bool {
        self.ansi
    }

    /// Escape prefix for `style`; empty when nothing applies.
    pub fn open(&self, style: &str) -> String {
        if !self.ansi {
            return String::new();
        }
        let style = style.trim();
        if style.contains("\x1b[") {
            return style.to_string();
        }
        style
            .split(|c: char| c.is_whitespace() || c == '+')
            .filter_map(named)
            .collect()
    }

    /// `text` wrapped in its style and a reset, or unchanged.
    pub fn paint(&self, style: &str, text: &str) -> String {
        let open = self.open(style);
        if open.is_empty() {
            text.to_string()
        } else {
            format!("{open}{text}{RESET}")
        }
    }
}

fn named(name: &str) -> Option<&'static str> {
    let seq = match name.to_ascii_lowercase().as_str() {
        "bold" => BOLD,
        "dim" => DIM,
        "italic" => ITALIC,
        "underline" => UNDERLINE,
        "red" => RED,
        "green" => GREEN,
        "yellow" => YELLOW,
        "blue" => BLUE,
        "magenta" => MAGENTA,
        "cyan" => CYAN,
        "gray" | "grey" => GRAY,
        _ => return None,
    };
    Some(seq)
}
