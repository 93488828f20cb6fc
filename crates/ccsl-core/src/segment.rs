//! The [`Segment`] unit of renderable content and the wire shape external
//! producers answer with.

use serde::{Deserialize, Serialize};

/// Priority assigned to a segment whose producer left it at zero.
pub const DEFAULT_PRIORITY: i32 = 50;

/// One named, independently produced piece of status text.
///
/// `style` is a symbolic tag (`bold`, `dim`, `red`, ...) or a raw escape
/// prefix. It is resolved by the [`Palette`](crate::render::Palette) at
/// render time; producers never bake styling into `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: String,
    /// `left` | `right`. Carried through but not used for layout yet.
    #[serde(default)]
    pub align: String,
    #[serde(default)]
    pub priority: i32,
    /// Producer-supplied cache lifetime in milliseconds. `0` = use config.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_ttl_ms: i64,
    /// Producer-supplied cache key refinement (e.g. a transcript id).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cache_key: String,
}

impl Segment {
    /// Segment with only `text` set.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cache_ttl_ms(mut self, ttl: i64) -> Self {
        self.cache_ttl_ms = ttl;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    /// An empty segment means "omit this id entirely".
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Structured first-line response from an external producer.
///
/// Mirrors [`Segment`] minus the id, which the scheduler always assigns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginResponse {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub align: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub priority: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub cache_ttl_ms: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cache_key: String,
}

fn is_zero<T: Default + PartialEq>(n: &T) -> bool {
    *n == T::default()
}

impl From<PluginResponse> for Segment {
    fn from(resp: PluginResponse) -> Self {
        Segment {
            id: String::new(),
            text: resp.text,
            style: resp.style,
            align: resp.align,
            priority: resp.priority,
            cache_ttl_ms: resp.cache_ttl_ms,
            cache_key: resp.cache_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let seg = Segment::text("main*")
            .with_style("dim")
            .with_priority(60)
            .with_cache_ttl_ms(300)
            .with_cache_key("abc");
        assert_eq!(seg.text, "main*");
        assert_eq!(seg.style, "dim");
        assert_eq!(seg.priority, 60);
        assert_eq!(seg.cache_ttl_ms, 300);
        assert_eq!(seg.cache_key, "abc");
        assert!(!seg.is_empty());
    }

    #[test]
    fn default_segment_is_empty() {
        assert!(Segment::default().is_empty());
    }

    #[test]
    fn plugin_response_tolerates_missing_fields() {
        let resp: PluginResponse = serde_json::from_str(r#"{"text":"5h 42%"}"#).unwrap();
        let seg = Segment::from(resp);
        assert_eq!(seg.text, "5h 42%");
        assert_eq!(seg.priority, 0);
        assert!(seg.cache_key.is_empty());
    }

    #[test]
    fn zero_fields_are_left_out_when_serialized() {
        let resp = PluginResponse {
            text: "5h 42%".into(),
            priority: 55,
            ..Default::default()
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"text":"5h 42%","priority":55}"#);

        let seg = serde_json::to_value(Segment::text("x")).unwrap();
        assert!(seg.get("cache_ttl_ms").is_none());
        let seg = serde_json::to_value(Segment::text("x").with_cache_ttl_ms(300)).unwrap();
        assert_eq!(seg["cache_ttl_ms"], 300);
    }
}
