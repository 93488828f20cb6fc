//! The `only_if` predicate language.
//!
//! Four forms are understood:
//!
//! | Expression | True when |
//! |------------|-----------|
//! | `has(a.b)` | the path resolves, whatever its value |
//! | `eq(a.b, "v")` | the path resolves and its text equals `v` |
//! | `ne(a.b, "v")` | the path resolves and its text differs from `v` |
//! | `a.b` | the path resolves and its text is not `""`, `"0"` or `"false"` |
//!
//! A missing path never satisfies `eq` *or* `ne`. Anything that does not
//! parse evaluates to `false`: a broken condition skips its producer rather
//! than failing the collection.

use crate::context;
use serde_json::Value;

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Has(String),
    Eq(String, String),
    Ne(String, String),
    Truthy(String),
}

impl Condition {
    /// Parse an expression. Returns `None` for malformed input.
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }

        let Some(open) = expr.find('(') else {
            return valid_path(expr).then(|| Condition::Truthy(expr.to_string()));
        };
        let inner = expr.get(open + 1..)?.strip_suffix(')')?;
        let name = expr.get(..open)?.trim();

        match name {
            "has" => {
                let path = inner.trim();
                valid_path(path).then(|| Condition::Has(path.to_string()))
            }
            "eq" | "ne" => {
                let (path, literal) = inner.split_once(',')?;
                let path = path.trim();
                if !valid_path(path) {
                    return None;
                }
                let literal = trim_quotes(literal.trim()).to_string();
                Some(if name == "eq" {
                    Condition::Eq(path.to_string(), literal)
                } else {
                    Condition::Ne(path.to_string(), literal)
                })
            }
            _ => None,
        }
    }

    /// Evaluate against the context tree.
    pub fn matches(&self, root: &Value) -> bool {
        match self {
            Condition::Has(path) => context::lookup(root, path).is_some(),
            Condition::Eq(path, want) => {
                context::lookup(root, path).is_some_and(|v| context::stringify(v) == *want)
            }
            Condition::Ne(path, want) => {
                context::lookup(root, path).is_some_and(|v| context::stringify(v) != *want)
            }
            Condition::Truthy(path) => context::lookup(root, path).is_some_and(|v| {
                let s = context::stringify(v);
                !matches!(s.as_str(), "" | "0" | "false")
            }),
        }
    }
}

/// Evaluate `expr` against `root`, failing closed on malformed input.
pub fn evaluate(root: &Value, expr: &str) -> bool {
    match Condition::parse(expr) {
        Some(cond) => cond.matches(root),
        None => {
            tracing::debug!("Malformed only_if expression {expr:?}; skipping producer");
            false
        }
    }
}

fn valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|seg| {
            !seg.is_empty()
                && !seg
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '"' | '\''))
        })
}

fn trim_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        json!({
            "workspace": {"mode": "dev", "current_dir": "/tmp"},
            "cost": {"total_cost_usd": 0, "lines": 12},
            "flags": {"on": true, "off": false, "empty": "", "nil": null}
        })
    }

    #[test]
    fn eq_mismatch_skips() {
        assert!(!evaluate(&ctx(), r#"eq(workspace.mode, "ci")"#));
        assert!(evaluate(&ctx(), r#"eq(workspace.mode, "dev")"#));
    }

    #[test]
    fn eq_accepts_unquoted_and_single_quoted_literals() {
        assert!(evaluate(&ctx(), "eq(cost.lines, 12)"));
        assert!(evaluate(&ctx(), "eq(workspace.mode,'dev')"));
        assert!(evaluate(&ctx(), "eq(flags.on, true)"));
    }

    #[test]
    fn ne_compares_text() {
        assert!(evaluate(&ctx(), r#"ne(workspace.mode, "ci")"#));
        assert!(!evaluate(&ctx(), r#"ne(workspace.mode, "dev")"#));
    }

    #[test]
    fn missing_path_fails_both_eq_and_ne() {
        assert!(!evaluate(&ctx(), r#"eq(workspace.branch, "x")"#));
        assert!(!evaluate(&ctx(), r#"ne(workspace.branch, "x")"#));
    }

    #[test]
    fn has_accepts_falsy_values() {
        assert!(evaluate(&ctx(), "has(flags.off)"));
        assert!(evaluate(&ctx(), "has(flags.nil)"));
        assert!(!evaluate(&ctx(), "has(flags.missing)"));
    }

    #[test]
    fn bare_path_is_truthiness() {
        assert!(evaluate(&ctx(), "flags.on"));
        assert!(evaluate(&ctx(), "workspace.mode"));
        assert!(!evaluate(&ctx(), "flags.off"));
        assert!(!evaluate(&ctx(), "flags.empty"));
        assert!(!evaluate(&ctx(), "flags.nil"));
        assert!(!evaluate(&ctx(), "cost.total_cost_usd"));
        assert!(!evaluate(&ctx(), "flags.missing"));
    }

    #[test]
    fn whole_float_fields_compare_like_integers() {
        let root = json!({"cost": {"total_cost_usd": 0.0, "n": 1.0, "spent": 0.42}});
        assert!(!evaluate(&root, "cost.total_cost_usd"));
        assert!(evaluate(&root, "cost.spent"));
        assert!(evaluate(&root, "eq(cost.n, 1)"));
        assert!(!evaluate(&root, "ne(cost.n, 1)"));
        assert!(evaluate(&root, "eq(cost.total_cost_usd, 0)"));
    }

    #[test]
    fn null_stringifies_to_empty_for_eq() {
        assert!(evaluate(&ctx(), r#"eq(flags.nil, "")"#));
    }

    #[test]
    fn malformed_expressions_fail_closed() {
        for expr in [
            "",
            "   ",
            "has(",
            "has()",
            "eq(workspace.mode)",
            "eq(, \"dev\")",
            "exists(workspace.mode)",
            "workspace mode",
            "workspace..mode",
            "has(workspace.mode",
        ] {
            assert!(!evaluate(&ctx(), expr), "expected {expr:?} to fail closed");
        }
    }

    #[test]
    fn parse_shapes() {
        assert_eq!(
            Condition::parse(r#" eq( a.b , "x,y" ) "#),
            Some(Condition::Eq("a.b".into(), "x,y".into()))
        );
        assert_eq!(
            Condition::parse("has(a)"),
            Some(Condition::Has("a".into()))
        );
        assert_eq!(
            Condition::parse("a.b"),
            Some(Condition::Truthy("a.b".into()))
        );
    }

    #[test]
    fn non_object_context_resolves_nothing() {
        assert!(!evaluate(&Value::Null, "has(a)"));
        assert!(!evaluate(&json!([1, 2]), "a"));
    }
}
