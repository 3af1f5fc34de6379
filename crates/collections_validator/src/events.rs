//! Event channel rendering.
//!
//! Compiled schemas carry channel templates such as
//! `entity:users:{{obj.id}}`. Rendering substitutes `obj.`-prefixed
//! placeholders with values from a record. The delimiters are parameters so
//! callers integrating with a different template stack can pick their own.

use collections_core::{Record, Value};

/// The placeholder delimiters used when rendering channel templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDelimiters {
    pub open: String,
    pub close: String,
}

impl Default for TemplateDelimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl TemplateDelimiters {
    /// Creates delimiters from the given pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Renders a channel template against a record.
///
/// Placeholders reference the record as `obj`, with dots descending into
/// embedded objects (`{{obj.author.id}}`). A placeholder that resolves to
/// nothing renders as the empty string. Text outside placeholders is copied
/// through untouched.
pub fn render_channel(template: &str, record: &Record, delimiters: &TemplateDelimiters) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(&delimiters.open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + delimiters.open.len()..];
        match after_open.find(&delimiters.close) {
            Some(end) => {
                out.push_str(&resolve(after_open[..end].trim(), record));
                rest = &after_open[end + delimiters.close.len()..];
            }
            None => {
                // Unterminated placeholder, copied through verbatim.
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolves an `obj.`-prefixed dotted path against the record.
fn resolve(placeholder: &str, record: &Record) -> String {
    let Some(path) = placeholder.strip_prefix("obj.") else {
        return String::new();
    };

    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();
    let mut current = match record.get(head) {
        Some(value) => value,
        None => return String::new(),
    };
    for segment in segments {
        current = match current {
            Value::Object(fields) => match fields.get(segment) {
                Some(value) => value,
                None => return String::new(),
            },
            _ => return String::new(),
        };
    }
    current.render()
}
