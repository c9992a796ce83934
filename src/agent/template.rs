//! Template engine for variable substitution.
//!
//! This module provides a simple template engine that performs `{{variable}}`
//! substitution in strings. It is used for:
//!
//! - Template-backed agents (rendering the manifest's template text)
//! - The `show` command (listing the placeholders a template references)
//!
//! # Syntax
//!
//! - `{{name}}` - Substitutes the value of variable `name`
//! - `{{ name }}` - Whitespace inside the braces is tolerated
//! - Single braces are literal text; nested placeholders are not supported
//!
//! # Error Handling
//!
//! The engine is fail-safe: undefined variables cause an error rather than
//! silent substitution with empty strings. A rendered string never contains
//! unresolved placeholder syntax.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Matches identifier-like placeholder names for extraction.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.-]*)\s*\}\}").expect("Invalid placeholder regex")
});

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A variable was referenced but not provided.
    UndefinedVariable {
        /// The name of the undefined variable.
        name: String,
        /// The byte offset of the opening `{{` in the template.
        position: usize,
    },
    /// A `{{` was found without a matching `}}`.
    Unterminated {
        /// The byte offset of the unterminated `{{`.
        position: usize,
    },
    /// An empty placeholder was found (e.g., `{{}}` or `{{ }}`).
    EmptyPlaceholder {
        /// The byte offset of the empty placeholder.
        position: usize,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { name, position } => {
                write!(
                    f,
                    "undefined variable '{}' at offset {} in template",
                    name, position
                )
            }
            TemplateError::Unterminated { position } => {
                write!(f, "unterminated '{{{{' at offset {} in template", position)
            }
            TemplateError::EmptyPlaceholder { position } => {
                write!(f, "empty placeholder at offset {} in template", position)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Render a template string by substituting variables.
///
/// # Arguments
///
/// * `template` - The template string containing `{{variable}}` placeholders
/// * `variables` - A map of variable names to their values
///
/// # Returns
///
/// * `Ok(String)` - The rendered string with all placeholders substituted
/// * `Err(TemplateError)` - If a variable is undefined or syntax is invalid
///
/// Pure function: no side effects, no shared mutable state, safe to call
/// concurrently.
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let position = offset + open;
        let after = &rest[open + 2..];

        let Some(close) = after.find("}}") else {
            return Err(TemplateError::Unterminated { position });
        };

        let name = after[..close].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { position });
        }

        match variables.get(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(TemplateError::UndefinedVariable {
                    name: name.to_string(),
                    position,
                });
            }
        }

        let consumed = open + 2 + close + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Extract the placeholder names referenced by a template.
///
/// Returns names in first-occurrence order, deduplicated. Only
/// identifier-like names are recognized; this is a display and validation
/// aid, not the rendering path.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in PLACEHOLDER_RE.captures_iter(template) {
        let name = cap[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Helper to create a variables map from a list of key-value pairs.
#[allow(dead_code)]
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
