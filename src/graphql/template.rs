//! Placeholder templates used by template and upstream resolvers.
//!
//! Syntax is plain text with `{{ path }}` placeholders, where `path` is a
//! dotted selector such as `parent.id` or `args.limit`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed placeholder at byte {0}")]
    Unclosed(usize),

    #[error("empty placeholder at byte {0}")]
    Empty(usize),

    #[error("invalid placeholder {0:?}")]
    InvalidPath(String),
}

/// A validated template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    placeholders: Vec<String>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut placeholders = Vec::new();
        let mut offset = 0;
        while let Some(start) = source[offset..].find("{{") {
            let open = offset + start;
            let body_start = open + 2;
            let close = source[body_start..]
                .find("}}")
                .map(|i| body_start + i)
                .ok_or(TemplateError::Unclosed(open))?;
            let path = source[body_start..close].trim();
            if path.is_empty() {
                return Err(TemplateError::Empty(open));
            }
            let valid = path.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
            if !valid {
                return Err(TemplateError::InvalidPath(path.to_string()));
            }
            placeholders.push(path.to_string());
            offset = close + 2;
        }
        Ok(Self {
            source: source.to_string(),
            placeholders,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder paths in order of appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }
}
