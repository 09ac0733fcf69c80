//! Identity and status shared by all configuration objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a configuration object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Schema,
    ResolverMap,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "schema",
            ObjectKind::ResolverMap => "resolver_map",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of exactly one configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub name: String,
}

impl ObjectRef {
    pub fn schema(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Schema,
            name: name.into(),
        }
    }

    pub fn resolver_map(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::ResolverMap,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Acceptance state reported back onto an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Persisted outcome of the last pass that evaluated an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Status {
    pub state: State,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Status {
    pub fn accepted() -> Self {
        Self {
            state: State::Accepted,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            state: State::Rejected,
            reason: Some(reason.into()),
        }
    }
}

/// Check that an object name is usable as a storage key and URL path segment.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    match name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        Some(c) => Err(format!("name {:?} contains invalid character {:?}", name, c)),
        None if name == "." || name == ".." => Err(format!("name {:?} is reserved", name)),
        None => Ok(()),
    }
}
