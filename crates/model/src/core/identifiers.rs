use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

/// A dot-separated table name such as `iceberg.default.events_streaming`.
///
/// Every part is validated on construction, so a `QualifiedName` can be
/// spliced into a statement (after dialect quoting) without further checks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    parts: Arc<[String]>,
}

impl QualifiedName {
    pub const MAX_PARTS: usize = 3;

    pub fn new(name: impl AsRef<str>) -> Result<Self, ModelError> {
        name.as_ref().parse()
    }

    /// Builds `<catalog>.<schema>.<table>` from separately supplied parts.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        let joined = parts.join(".");
        if parts.is_empty() || parts.len() > Self::MAX_PARTS {
            return Err(ModelError::InvalidIdentifier(joined));
        }
        if !parts.iter().all(|p| is_identifier(p)) {
            return Err(ModelError::InvalidIdentifier(joined));
        }
        Ok(Self {
            parts: Arc::from(parts),
        })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The unqualified last part, i.e. the table or topic itself.
    pub fn object(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

impl FromStr for QualifiedName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parts(s.trim().split('.'))
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
