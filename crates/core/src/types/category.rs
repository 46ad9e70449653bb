//! Category records as returned by the catalog service.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::CategoryId;

/// A reference to a category as it appears on the wire.
///
/// Depending on the endpoint, the catalog service either sends the bare id
/// or the referenced document with its id embedded (`{"_id": "..."}`).
/// Both shapes normalize to the same [`CategoryId`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// A bare id string.
    Id(String),
    /// An embedded document carrying the id.
    Embedded {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl CategoryRef {
    /// Extract the referenced id.
    ///
    /// Blank ids mean "no reference" and yield `None`.
    #[must_use]
    pub fn into_id(self) -> Option<CategoryId> {
        let raw = match self {
            Self::Id(id) | Self::Embedded { id } => id,
        };
        if raw.trim().is_empty() {
            None
        } else {
            Some(CategoryId::from(raw))
        }
    }
}

/// Deserialize an optional [`CategoryRef`] straight into an optional id.
///
/// Accepts a missing field, `null`, `""`, a bare id, or an embedded object.
///
/// # Errors
///
/// Returns an error if the value is neither a string, an object with an id,
/// nor null.
pub fn deserialize_category_ref<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    let reference = Option::<CategoryRef>::deserialize(deserializer)?;
    Ok(reference.and_then(CategoryRef::into_id))
}

/// A flat category record.
///
/// `parent` is `None` for root categories. Records arrive in arbitrary order
/// and may list a child before its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Unique category id.
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Parent category id, if any.
    #[serde(
        default,
        deserialize_with = "deserialize_category_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<CategoryId>,
    /// Precomputed display path, when the catalog service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl CategoryRecord {
    /// Create a record without a precomputed path.
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        parent: Option<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent,
            path: None,
        }
    }

    /// Whether this record has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
