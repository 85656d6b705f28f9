//! Record store abstraction and the Notion-backed implementation.
//!
//! The advancement engine talks to a [`RecordStore`] trait so tests can
//! swap in an in-memory store; production uses [`NotionStore`].

pub mod notion;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Record, RelationRef};

pub use notion::NotionStore;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid or expired token: the store returned 401 Unauthorized")]
    Unauthorized,

    #[error("API error (HTTP {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Failed to parse store response: {0}")]
    Parse(String),
}

/// Backend-agnostic access to the record databases.
pub trait RecordStore {
    /// Fetch the records of a database matching `query`.
    fn query(&self, database_id: &str, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Apply a property patch to one record.
    fn update(&self, record_id: &str, patch: &PropertyPatch) -> Result<(), StoreError>;
}

/// A database query: an optional relation filter plus sort directives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) filter: Option<Filter>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) sorts: Vec<Sort>,
}

impl Query {
    /// Match every record in the database.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep only records whose relation `property` contains `id`.
    pub fn relation_contains(mut self, property: &str, id: &str) -> Self {
        self.filter = Some(Filter {
            property: property.to_string(),
            relation: RelationFilter {
                contains: id.to_string(),
            },
        });
        self
    }

    /// Sort results by `property`, smallest first.
    pub fn ascending(mut self, property: &str) -> Self {
        self.sorts.push(Sort {
            property: property.to_string(),
            direction: SortDirection::Ascending,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Filter {
    pub(crate) property: String,
    pub(crate) relation: RelationFilter,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RelationFilter {
    pub(crate) contains: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Sort {
    pub(crate) property: String,
    pub(crate) direction: SortDirection,
}

/// Sort direction of a query sort directive.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A set of property writes applied to one record in a single update.
///
/// Keys are property names; the map form matches the wire format of the
/// update endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PropertyPatch {
    properties: BTreeMap<String, PropertyWrite>,
}

impl PropertyPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the relation `property` at a single target record.
    pub fn relation(mut self, property: &str, target_id: &str) -> Self {
        self.properties.insert(
            property.to_string(),
            PropertyWrite::Relation {
                relation: vec![RelationRef {
                    id: target_id.to_string(),
                }],
            },
        );
        self
    }

    /// Set the select `property` to the option named `label`.
    pub fn select(mut self, property: &str, label: &str) -> Self {
        self.properties.insert(
            property.to_string(),
            PropertyWrite::Select {
                select: SelectName {
                    name: label.to_string(),
                },
            },
        );
        self
    }

    /// Set the checkbox `property`.
    pub fn checkbox(mut self, property: &str, value: bool) -> Self {
        self.properties
            .insert(property.to_string(), PropertyWrite::Checkbox { checkbox: value });
        self
    }

    /// Replace the title `property` with a single plain-text fragment.
    pub fn title(mut self, property: &str, text: &str) -> Self {
        self.properties.insert(
            property.to_string(),
            PropertyWrite::Title {
                title: vec![TitleWrite {
                    text: TextContent {
                        content: text.to_string(),
                    },
                }],
            },
        );
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum PropertyWrite {
    Relation { relation: Vec<RelationRef> },
    Select { select: SelectName },
    Checkbox { checkbox: bool },
    Title { title: Vec<TitleWrite> },
}

#[derive(Debug, Clone, Serialize)]
struct SelectName {
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct TitleWrite {
    text: TextContent,
}

#[derive(Debug, Clone, Serialize)]
struct TextContent {
    content: String,
}
