//! Data models for Notion records.
//!
//! This module defines the structures the store deserializes:
//! - `Record` - One page of a database with its property map
//! - `PropertyValue` - The typed value variants a property can hold
//! - `Project`, `Stage`, `Task` - Typed views over records from the
//!   three databases this automation works with
//!
//! Records carry whatever properties the workspace defines; the views
//! read the handful of schema properties the advancement logic needs
//! and ignore the rest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema;

/// One page of a Notion database.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Page id, a dashless or dashed UUID depending on the endpoint.
    pub id: String,

    /// Property name to typed value, as returned by the API.
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// A typed property value on a record.
///
/// Only the property types the advancement logic reads are modeled;
/// everything else deserializes as `Unknown` and is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    Relation { relation: Vec<RelationRef> },
    Checkbox { checkbox: bool },
    Select { select: Option<SelectValue> },
    Number { number: Option<f64> },
    #[serde(other)]
    Unknown,
}

/// One fragment of a rich text value.
#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// One target of a relation property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// The chosen option of a select property.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectValue {
    pub name: String,
}

impl Record {
    /// Text of the named title property, or `None` when the property is
    /// absent, not a title, or empty.
    pub fn title(&self, property: &str) -> Option<&str> {
        match self.properties.get(property) {
            Some(PropertyValue::Title { title }) => {
                title.first().map(|t| t.plain_text.as_str()).filter(|s| !s.is_empty())
            }
            _ => None,
        }
    }

    /// Targets of the named relation property, or `None` when the
    /// property is absent or not a relation.
    pub fn relation(&self, property: &str) -> Option<&[RelationRef]> {
        match self.properties.get(property) {
            Some(PropertyValue::Relation { relation }) => Some(relation),
            _ => None,
        }
    }

    /// Value of the named checkbox property, or `None` when the property
    /// is absent or not a checkbox.
    pub fn checkbox(&self, property: &str) -> Option<bool> {
        match self.properties.get(property) {
            Some(PropertyValue::Checkbox { checkbox }) => Some(*checkbox),
            _ => None,
        }
    }

    /// Label of the named select property, or `None` when the property is
    /// absent, not a select, or has no option chosen.
    pub fn select(&self, property: &str) -> Option<&str> {
        match self.properties.get(property) {
            Some(PropertyValue::Select { select }) => select.as_ref().map(|s| s.name.as_str()),
            _ => None,
        }
    }

    /// Value of the named number property, or `None` when the property is
    /// absent, not a number, or empty.
    pub fn number(&self, property: &str) -> Option<f64> {
        match self.properties.get(property) {
            Some(PropertyValue::Number { number }) => *number,
            _ => None,
        }
    }

    /// First non-empty title among the candidate property names.
    fn first_title(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|property| self.title(property))
    }
}

/// The current-stage pointer of a project, together with the property
/// name it was found under. Updates are written back through the same
/// property so renamed boards keep working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStage {
    /// Property name the pointer was resolved from.
    pub property: String,
    /// Id of the stage record the pointer targets.
    pub stage_id: String,
}

/// A record from the projects database.
#[derive(Debug, Clone, Copy)]
pub struct Project<'a>(pub &'a Record);

impl Project<'_> {
    /// Human-readable name for log output. Falls back to a tail of the
    /// record id when no title property is filled in.
    pub fn display_name(&self) -> String {
        match self.0.first_title(&schema::TITLE_PROPERTIES) {
            Some(name) => name.to_string(),
            None => {
                let id = self.0.id.as_str();
                let tail = id.get(id.len().saturating_sub(8)..).unwrap_or(id);
                format!("Project_{tail}")
            }
        }
    }

    /// Resolve the current-stage pointer.
    ///
    /// The candidate property names are tried in order; a candidate that
    /// is absent, not a relation, or an empty relation is skipped, and
    /// the first one holding at least one target wins. `None` means the
    /// project has no usable pointer at all.
    pub fn current_stage(&self) -> Option<CurrentStage> {
        for property in schema::CURRENT_STAGE_PROPERTIES {
            if let Some(targets) = self.0.relation(property) {
                if let Some(first) = targets.first() {
                    return Some(CurrentStage {
                        property: property.to_string(),
                        stage_id: first.id.clone(),
                    });
                }
            }
        }
        None
    }
}

/// A record from the stages database.
#[derive(Debug, Clone, Copy)]
pub struct Stage<'a>(pub &'a Record);

impl Stage<'_> {
    /// Stage name, when a title property is filled in.
    pub fn name(&self) -> Option<&str> {
        self.0.first_title(&schema::TITLE_PROPERTIES)
    }

    /// Position of the stage within its project.
    pub fn order(&self) -> Option<f64> {
        self.0.number(schema::ORDER_PROPERTY)
    }
}

/// A record from the tasks database.
#[derive(Debug, Clone, Copy)]
pub struct Task<'a>(pub &'a Record);

impl Task<'_> {
    /// Whether the task is marked done.
    ///
    /// A task without the completion checkbox is malformed; the error
    /// carries the record id so the caller can report which task broke
    /// its project.
    pub fn is_done(&self) -> crate::Result<bool> {
        self.0
            .checkbox(schema::DONE_PROPERTY)
            .ok_or_else(|| crate::Error::MissingProperty {
                record: self.0.id.clone(),
                property: schema::DONE_PROPERTY.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, properties: serde_json::Value) -> Record {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn record_deserializes_mixed_properties() {
        let record = self::record(
            "page-1",
            serde_json::json!({
                "Name": {"type": "title", "title": [{"plain_text": "Launch"}]},
                "Этап": {"type": "relation", "relation": [{"id": "stage-1"}]},
                "Выполнена": {"type": "checkbox", "checkbox": true},
                "Статус": {"type": "select", "select": {"name": "Активен"}},
                "Порядок": {"type": "number", "number": 2.0},
                "Deadline": {"type": "date", "date": {"start": "2025-01-01"}},
            }),
        );

        assert_eq!(record.title("Name"), Some("Launch"));
        assert_eq!(record.relation("Этап").map(<[RelationRef]>::len), Some(1));
        assert_eq!(record.checkbox("Выполнена"), Some(true));
        assert_eq!(record.select("Статус"), Some("Активен"));
        assert_eq!(record.number("Порядок"), Some(2.0));
        assert!(matches!(
            record.properties.get("Deadline"),
            Some(PropertyValue::Unknown)
        ));
    }

    #[test]
    fn empty_title_reads_as_none() {
        let record = self::record("page-1", serde_json::json!({"Name": {"type": "title", "title": []}}));
        assert_eq!(record.title("Name"), None);

        let record = self::record(
            "page-2",
            serde_json::json!({"Name": {"type": "title", "title": [{"plain_text": ""}]}}),
        );
        assert_eq!(record.title("Name"), None);
    }

    #[test]
    fn wrong_typed_title_reads_as_none() {
        let record = self::record(
            "page-1",
            serde_json::json!({"Name": {"type": "checkbox", "checkbox": false}}),
        );
        assert_eq!(record.title("Name"), None);
    }

    #[test]
    fn display_name_prefers_title_candidates_in_order() {
        let record = self::record(
            "page-1",
            serde_json::json!({
                "Название": {"type": "title", "title": [{"plain_text": "Запуск"}]},
                "Name": {"type": "title", "title": [{"plain_text": "Launch"}]},
            }),
        );
        assert_eq!(Project(&record).display_name(), "Launch");
    }

    #[test]
    fn display_name_falls_back_to_id_tail() {
        let record = self::record("2334aa74d3bd81dd8e87d07e18195649", serde_json::json!({}));
        assert_eq!(Project(&record).display_name(), "Project_18195649");

        let record = self::record("short", serde_json::json!({}));
        assert_eq!(Project(&record).display_name(), "Project_short");
    }

    #[test]
    fn current_stage_uses_candidate_order() {
        let record = self::record(
            "p-1",
            serde_json::json!({
                "Current stage": {"type": "relation", "relation": [{"id": "stage-en"}]},
                "Текущий этап": {"type": "relation", "relation": [{"id": "stage-ru"}]},
            }),
        );
        let current = Project(&record).current_stage().unwrap();
        assert_eq!(current.property, "Текущий этап");
        assert_eq!(current.stage_id, "stage-ru");
    }

    #[test]
    fn current_stage_skips_empty_relation() {
        let record = self::record(
            "p-1",
            serde_json::json!({
                "Текущий этап": {"type": "relation", "relation": []},
                "Current stage": {"type": "relation", "relation": [{"id": "stage-en"}]},
            }),
        );
        let current = Project(&record).current_stage().unwrap();
        assert_eq!(current.property, "Current stage");
        assert_eq!(current.stage_id, "stage-en");
    }

    #[test]
    fn current_stage_skips_wrong_typed_candidate() {
        let record = self::record(
            "p-1",
            serde_json::json!({
                "Текущий этап": {"type": "select", "select": {"name": "Этап 1"}},
                "Stage": {"type": "relation", "relation": [{"id": "stage-3"}]},
            }),
        );
        let current = Project(&record).current_stage().unwrap();
        assert_eq!(current.property, "Stage");
        assert_eq!(current.stage_id, "stage-3");
    }

    #[test]
    fn current_stage_missing_when_no_candidate_usable() {
        let record = self::record(
            "p-1",
            serde_json::json!({
                "Текущий этап": {"type": "relation", "relation": []},
            }),
        );
        assert_eq!(Project(&record).current_stage(), None);
    }

    #[test]
    fn task_done_reads_checkbox() {
        let record = self::record(
            "t-1",
            serde_json::json!({"Выполнена": {"type": "checkbox", "checkbox": true}}),
        );
        assert!(Task(&record).is_done().unwrap());

        let record = self::record(
            "t-2",
            serde_json::json!({"Выполнена": {"type": "checkbox", "checkbox": false}}),
        );
        assert!(!Task(&record).is_done().unwrap());
    }

    #[test]
    fn task_without_checkbox_is_malformed() {
        let record = self::record("t-1", serde_json::json!({}));
        let err = Task(&record).is_done().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::MissingProperty { ref record, ref property }
                if record == "t-1" && property == "Выполнена"
        ));
    }

    #[test]
    fn task_with_wrong_typed_checkbox_is_malformed() {
        let record = self::record(
            "t-1",
            serde_json::json!({"Выполнена": {"type": "select", "select": {"name": "да"}}}),
        );
        assert!(Task(&record).is_done().is_err());
    }

    #[test]
    fn stage_order_reads_number() {
        let record = self::record(
            "s-1",
            serde_json::json!({"Порядок": {"type": "number", "number": 3.5}}),
        );
        assert_eq!(Stage(&record).order(), Some(3.5));

        let record = self::record(
            "s-2",
            serde_json::json!({"Порядок": {"type": "number", "number": null}}),
        );
        assert_eq!(Stage(&record).order(), None);
    }

    #[test]
    fn empty_select_reads_as_none() {
        let record = self::record(
            "s-1",
            serde_json::json!({"Статус": {"type": "select", "select": null}}),
        );
        assert_eq!(record.select("Статус"), None);
    }
}
