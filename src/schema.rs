//! Property names and status labels of the target workspace.
//!
//! The workspace started from a Russian-language template and some boards
//! were later renamed in English, so the current-stage pointer is looked up
//! under several candidate names. Relation and checkbox properties kept
//! their original names across all boards.

/// Candidate names for the project property that points at the current
/// stage, in lookup order.
pub const CURRENT_STAGE_PROPERTIES: [&str; 3] = ["Текущий этап", "Current stage", "Stage"];

/// Candidate names for the title property of projects and stages.
pub const TITLE_PROPERTIES: [&str; 2] = ["Name", "Название"];

/// Relation on stage records pointing back at their project.
pub const PROJECT_RELATION_PROPERTY: &str = "Проект";

/// Relation on task records pointing back at their stage.
pub const STAGE_RELATION_PROPERTY: &str = "Этап";

/// Number property ordering the stages of a project.
pub const ORDER_PROPERTY: &str = "Порядок";

/// Checkbox on task records marking completion.
pub const DONE_PROPERTY: &str = "Выполнена";

/// Select property on stage records holding the stage status.
pub const STATUS_PROPERTY: &str = "Статус";

/// Status label for a finished stage.
pub const STATUS_COMPLETED: &str = "Завершен";

/// Status label for the stage a project is currently in.
pub const STATUS_ACTIVE: &str = "Активен";
