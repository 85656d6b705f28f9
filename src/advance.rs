//! The stage advancement engine.
//!
//! One run walks every project, resolves its current stage, and when all
//! tasks of that stage are checked off, flips the stage statuses and moves
//! the project pointer to the next stage. Each project is an isolated unit
//! of work; one broken project never stops the rest of the run.

use chrono::Local;

use crate::config::Config;
use crate::models::{CurrentStage, Project, Record, Stage, Task};
use crate::schema;
use crate::store::{PropertyPatch, Query, RecordStore};

/// What happened to a single project during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// The project has no usable current-stage pointer.
    Skipped,
    /// The current stage still has open (or no) tasks.
    InProgress { done: usize, total: usize },
    /// The project moved to its next stage.
    Advanced,
    /// The stage was complete but nothing could be advanced, either
    /// because there is no next stage or because a write failed.
    NotAdvanced,
}

/// Tallies of one full run over the projects database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub advanced: usize,
    pub in_progress: usize,
    pub skipped: usize,
    pub not_advanced: usize,
    pub failed: usize,
}

/// Walks projects and advances the ones whose current stage is done.
pub struct StageAdvancer<'a> {
    store: &'a dyn RecordStore,
    config: &'a Config,
}

impl<'a> StageAdvancer<'a> {
    pub fn new(store: &'a dyn RecordStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Check every project once and return the run tallies.
    ///
    /// A failure to list the projects aborts the run; any error inside a
    /// single project is reported and counted, and the run continues with
    /// the next project.
    pub fn run_once(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        println!("🔍 Checking projects... {}", Local::now().format("%H:%M:%S"));

        let projects = match self.store.query(&self.config.projects_db, &Query::all()) {
            Ok(projects) => projects,
            Err(e) => {
                println!("💥 Critical error while querying projects: {e}");
                return summary;
            }
        };
        println!("📁 Projects found: {}", projects.len());

        for record in &projects {
            summary.checked += 1;
            match self.check_project(record) {
                Ok(ProjectOutcome::Advanced) => summary.advanced += 1,
                Ok(ProjectOutcome::InProgress { .. }) => summary.in_progress += 1,
                Ok(ProjectOutcome::Skipped) => summary.skipped += 1,
                Ok(ProjectOutcome::NotAdvanced) => summary.not_advanced += 1,
                Err(e) => {
                    println!("❌ Error in project {}: {e}", Project(record).display_name());
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Inspect one project and advance it when its current stage is done.
    fn check_project(&self, record: &Record) -> crate::Result<ProjectOutcome> {
        let project = Project(record);
        println!("🔍 Checking project: {}", project.display_name());

        let Some(current) = project.current_stage() else {
            println!("   ⏭️ No current stage");
            return Ok(ProjectOutcome::Skipped);
        };

        let stages = self.project_stages(&record.id);
        println!("   📋 Stages total: {}", stages.len());

        match stages.iter().position(|s| s.id == current.stage_id) {
            Some(index) => {
                let name = stage_name(&stages[index], index);
                println!("   🎯 Current stage: {}/{} - {}", index + 1, stages.len(), name);
            }
            None => println!("   🎯 Current stage: ?/{} - Unknown", stages.len()),
        }

        let current_tasks = self.stage_tasks(&current.stage_id);
        let current_done = count_done(&current_tasks)?;
        println!(
            "   📊 Current stage progress: {}/{} tasks",
            current_done,
            current_tasks.len()
        );

        let mut total = 0;
        let mut total_done = 0;
        for stage in &stages {
            let tasks = self.stage_tasks(&stage.id);
            total += tasks.len();
            total_done += count_done(&tasks)?;
        }
        println!("   📈 Project total: {total_done}/{total} tasks");

        if self.stage_completed(&current.stage_id)? {
            println!("   ✅ Stage complete, advancing");
            if self.advance(&record.id, &current, &stages) {
                println!("   🔄 Stage advanced");
                Ok(ProjectOutcome::Advanced)
            } else {
                Ok(ProjectOutcome::NotAdvanced)
            }
        } else {
            println!("   ⏳ Stage not finished yet");
            Ok(ProjectOutcome::InProgress {
                done: current_done,
                total: current_tasks.len(),
            })
        }
    }

    /// The project's stages in board order. Fetch errors degrade to an
    /// empty list so the project is handled like one without stages.
    fn project_stages(&self, project_id: &str) -> Vec<Record> {
        let query = Query::all()
            .relation_contains(schema::PROJECT_RELATION_PROPERTY, project_id)
            .ascending(schema::ORDER_PROPERTY);

        match self.store.query(&self.config.stages_db, &query) {
            Ok(mut stages) => {
                sort_stages(&mut stages);
                stages
            }
            Err(e) => {
                println!("   ❌ Error fetching project stages: {e}");
                Vec::new()
            }
        }
    }

    /// The tasks of one stage. Fetch errors degrade to an empty list.
    fn stage_tasks(&self, stage_id: &str) -> Vec<Record> {
        let query = Query::all().relation_contains(schema::STAGE_RELATION_PROPERTY, stage_id);

        match self.store.query(&self.config.tasks_db, &query) {
            Ok(tasks) => tasks,
            Err(e) => {
                println!("   ❌ Error fetching stage tasks: {e}");
                Vec::new()
            }
        }
    }

    /// A stage is complete when it has at least one task and every task
    /// is checked off. A stage with no tasks never completes.
    fn stage_completed(&self, stage_id: &str) -> crate::Result<bool> {
        let tasks = self.stage_tasks(stage_id);
        if tasks.is_empty() {
            return Ok(false);
        }
        for task in &tasks {
            if !Task(task).is_done()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Move the project from `current` to the following stage. Returns
    /// whether the move happened.
    fn advance(&self, project_id: &str, current: &CurrentStage, stages: &[Record]) -> bool {
        let next = stages
            .iter()
            .position(|s| s.id == current.stage_id)
            .and_then(|index| stages.get(index + 1).map(|next| (index, next)));

        let Some((index, next)) = next else {
            println!("   ⏹️ No next stage to advance to");
            return false;
        };

        let from_name = stage_name(&stages[index], index);
        let to_name = stage_name(next, index + 1);
        println!("   🔄 Moving from '{from_name}' to '{to_name}'");

        match self.apply_advancement(project_id, current, &next.id) {
            Ok(()) => {
                println!("   ✅ Moved to stage '{to_name}'");
                true
            }
            Err(e) => {
                println!("   ❌ Stage transition failed: {e}");
                false
            }
        }
    }

    /// The three writes of a stage transition. The pointer is written
    /// last; an earlier failure leaves it on the old stage.
    fn apply_advancement(
        &self,
        project_id: &str,
        current: &CurrentStage,
        next_id: &str,
    ) -> crate::Result<()> {
        let completed = PropertyPatch::new().select(schema::STATUS_PROPERTY, schema::STATUS_COMPLETED);
        self.store.update(&current.stage_id, &completed)?;

        let active = PropertyPatch::new().select(schema::STATUS_PROPERTY, schema::STATUS_ACTIVE);
        self.store.update(next_id, &active)?;

        let pointer = PropertyPatch::new().relation(&current.property, next_id);
        self.store.update(project_id, &pointer)?;

        Ok(())
    }
}

/// Stage name for log output, with a positional fallback.
fn stage_name(record: &Record, index: usize) -> String {
    match Stage(record).name() {
        Some(name) => name.to_string(),
        None => format!("Stage {}", index + 1),
    }
}

/// Count the checked-off tasks, failing on the first malformed one.
fn count_done(tasks: &[Record]) -> crate::Result<usize> {
    let mut done = 0;
    for task in tasks {
        if Task(task).is_done()? {
            done += 1;
        }
    }
    Ok(done)
}

/// Order stages by their order number, then by record id. Stages without
/// an order sort last. The ordering is total, so two runs over the same
/// board always walk the stages the same way.
fn sort_stages(stages: &mut [Record]) {
    stages.sort_by(|a, b| {
        let a_order = Stage(a).order().unwrap_or(f64::INFINITY);
        let b_order = Stage(b).order().unwrap_or(f64::INFINITY);
        a_order.total_cmp(&b_order).then_with(|| a.id.cmp(&b.id))
    });
}
