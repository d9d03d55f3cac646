use crate::core::error::{Error, Result};

/// Unit of batch work with declared dependencies.
///
/// A task whose `complete` reports true is never run again; requirements are
/// built first, depth first, and a failed requirement fails its dependents.
pub trait Task: Send + Sync {
    fn name(&self) -> String;

    fn requires(&self) -> Vec<Box<dyn Task>> {
        Vec::new()
    }

    fn complete(&self) -> Result<bool>;

    fn run(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    AlreadyComplete,
}

/// Builds `task` and everything it requires.
pub fn build(task: &dyn Task) -> Result<TaskOutcome> {
    if task.complete()? {
        return Ok(TaskOutcome::AlreadyComplete);
    }

    for requirement in task.requires() {
        build(requirement.as_ref()).map_err(|e| {
            Error::new(e.kind, format!("{} -> {}: {}", task.name(), requirement.name(), e.context))
        })?;
    }

    task.run()?;
    Ok(TaskOutcome::Completed)
}
