use crate::error::RunError;
use crate::external::{LaunchTask, TaskOutcome};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Starts every launch task concurrently and waits for all of them.
///
/// Without a limit, every task is started at once. With one, a task only
/// starts after acquiring a permit, held until its process exits. Tasks are
/// started in the order given; they finish in whatever order their processes do.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    max_concurrency: Option<NonZeroUsize>,
}

/// Outcomes of one run, in the order the tasks were given.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TaskOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }
}

impl Runner {
    pub fn new(max_concurrency: Option<NonZeroUsize>) -> Self {
        Self { max_concurrency }
    }

    /// Run all `tasks` to completion.
    ///
    /// A failing command is reported on stderr as soon as it is observed and
    /// never stops its siblings. Returns only after every task has finished.
    pub async fn run(&self, tasks: Vec<LaunchTask>) -> RunSummary {
        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.get())));

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            // The semaphore is never closed, so acquiring cannot fail.
            let permit = match &semaphore {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None,
            };
            let group = task.group().clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let outcome = task.run().await;
                if let Err(err) = &outcome.result {
                    report(err);
                }
                outcome
            });
            handles.push((group, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (group, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(source) => {
                    let err = RunError::Aborted {
                        program: group.program().to_string(),
                        source,
                    };
                    report(&err);
                    outcomes.push(TaskOutcome {
                        group,
                        result: Err(err),
                    });
                }
            }
        }

        RunSummary { outcomes }
    }
}

fn report(err: &RunError) {
    warn!(error = %err, "command failed");
    eprintln!("{}: running a command went wrong: {err}", crate::NAME);
}
