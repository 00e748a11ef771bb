//! Run several shell commands concurrently from a single invocation.
//!
//! A flat token list such as `echo bar, sleep 3, touch hello world` is split at
//! commas into independent commands (see [`parser`]). Each command becomes a
//! [`LaunchTask`] carrying its own snapshot of the environment and working
//! directory, and a [`Runner`] starts them all at once, streaming the parent's
//! stdin/stdout/stderr straight through, and waits until every one has exited.
//!
//! Construction problems are collected into one [`AggregatedError`] and stop the
//! run before anything starts. Failures of the commands themselves are only
//! reported; they never affect sibling commands or the overall result.

pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
pub mod io_adapters;
pub mod logging;
pub mod parser;
pub mod runner;

pub use command::Streams;
pub use config::{Args, Config};
pub use error::{AggregatedError, ConstructionError, RunError};
pub use external::{LaunchTask, TaskOutcome};
pub use parser::{CommandGroup, Grouped};
pub use runner::{RunSummary, Runner};

/// Prefix of every line this program writes on its own behalf.
pub const NAME: &str = "frk";

/// Printed when there is nothing to run.
pub const USAGE: &str = "\
Usage:
frk is a lightweight forking utility.
Give comma separated terminal commands to be executed concurrently.
e.g. $ frk echo bar, sleep 300, touch hello world

Run `frk --help` for options.
";

/// Group `tokens` into launch tasks bound to `streams`.
///
/// Every task snapshots the environment and working directory independently.
/// Tasks that could be built are returned together with the failures of those
/// that could not.
pub fn plan<I, S>(tokens: I, streams: &Streams) -> Grouped<LaunchTask>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parser::group_with(tokens, |tokens| {
        LaunchTask::new(CommandGroup::new(tokens)?, streams.clone())
    })
}

/// Plan and run everything described by `config`.
///
/// Any construction failure aborts before a single command starts. Once the
/// commands are running, their failures end up in the summary and never make
/// this fail.
pub async fn run(config: Config, streams: Streams) -> anyhow::Result<RunSummary> {
    let tasks = plan(config.tokens, &streams).into_result()?;
    tracing::debug!(commands = tasks.len(), "starting");
    let summary = Runner::new(config.max_concurrency).run(tasks).await;
    tracing::debug!(failed = summary.failures().count(), "all commands finished");
    Ok(summary)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::io_adapters::NullStream;
    use std::sync::Arc;

    fn quiet() -> Streams {
        Streams::detached(Arc::new(NullStream), Arc::new(NullStream))
    }

    #[test]
    fn test_plan_builds_one_task_per_group() {
        let planned = plan("echo a, echo b,true".split(' '), &quiet());
        assert!(planned.errors.is_empty());
        let programs: Vec<&str> = planned.items.iter().map(|t| t.group().program()).collect();
        assert_eq!(programs, vec!["echo", "echo", "true"]);
    }

    #[tokio::test]
    async fn test_run_reports_failures_in_summary() {
        let config = Config {
            tokens: "true, false".split(' ').map(String::from).collect(),
            max_concurrency: None,
        };
        let summary = run(config, quiet()).await.unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.failures().count(), 1);
    }
}
