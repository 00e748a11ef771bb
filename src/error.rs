use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure to turn a pending token buffer into something runnable.
///
/// These are collected across the whole invocation into an [`AggregatedError`]
/// instead of aborting the scan.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// A command was built from zero tokens.
    #[error("command contains no arguments")]
    EmptyGroup,
    /// The working directory of this process could not be read.
    #[error("cannot determine the working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
}

/// All construction failures of one invocation, reported together.
#[derive(Debug, Default)]
pub struct AggregatedError {
    errors: Vec<ConstructionError>,
}

impl AggregatedError {
    pub fn push(&mut self, error: ConstructionError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "a total of {} errors have occurred:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedError {}

/// Failure of a single launched command.
///
/// Never fatal to the batch: each one is reported on its own and siblings keep running.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot open standard streams for `{program}`: {source}")]
    Streams {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` failed: {status}")]
    Exited { program: String, status: ExitStatus },
    #[error("task running `{program}` aborted: {source}")]
    Aborted {
        program: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
