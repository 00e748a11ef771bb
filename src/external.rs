use crate::command::{ExitCode, Streams};
use crate::env::Environment;
use crate::error::{ConstructionError, RunError};
use crate::parser::CommandGroup;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, info};

/// One command group, ready to be started as a child process.
///
/// Holds everything the child needs, captured when the task was built:
/// argv, environment, working directory and standard streams.
pub struct LaunchTask {
    group: CommandGroup,
    env: Environment,
    streams: Streams,
}

impl LaunchTask {
    /// Snapshot the current environment and working directory for `group`.
    pub fn new(group: CommandGroup, streams: Streams) -> Result<Self, ConstructionError> {
        let env = Environment::capture()?;
        Ok(Self::with_environment(group, env, streams))
    }

    pub fn with_environment(group: CommandGroup, env: Environment, streams: Streams) -> Self {
        Self {
            group,
            env,
            streams,
        }
    }

    pub fn group(&self) -> &CommandGroup {
        &self.group
    }

    fn command(&self) -> Result<Command, RunError> {
        let streams_err = |source| RunError::Streams {
            program: self.group.program().to_string(),
            source,
        };

        let mut cmd = Command::new(self.group.program());
        cmd.args(self.group.args())
            .env_clear()
            .envs(&self.env.vars)
            .current_dir(&self.env.current_dir)
            .stdin(self.streams.stdin.stdio().map_err(streams_err)?)
            .stdout(self.streams.stdout.stdio().map_err(streams_err)?)
            .stderr(self.streams.stderr.stdio().map_err(streams_err)?);
        Ok(cmd)
    }

    /// Start the process and wait for it to exit.
    ///
    /// Never fails as a whole: start-up errors and unsuccessful exits are
    /// both recorded in the returned outcome.
    pub async fn run(self) -> TaskOutcome {
        let result = self.spawn_and_wait().await;
        TaskOutcome {
            group: self.group,
            result,
        }
    }

    async fn spawn_and_wait(&self) -> Result<ExitStatus, RunError> {
        let program = self.group.program();
        let mut child = self.command()?.spawn().map_err(|source| RunError::Spawn {
            program: program.to_string(),
            source,
        })?;
        debug!(program, pid = child.id(), "spawned");

        let status = child.wait().await.map_err(|source| RunError::Wait {
            program: program.to_string(),
            source,
        })?;
        info!(program, %status, "exited");

        if status.success() {
            Ok(status)
        } else {
            Err(RunError::Exited {
                program: program.to_string(),
                status,
            })
        }
    }
}

/// What happened to one launched command.
#[derive(Debug)]
pub struct TaskOutcome {
    pub group: CommandGroup,
    pub result: Result<ExitStatus, RunError>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Shell-style exit code: the status code, `128 + signal` for signal
    /// terminations, and `127` when the process never started.
    pub fn exit_code(&self) -> ExitCode {
        let status = match &self.result {
            Ok(status) | Err(RunError::Exited { status, .. }) => *status,
            Err(RunError::Spawn { .. }) => return 127,
            Err(_) => return 1,
        };
        match status.code() {
            Some(x) => x,
            None => terminated_by_signal(status),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::StreamSource;
    use crate::io_adapters::{FileStream, NullStream};
    use std::fs::{self, OpenOptions};
    use std::io;
    use std::path::Path;
    use std::process::Stdio;
    use std::sync::Arc;

    struct BrokenStream;

    impl StreamSource for BrokenStream {
        fn stdio(&self) -> io::Result<Stdio> {
            Err(io::Error::other("descriptor table full"))
        }
    }

    fn group(tokens: &[&str]) -> CommandGroup {
        CommandGroup::new(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    fn quiet() -> Streams {
        Streams::detached(Arc::new(NullStream), Arc::new(NullStream))
    }

    fn capture_into(path: &Path) -> Streams {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        let out = Arc::new(FileStream::new(file));
        Streams::detached(out.clone(), out)
    }

    #[tokio::test]
    async fn test_successful_command() {
        let outcome = LaunchTask::new(group(&["true"]), quiet()).unwrap().run().await;
        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_a_failure() {
        let outcome = LaunchTask::new(group(&["sh", "-c", "exit 3"]), quiet())
            .unwrap()
            .run()
            .await;
        assert!(matches!(outcome.result, Err(RunError::Exited { .. })));
        assert_eq!(outcome.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_start() {
        let outcome = LaunchTask::new(group(&["frk-definitely-not-a-command"]), quiet())
            .unwrap()
            .run()
            .await;
        assert!(matches!(outcome.result, Err(RunError::Spawn { .. })));
        assert_eq!(outcome.exit_code(), 127);
        assert!(
            outcome
                .result
                .unwrap_err()
                .to_string()
                .starts_with("cannot start `frk-definitely-not-a-command`")
        );
    }

    #[tokio::test]
    async fn test_unavailable_stream_fails_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let made = dir.path().join("made");
        let streams = Streams::detached(Arc::new(NullStream), Arc::new(BrokenStream));

        let outcome = LaunchTask::new(group(&["touch", made.to_str().unwrap()]), streams)
            .unwrap()
            .run()
            .await;

        assert!(matches!(outcome.result, Err(RunError::Streams { .. })));
        assert_eq!(outcome.exit_code(), 1);
        assert!(!made.exists());
    }

    #[tokio::test]
    async fn test_signal_termination_maps_to_shell_code() {
        let outcome = LaunchTask::new(group(&["sh", "-c", "kill -9 $$"]), quiet())
            .unwrap()
            .run()
            .await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 128 + 9);
    }

    #[tokio::test]
    async fn test_args_are_passed_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let outcome = LaunchTask::new(
            group(&["printf", "%s|", "a b", "\"c", "*"]),
            capture_into(&out),
        )
        .unwrap()
        .run()
        .await;

        assert!(outcome.is_success());
        assert_eq!(fs::read_to_string(&out).unwrap(), "a b|\"c|*|");
    }

    #[tokio::test]
    async fn test_child_uses_captured_environment_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let mut env = Environment::capture().unwrap();
        env.vars.insert("FRK_TEST_VALUE".into(), "hello".into());
        env.current_dir = dir.path().to_path_buf();

        let task = LaunchTask::with_environment(
            group(&["sh", "-c", "echo \"$FRK_TEST_VALUE\"; pwd"]),
            env,
            capture_into(&out),
        );
        let outcome = task.run().await;
        assert!(outcome.is_success());

        let printed = fs::read_to_string(&out).unwrap();
        let mut lines = printed.lines();
        assert_eq!(lines.next(), Some("hello"));
        assert_eq!(
            fs::canonicalize(lines.next().unwrap()).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }
}
