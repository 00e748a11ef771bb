use crate::io_adapters::{Inherited, NullStream};
use std::io;
use std::process::Stdio;
use std::sync::Arc;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Signal terminations are folded in the way POSIX shells do it (`128 + signal`).
pub type ExitCode = i32;

/// A standard stream that can be handed to any number of child processes.
///
/// Every launched command asks for its own [`Stdio`], so implementors must be
/// able to produce a fresh handle per call (inherit, duplicate a file
/// descriptor, open `/dev/null`, ...).
pub trait StreamSource: Send + Sync {
    /// Produce a [`Stdio`] handle suitable for `tokio::process::Command`.
    fn stdio(&self) -> io::Result<Stdio>;
}

/// The three standard streams a launched command is bound to.
///
/// Cloning is cheap and shares the underlying sources; all children write to
/// the same places without any synchronisation.
#[derive(Clone)]
pub struct Streams {
    pub stdin: Arc<dyn StreamSource>,
    pub stdout: Arc<dyn StreamSource>,
    pub stderr: Arc<dyn StreamSource>,
}

impl Streams {
    pub fn new(
        stdin: Arc<dyn StreamSource>,
        stdout: Arc<dyn StreamSource>,
        stderr: Arc<dyn StreamSource>,
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }

    /// Pass this process's own stdin, stdout and stderr straight through.
    pub fn inherited() -> Self {
        let inherited: Arc<dyn StreamSource> = Arc::new(Inherited);
        Self::new(inherited.clone(), inherited.clone(), inherited)
    }

    /// Replace stdout and stderr, reading nothing from stdin.
    pub fn detached(stdout: Arc<dyn StreamSource>, stderr: Arc<dyn StreamSource>) -> Self {
        Self::new(Arc::new(NullStream), stdout, stderr)
    }
}
