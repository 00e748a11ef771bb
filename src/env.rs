use crate::error::ConstructionError;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Snapshot of the process environment handed to one launched command.
///
/// The environment contains:
/// - `vars`: every variable of this process, passed to the child verbatim.
/// - `current_dir`: the working directory the child starts in.
///
/// Each task captures its own snapshot when it is constructed; nothing is
/// re-read when the child is finally started.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables, including non-UTF-8 ones.
    pub vars: HashMap<OsString, OsString>,
    /// The working directory for the child process.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state.
    ///
    /// Copies variables from `std::env::vars_os()` and reads `current_dir`
    /// from `std::env::current_dir()`, which is the only way this can fail.
    pub fn capture() -> Result<Self, ConstructionError> {
        let current_dir = stdenv::current_dir().map_err(ConstructionError::WorkingDirectory)?;
        Ok(Self {
            vars: stdenv::vars_os().collect(),
            current_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::env as stdenv;
    use std::ffi::OsStr;

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::capture().unwrap();
        assert_eq!(env.vars.get(OsStr::new("PATH")), stdenv::var_os("PATH").as_ref());
        assert_eq!(env.vars.get(OsStr::new("SOME_RANDOM_ENV_VAR_12345")), None);
    }

    #[test]
    fn test_env_snapshots_current_dir() {
        let env = Environment::capture().unwrap();
        assert_eq!(env.current_dir, stdenv::current_dir().unwrap());
    }
}
