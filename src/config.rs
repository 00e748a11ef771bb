use anyhow::{Context, Result, anyhow, bail};
use argh::{EarlyExit, FromArgs};
use std::ffi::OsString;
use std::num::NonZeroUsize;

/// Environment variable holding the default concurrency limit.
pub const MAX_CONCURRENCY_VAR: &str = "FRK_MAX_CONCURRENCY";

#[derive(FromArgs, Debug)]
/// Run comma separated commands concurrently, e.g. `frk echo bar, sleep 3, touch hello world`.
pub struct Args {
    #[argh(option, short = 'j')]
    /// maximum number of commands running at once. Defaults to $FRK_MAX_CONCURRENCY, or no limit.
    pub max_concurrency: Option<NonZeroUsize>,

    #[argh(positional, greedy)]
    /// commands and their arguments, separated by commas. Taken verbatim from the first one on.
    pub tokens: Vec<String>,
}

/// What the command line asks for.
#[derive(Debug)]
pub enum Invocation {
    /// Run the commands described by the arguments.
    Run(Args),
    /// Print this text to stdout and exit successfully.
    Help(String),
}

impl Args {
    /// Parse raw OS arguments, program name excluded.
    ///
    /// Unlike `argh::from_env`, every failure is returned instead of exiting,
    /// so it can be reported like any other fatal error.
    pub fn parse(raw: impl IntoIterator<Item = OsString>) -> Result<Invocation> {
        let args = raw
            .into_iter()
            .map(|arg| {
                arg.into_string().map_err(|bad| {
                    anyhow!("argument is not valid UTF-8: {}", bad.to_string_lossy())
                })
            })
            .collect::<Result<Vec<String>>>()?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match Args::from_args(&[crate::NAME], &args) {
            Ok(args) => Ok(Invocation::Run(args)),
            Err(EarlyExit {
                output,
                status: Ok(()),
            }) => Ok(Invocation::Help(output)),
            Err(EarlyExit {
                output,
                status: Err(()),
            }) => bail!("{}", output.trim_end()),
        }
    }
}

/// Settings of one invocation, after command line and environment are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tokens: Vec<String>,
    pub max_concurrency: Option<NonZeroUsize>,
}

impl Config {
    /// Merge parsed arguments with environment settings read through `lookup`.
    ///
    /// Command-line options win over the environment. A malformed
    /// environment value is an error even when an option overrides it.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let from_env = lookup(MAX_CONCURRENCY_VAR)
            .map(|raw| {
                raw.trim().parse::<NonZeroUsize>().with_context(|| {
                    format!("{MAX_CONCURRENCY_VAR} must be a positive integer, got {raw:?}")
                })
            })
            .transpose()?;

        Ok(Self {
            tokens: args.tokens,
            max_concurrency: args.max_concurrency.or(from_env),
        })
    }

    /// Resolve against this process's environment.
    pub fn from_env(args: Args) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }
}
