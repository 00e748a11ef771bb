use frk::config::Invocation;
use frk::{Args, Config, NAME, Streams, USAGE};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args_os().len() < 2 {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let args = match Args::parse(std::env::args_os().skip(1)) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Help(text)) => {
            println!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(err) => return fatal(err),
    };
    frk::logging::init();

    let config = match Config::from_env(args) {
        Ok(config) => config,
        Err(err) => return fatal(err),
    };
    if config.tokens.is_empty() {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    // Failed commands were already reported; they never change our own status.
    match frk::run(config, Streams::inherited()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => fatal(err),
    }
}

fn fatal(err: anyhow::Error) -> ExitCode {
    eprintln!("{NAME}: fatal error: {err:#}");
    ExitCode::FAILURE
}
