use clap::{CommandFactory, Parser};
use commands::status::Status;
use std::ffi::OsString;

mod commands;
mod config;
mod credentials;
mod errors;
mod git;
mod github;
mod prompt;
mod report;

#[derive(Debug, Parser)]
#[command(name = "branch-pr-status", version)]
#[command(about = "Check the status of pull requests corresponding to local branches", long_about = None)]
struct Cli {
    #[command(flatten)]
    status: Status,
}

fn main() {
    env_logger::init();

    if let Err(e) = ctrlc::set_handler(|| std::process::exit(130)) {
        log::warn!("Cannot install interrupt handler: {}", e);
    }

    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => std::process::exit(code),
    };

    if let Err(e) = args.status.execute() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Parse the command line, or return the exit code to leave with
///
/// No arguments at all prints the usage and fails, help and version succeed.
fn parse_args<I, T>(args: I) -> Result<Cli, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        eprintln!("{}", Cli::command().render_help());
        return Err(1);
    }

    Cli::try_parse_from(args).map_err(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        code
    })
}
