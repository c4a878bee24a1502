//! Command-line runtime for Warden.
//!
//! The runtime splits configuration flags from the command, loads layered
//! configuration, installs telemetry, builds the allowed-directory set, and
//! dispatches one filesystem operation. IO streams are injected so tests can
//! drive the runtime without a terminal.

use std::ffi::OsString;
use std::fmt;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use warden_fs::{AllowedRoots, Sandbox};

mod cli;
mod commands;
mod config;
mod errors;
pub mod telemetry;

use cli::Cli;
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, R: Read, W: Write, E: Write> {
    pub(crate) stdin: &'a mut R,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let mut io = IoStreams {
        stdin,
        stdout,
        stderr,
    };
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, io),
    };

    match execute(cli, &split.config_arguments, io, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(target: "warden_cli", %error, "command failed");
            emit(io.stderr, format_args!("{}\n", error.render()));
            ExitCode::FAILURE
        }
    }
}

fn execute<R, W, E, L>(
    cli: Cli,
    config_arguments: &[OsString],
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> Result<(), AppError>
where
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let mut config = loader.load(config_arguments)?;
    telemetry::initialise(&config)?;

    config.extend_allowed_directories(cli.roots);
    let roots = AllowedRoots::new(config.allowed_directories())?;
    let base = std::env::current_dir().map_err(AppError::WorkingDirectory)?;
    let sandbox = Sandbox::new(roots, base);

    commands::dispatch(&sandbox, cli.command, io)
}

/// Writes `--help` and `--version` output to stdout and usage errors to
/// stderr, mirroring `clap`'s own exit behaviour.
fn report_usage<R, W, E>(error: &clap::Error, io: &mut IoStreams<'_, R, W, E>) -> ExitCode
where
    R: Read,
    W: Write,
    E: Write,
{
    let rendered = error.render().to_string();
    if error.use_stderr() {
        emit(io.stderr, format_args!("{rendered}"));
        ExitCode::from(2)
    } else {
        emit(io.stdout, format_args!("{rendered}"));
        ExitCode::SUCCESS
    }
}

/// Writes a final message; a closed stream leaves only a debug event.
fn emit<S: Write>(stream: &mut S, message: fmt::Arguments<'_>) {
    if let Err(error) = stream.write_fmt(message) {
        tracing::debug!(target: "warden_cli", %error, "failed to write final output");
    }
}
