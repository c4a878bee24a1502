//! Dispatches parsed commands to the sandbox and renders their output.

use std::io::{Read, Write};

use serde::Serialize;
use warden_fs::ops::ReadWindow;
use warden_fs::{EditOperation, Sandbox};

use crate::cli::CliCommand;
use crate::{AppError, IoStreams};

#[derive(Serialize)]
struct Resolution {
    path: String,
    exists: bool,
}

#[derive(Serialize)]
struct Acknowledgement {
    status: &'static str,
    message: String,
}

impl Acknowledgement {
    fn ok(message: String) -> Self {
        Self {
            status: "ok",
            message,
        }
    }
}

pub(crate) fn dispatch<R, W, E>(
    sandbox: &Sandbox,
    command: CliCommand,
    io: &mut IoStreams<'_, R, W, E>,
) -> Result<(), AppError>
where
    R: Read,
    W: Write,
    E: Write,
{
    match command {
        CliCommand::Roots => emit_json(io.stdout, sandbox.roots()),
        CliCommand::Resolve { path } => {
            let resolved = sandbox.resolve(&path)?;
            emit_json(
                io.stdout,
                &Resolution {
                    path: resolved.to_string(),
                    exists: resolved.existed(),
                },
            )
        }
        CliCommand::Read { path, head, tail } => {
            let window = ReadWindow::from_options(head, tail)?;
            let content = sandbox.read_text(&path, window)?;
            io.stdout
                .write_all(content.as_bytes())
                .map_err(AppError::WriteOutput)
        }
        CliCommand::ReadMany { paths } => emit_json(io.stdout, &sandbox.read_multiple(&paths)),
        CliCommand::ReadMedia { path } => emit_json(io.stdout, &sandbox.read_media(&path)?),
        CliCommand::Write { path, content } => {
            let content = match content {
                Some(content) => content,
                None => read_stdin(io.stdin)?,
            };
            sandbox.write_text(&path, &content)?;
            emit_json(
                io.stdout,
                &Acknowledgement::ok(format!("wrote {} bytes to {path}", content.len())),
            )
        }
        CliCommand::Edit {
            path,
            edits,
            dry_run,
        } => {
            let raw = match edits {
                Some(edits) => edits,
                None => read_stdin(io.stdin)?,
            };
            let edits: Vec<EditOperation> =
                serde_json::from_str(&raw).map_err(AppError::ParseEdits)?;
            let result = sandbox.apply_edits(&path, &edits, dry_run)?;
            write!(io.stdout, "{}", result.diff()).map_err(AppError::WriteOutput)?;
            if dry_run {
                writeln!(io.stdout).map_err(AppError::WriteOutput)?;
                io.stdout
                    .write_all(result.content().as_bytes())
                    .map_err(AppError::WriteOutput)?;
            }
            Ok(())
        }
        CliCommand::Mkdir { path } => {
            sandbox.create_directory(&path)?;
            emit_json(io.stdout, &Acknowledgement::ok(format!("created {path}")))
        }
        CliCommand::Mv {
            source,
            destination,
        } => {
            sandbox.move_path(&source, &destination)?;
            emit_json(
                io.stdout,
                &Acknowledgement::ok(format!("moved {source} to {destination}")),
            )
        }
        CliCommand::Ls { path, sizes, sort } => {
            if sizes {
                emit_json(io.stdout, &sandbox.list_with_sizes(&path, sort.into())?)
            } else {
                let entries: Vec<String> = sandbox
                    .list_directory(&path)?
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                emit_json(io.stdout, &entries)
            }
        }
        CliCommand::Tree { path } => emit_json(io.stdout, &sandbox.directory_tree(&path)?),
        CliCommand::Search { pattern, path } => {
            emit_json(io.stdout, &sandbox.search(&path, &pattern)?)
        }
        CliCommand::Info { path } => emit_json(io.stdout, &sandbox.file_info(&path)?),
    }
}

fn read_stdin<R: Read>(stdin: &mut R) -> Result<String, AppError> {
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(AppError::ReadInput)?;
    Ok(buffer)
}

fn emit_json<W: Write, T: Serialize + ?Sized>(stdout: &mut W, value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(AppError::SerialiseOutput)?;
    writeln!(stdout, "{rendered}").map_err(AppError::WriteOutput)
}
