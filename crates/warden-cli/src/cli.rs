//! CLI argument definitions for the `warden` binary.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use warden_fs::ops::SortOrder;

/// Sandboxed filesystem operations confined to allowed directories.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format`)
/// must precede every other argument.
#[derive(Parser, Debug)]
#[command(name = "warden", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Adds an allowed directory. May be repeated.
    #[arg(long = "root", value_name = "DIR")]
    pub(crate) roots: Vec<Utf8PathBuf>,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations exposed by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists the allowed directories.
    Roots,
    /// Prints where a path resolves to, without touching it.
    Resolve { path: String },
    /// Prints a text file, or its first or last lines.
    Read {
        path: String,
        /// Only the first N lines.
        #[arg(long, value_name = "N", conflicts_with = "tail")]
        head: Option<usize>,
        /// Only the last N lines.
        #[arg(long, value_name = "N")]
        tail: Option<usize>,
    },
    /// Reads several text files, reporting failures per file.
    ReadMany {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Reads a file as base64 together with its MIME type.
    ReadMedia { path: String },
    /// Creates or replaces a file. Content is read from stdin unless given.
    Write {
        path: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Applies a JSON array of `{"oldText", "newText"}` edits.
    ///
    /// The edits are read from stdin unless `--edits` is given.
    Edit {
        path: String,
        #[arg(long, value_name = "JSON")]
        edits: Option<String>,
        /// Print the diff without writing the file.
        #[arg(long)]
        dry_run: bool,
    },
    /// Creates a directory and any missing parents.
    Mkdir { path: String },
    /// Moves or renames a file or directory.
    Mv { source: String, destination: String },
    /// Lists a directory.
    Ls {
        #[arg(default_value = ".")]
        path: String,
        /// Include file sizes and totals.
        #[arg(long)]
        sizes: bool,
        /// Ordering for sized listings.
        #[arg(long, value_enum, default_value_t = SortKey::Name, requires = "sizes")]
        sort: SortKey,
    },
    /// Prints a recursive JSON tree of a directory.
    Tree {
        #[arg(default_value = ".")]
        path: String,
    },
    /// Finds entries whose names contain a pattern, ignoring case.
    Search {
        pattern: String,
        #[arg(default_value = ".")]
        path: String,
    },
    /// Prints metadata for a path.
    Info { path: String },
}

/// Sort key accepted by `ls --sort`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum SortKey {
    #[default]
    Name,
    Size,
}

impl From<SortKey> for SortOrder {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Name => Self::Name,
            SortKey::Size => Self::Size,
        }
    }
}
