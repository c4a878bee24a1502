//! Filesystem operations over resolved paths.
//!
//! Every function here takes [`ResolvedPath`](crate::ResolvedPath) values, so
//! nothing in this module can be reached with an unvalidated path.

mod info;
mod listing;
mod mutate;
mod read;
mod search;

pub use info::{FileInfo, file_info};
pub use listing::{
    DirectoryEntry, EntryKind, SizedListing, SortOrder, TreeEntry, directory_tree,
    list_directory, list_with_sizes,
};
pub use mutate::{create_directory, move_path, write_text};
pub use read::{MediaContent, MediaKind, ReadOutcome, ReadWindow, read_media, read_text};
pub use search::search;

const OPS_TARGET: &str = "warden_fs::ops";
