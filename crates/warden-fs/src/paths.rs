//! Lexical path helpers shared by the resolver and the root set.
//!
//! Nothing in this module touches the filesystem.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Folds `.` and `..` components and collapses repeated separators.
///
/// `..` never climbs above the root of an absolute path. For relative paths a
/// leading `..` that has nothing to cancel is kept.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use warden_fs::paths::normalise_lexical;
///
/// assert_eq!(
///     normalise_lexical(Path::new("/srv//a/./b/../c")),
///     PathBuf::from("/srv/a/c")
/// );
/// assert_eq!(normalise_lexical(Path::new("/../etc")), PathBuf::from("/etc"));
/// ```
#[must_use]
pub fn normalise_lexical(path: &Path) -> PathBuf {
    let mut normalised = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalised.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalised.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => normalised.push(".."),
            },
            other => normalised.push(other.as_os_str()),
        }
    }

    if normalised.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalised
    }
}

/// Replaces a leading `~` component with the current user's home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == OsStr::new("~") => match dirs::home_dir() {
            Some(home) if components.as_path().as_os_str().is_empty() => home,
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Joins a relative `candidate` onto `base`; absolute candidates pass through.
#[must_use]
pub fn absolutise(base: &Path, candidate: &Path) -> PathBuf {
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

/// Returns true when `path` equals `root` or lies beneath it.
///
/// The comparison works on whole components, so `/allowedfoo` is not within
/// `/allowed`.
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/a/b", "/a/b")]
    #[case("/a/./b", "/a/b")]
    #[case("/a//b/", "/a/b")]
    #[case("/a/../b", "/b")]
    #[case("/a/b/../../..", "/")]
    #[case("/../../etc/passwd", "/etc/passwd")]
    #[case("a/../../b", "../b")]
    #[case(".", ".")]
    #[case("a/..", ".")]
    fn normalises_lexically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_lexical(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("/allowed", "/allowed", true)]
    #[case("/allowed/sub/file", "/allowed", true)]
    #[case("/allowedfoo", "/allowed", false)]
    #[case("/allowedfoo/file", "/allowed", false)]
    #[case("/", "/allowed", false)]
    fn containment_is_component_wise(
        #[case] path: &str,
        #[case] root: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_within(Path::new(path), Path::new(root)), expected);
    }

    #[test]
    fn absolutise_keeps_absolute_candidates() {
        let base = Path::new("/srv/base");
        assert_eq!(
            absolutise(base, Path::new("/etc/hosts")),
            PathBuf::from("/etc/hosts")
        );
        assert_eq!(
            absolutise(base, Path::new("notes.txt")),
            PathBuf::from("/srv/base/notes.txt")
        );
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(
            expand_home(Path::new("/srv/~/x")),
            PathBuf::from("/srv/~/x")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~")), home);
            assert_eq!(expand_home(Path::new("~/notes")), home.join("notes"));
        }
    }
}
