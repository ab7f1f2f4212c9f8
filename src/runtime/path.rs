//! Path utility functions.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` when there is nothing left to pop
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Calculate the relative path from a symlink location to a target.
///
/// For example, a binary link at `/project/vendor/bin/tool` pointing to
/// `/project/vendor/acme/tool/bin/tool` yields `../acme/tool/bin/tool`.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn relative_symlink_path(from_link: &Path, to_target: &Path) -> Option<PathBuf> {
    let from_dir = from_link.parent()?;
    let result = pathdiff::diff_paths(to_target, from_dir)?;

    if result.is_absolute() {
        return None;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_simple() {
        assert_eq!(
            normalize_path(Path::new("/srv/app/web")),
            PathBuf::from("/srv/app/web")
        );
    }

    #[test]
    fn test_normalize_path_with_dot_and_parent() {
        assert_eq!(
            normalize_path(Path::new("/srv/./app/web/../bundle.map.json")),
            PathBuf::from("/srv/app/bundle.map.json")
        );
    }

    #[test]
    fn test_normalize_path_trailing_parent() {
        assert_eq!(
            normalize_path(Path::new("/srv/app/web/..")),
            PathBuf::from("/srv/app")
        );
    }

    #[test]
    fn test_normalize_path_relative_leading_parent() {
        assert_eq!(
            normalize_path(Path::new("../bundles/bundle.map.json")),
            PathBuf::from("../bundles/bundle.map.json")
        );
    }

    #[test]
    #[cfg(not(windows))]
    fn test_relative_symlink_path_into_vendor() {
        let result = relative_symlink_path(
            Path::new("/project/vendor/bin/tool"),
            Path::new("/project/vendor/acme/tool/bin/tool"),
        );
        assert_eq!(result, Some(PathBuf::from("../acme/tool/bin/tool")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_relative_symlink_path_same_parent() {
        let result = relative_symlink_path(
            Path::new("/project/vendor/bin/tool"),
            Path::new("/project/vendor/bin/tool.real"),
        );
        assert_eq!(result, Some(PathBuf::from("tool.real")));
    }

    #[test]
    #[cfg(windows)]
    fn test_relative_symlink_path_windows_different_drives() {
        let result = relative_symlink_path(
            Path::new(r"C:\project\vendor\bin\tool"),
            Path::new(r"D:\acme\tool\bin\tool"),
        );
        assert_eq!(result, None);
    }
}
