//! Lexical path helpers.
//!
//! Nothing here touches the filesystem. Windows case folding is applied by
//! value of [`Platform`], not by host, so Windows layouts can be computed
//! (and tested) anywhere.

use pyfinish_schema::Platform;
use std::path::{Component, Path, PathBuf};

/// Normalize case the way the target platform compares paths.
///
/// On Windows this lower-cases the path and turns forward slashes into
/// backslashes. Everywhere else the path is returned unchanged.
pub fn normcase(path: &Path, platform: Platform) -> PathBuf {
    if platform.is_windows() {
        PathBuf::from(path.to_string_lossy().to_lowercase().replace('/', "\\"))
    } else {
        path.to_path_buf()
    }
}

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// leading `..` of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Join a `/`-separated subpackage path onto the package root.
///
/// `""` is the root package itself; `"/formatters/cpp"` becomes
/// `<root>/formatters/cpp` using host separators.
pub fn subpackage_dir(root: &Path, relative: &str, platform: Platform) -> PathBuf {
    let joined = relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment));
    normcase(&joined, platform)
}

/// Dotted import name for a subpackage, e.g. `lldb.formatters.cpp`.
pub fn dotted_package_name(top_level: &str, relative: &str) -> String {
    format!("{top_level}{}", relative.replace('/', "."))
}

/// `depth` parent-directory components followed by `rest`.
pub fn up_levels(depth: usize, rest: &Path) -> PathBuf {
    let mut path: PathBuf = std::iter::repeat_n(Component::ParentDir, depth).collect();
    path.push(rest);
    path
}

/// File name up to (not including) its first `.`.
///
/// `gnu_libstdcpp.py` → `gnu_libstdcpp`, `heap.tar.gz` → `heap`.
pub fn module_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let stem = name.split('.').next().unwrap_or(&name);
    Some(stem.to_string())
}
