//! Package directories, support-file copies and init-file synthesis.

use crate::error::{FinishError, Result};
use crate::paths::{dotted_package_name, module_name, subpackage_dir};
use pyfinish_schema::{INIT_FILE, PACKAGE_NAME, Platform};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One subpackage slot: where it lives and what gets copied into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpackageSpec {
    /// `""` for the root package, otherwise `/`-prefixed (`/formatters/cpp`).
    pub relative: String,
    /// Absolute source files, in declaration order.
    pub files: Vec<PathBuf>,
}

impl SubpackageSpec {
    pub fn new(relative: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            relative: relative.into(),
            files,
        }
    }

    /// Dotted import name, e.g. `lldb.formatters.cpp`.
    pub fn package_name(&self) -> String {
        dotted_package_name(PACKAGE_NAME, &self.relative)
    }
}

/// What [`assemble_package`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Directory the subpackage ended up in.
    pub dir: PathBuf,
    /// Files copied in, as destination paths.
    pub copied: Vec<PathBuf>,
    /// Sources that did not exist and were skipped.
    pub skipped: Vec<PathBuf>,
    /// Whether a fresh init file was written.
    pub init_written: bool,
}

/// Make sure `path` is a directory, creating it and its parents if absent.
///
/// # Errors
///
/// Returns [`FinishError::DirectoryCreateFailed`] if something other than a
/// directory occupies the path or creation fails.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        debug!("Directory '{}' already exists", path.display());
        return Ok(());
    }

    if path.exists() {
        return Err(FinishError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            reason: "path exists and is not a directory".to_string(),
        });
    }

    debug!("Creating directory '{}'", path.display());
    std::fs::create_dir_all(path).map_err(|e| FinishError::DirectoryCreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Copy `src` into directory `dir`, keeping its file name and overwriting.
///
/// # Errors
///
/// Returns [`FinishError::FileCopyFailed`] on any I/O failure.
pub fn copy_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let Some(name) = src.file_name() else {
        return Err(FinishError::copy_failed(src, dir, "source has no file name"));
    };
    let dest = dir.join(name);
    std::fs::copy(src, &dest).map_err(|e| FinishError::copy_failed(src, &dest, e))?;
    debug!("Copied file '{}' to folder '{}'", src.display(), dir.display());
    Ok(dest)
}

/// Populate one subpackage and give it an init file if it lacks one.
///
/// Support files are copied unconditionally so that rebuilt scripts reach
/// the package. Missing sources are skipped. An existing init file is never
/// touched.
///
/// # Errors
///
/// - [`FinishError::MalformedSubpackagePath`] if `spec.relative` is
///   non-empty and does not start with `/`.
/// - [`FinishError::DirectoryCreateFailed`] / [`FinishError::FileCopyFailed`]
///   from the filesystem work.
pub fn assemble_package(
    package_root: &Path,
    platform: Platform,
    spec: &SubpackageSpec,
) -> Result<AssemblyReport> {
    if !spec.relative.is_empty() && !spec.relative.starts_with('/') {
        return Err(FinishError::MalformedSubpackagePath {
            relative: spec.relative.clone(),
        });
    }

    let dir = subpackage_dir(package_root, &spec.relative, platform);
    ensure_directory(&dir)?;

    let mut report = AssemblyReport {
        dir: dir.clone(),
        ..AssemblyReport::default()
    };
    let mut modules = Vec::new();

    for src in &spec.files {
        if !src.is_file() {
            debug!("Skipping missing package file '{}'", src.display());
            report.skipped.push(src.clone());
            continue;
        }
        report.copied.push(copy_into(src, &dir)?);
        modules.extend(module_name(src));
    }

    let init_path = dir.join(INIT_FILE);
    if init_path.is_file() {
        return Ok(report);
    }

    info!("Creating package init file '{}'", init_path.display());
    std::fs::write(&init_path, render_init_file(&spec.package_name(), &modules))
        .map_err(|e| FinishError::copy_failed("<generated>", &init_path, e))?;
    report.init_written = true;

    Ok(report)
}

/// Source of an init file that declares `modules` and imports each one.
///
/// ```
/// use pyfinish_core::assembler::render_init_file;
///
/// let script = render_init_file("lldb.utils", &["symbolication".to_string()]);
/// assert_eq!(
///     script,
///     "__all__ = [\"symbolication\"]\nfor x in __all__:\n\t__import__('lldb.utils.' + x)"
/// );
/// ```
pub fn render_init_file(package_name: &str, modules: &[String]) -> String {
    let declared = modules
        .iter()
        .map(|m| format!("\"{m}\""))
        .collect::<Vec<_>>()
        .join(",");
    format!("__all__ = [{declared}]\nfor x in __all__:\n\t__import__('{package_name}.' + x)")
}
