//! Links from the package directory to build outputs.
//!
//! The interpreter needs `_lldb.so` (or `_lldb.pyd`) next to `__init__.py`,
//! and the package wants its helper executables alongside. Rather than copy
//! the large shared library, the package links to it: symlinks on POSIX,
//! hard links on Windows.

use crate::error::{FinishError, Result};
use crate::interpreter::InterpreterSource;
use crate::paths::up_levels;
use pyfinish_schema::{Config, LinkKind, PACKAGE_NAME, Platform};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Platform link mechanism.
pub trait Linker: std::fmt::Debug {
    /// Which mechanism this is.
    fn kind(&self) -> LinkKind;

    /// Whether `target` already holds a link of this kind.
    fn exists(&self, target: &Path) -> bool;

    /// Create `target` pointing at `source`.
    ///
    /// A relative `source` is interpreted relative to `target`'s directory.
    ///
    /// # Errors
    ///
    /// Returns the OS error, except where an "already exists" failure is
    /// tolerated (see the implementations).
    fn link(&self, source: &Path, target: &Path) -> io::Result<()>;
}

/// POSIX symbolic links. The relative source is stored verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicLinker;

impl Linker for SymbolicLinker {
    fn kind(&self) -> LinkKind {
        LinkKind::Symbolic
    }

    fn exists(&self, target: &Path) -> bool {
        target
            .symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn link(&self, source: &Path, target: &Path) -> io::Result<()> {
        match symlink(source, target) {
            // Another build step got there first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.exists(target) => Ok(()),
            other => other,
        }
    }
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, target)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_source: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this host",
    ))
}

/// Hard links, as used on Windows. Once created they are ordinary files.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardLinker;

impl Linker for HardLinker {
    fn kind(&self) -> LinkKind {
        LinkKind::Hard
    }

    fn exists(&self, target: &Path) -> bool {
        target.is_file()
    }

    fn link(&self, source: &Path, target: &Path) -> io::Result<()> {
        let source = match target.parent() {
            Some(dir) if source.is_relative() => dir.join(source),
            _ => source.to_path_buf(),
        };
        match std::fs::hard_link(&source, target) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            other => other,
        }
    }
}

/// The link mechanism for `platform`.
///
/// # Errors
///
/// Returns [`FinishError::UnknownPlatform`] for [`Platform::Unknown`].
pub fn linker_for(platform: Platform) -> Result<Box<dyn Linker>> {
    match platform.link_kind() {
        Some(LinkKind::Hard) => Ok(Box::new(HardLinker)),
        Some(LinkKind::Symbolic) => Ok(Box::new(SymbolicLinker)),
        None => Err(FinishError::UnknownPlatform),
    }
}

/// The build outputs the package links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// The native library, linked as the `_lldb` extension module.
    NativeBinding,
    /// `darwin-debug`, the process launcher (Darwin only).
    DebugLauncher,
    /// `lldb-argdumper`, the argument-expansion helper.
    ArgumentDumper,
}

impl Artifact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeBinding => "native binding",
            Self::DebugLauncher => "debug launcher",
            Self::ArgumentDumper => "argument dumper",
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One link to create: source relative to the build root, target file name
/// inside the package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub artifact: Artifact,
    pub source: PathBuf,
    pub target: String,
}

/// Native library file stem, before the platform's shared-library suffix.
const LIBRARY_STEM: &str = "liblldb";
const DEBUG_LAUNCHER: &str = "darwin-debug";
const ARGUMENT_DUMPER: &str = "lldb-argdumper";

impl LinkSpec {
    /// `_lldb[_d].pyd` on Windows, `_lldb.so` elsewhere.
    ///
    /// # Errors
    ///
    /// On Windows the interpreter decides the `_d` suffix, so probe failures
    /// propagate.
    pub fn native_binding(
        config: &Config,
        platform: Platform,
        interpreter: &mut InterpreterSource,
    ) -> Result<Self> {
        let mut target = format!("_{PACKAGE_NAME}");
        if platform.is_windows() && interpreter.get()?.wants_debug_extension_suffix() {
            target.push_str("_d");
        }
        target.push_str(platform.extension_module_suffix());

        let source = if !config.from_build_system {
            Path::new("lib").join("LLDB")
        } else if platform.is_windows() {
            Path::new("bin").join(format!("{LIBRARY_STEM}{}", platform.shared_lib_suffix()))
        } else {
            Path::new("lib").join(format!("{LIBRARY_STEM}{}", platform.shared_lib_suffix()))
        };

        Ok(Self {
            artifact: Artifact::NativeBinding,
            source,
            target,
        })
    }

    /// `darwin-debug` → `bin/lldb-launcher`.
    pub fn debug_launcher() -> Self {
        Self {
            artifact: Artifact::DebugLauncher,
            source: Path::new("bin").join("lldb-launcher"),
            target: DEBUG_LAUNCHER.to_string(),
        }
    }

    /// `lldb-argdumper[.exe]` → `bin/lldb-argdumper[.exe]`.
    pub fn argument_dumper(platform: Platform) -> Self {
        let name = format!("{ARGUMENT_DUMPER}{}", platform.exe_suffix());
        Self {
            artifact: Artifact::ArgumentDumper,
            source: Path::new("bin").join(&name),
            target: name,
        }
    }
}

/// What happened to one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Link created at the given path.
    Created(PathBuf),
    /// A link was already in place and left untouched.
    AlreadyPresent(PathBuf),
    /// IDE builds colocate artifacts, so no link is made.
    NotRequired,
    /// The artifact does not exist on this platform.
    NotApplicable,
}

/// Create one link from the package directory into the build tree.
///
/// # Errors
///
/// - [`FinishError::UnknownPlatform`] for [`Platform::Unknown`].
/// - [`FinishError::LinkCreationFailed`] when the OS refuses the link.
pub fn create_link(
    config: &Config,
    platform: Platform,
    linker: &dyn Linker,
    package_dir: &Path,
    source_rel: &Path,
    target_name: &str,
) -> Result<LinkOutcome> {
    if !config.from_build_system {
        return Ok(LinkOutcome::NotRequired);
    }
    if platform == Platform::Unknown {
        return Err(FinishError::UnknownPlatform);
    }

    let source = up_levels(platform.build_root_depth(), source_rel);
    let target = package_dir.join(target_name);

    if linker.exists(&target) {
        debug!("Link for '{target_name}' already exists");
        return Ok(LinkOutcome::AlreadyPresent(target));
    }

    info!(
        "Creating {:?} link for {target_name} ({} -> {})",
        linker.kind(),
        source.display(),
        target.display()
    );
    linker
        .link(&source, &target)
        .map_err(|e| FinishError::LinkCreationFailed {
            src: source.clone(),
            target: target.clone(),
            reason: e.to_string(),
        })?;

    Ok(LinkOutcome::Created(target))
}

/// Create a [`LinkSpec`]'s link.
///
/// # Errors
///
/// See [`create_link`].
pub fn create_spec_link(
    config: &Config,
    platform: Platform,
    linker: &dyn Linker,
    package_dir: &Path,
    spec: &LinkSpec,
) -> Result<LinkOutcome> {
    create_link(
        config,
        platform,
        linker,
        package_dir,
        &spec.source,
        &spec.target,
    )
}

/// Create the native binding, debug launcher (Darwin) and argument dumper
/// links, in that order, stopping at the first failure.
///
/// # Errors
///
/// See [`create_link`] and [`LinkSpec::native_binding`].
pub fn create_all_links(
    config: &Config,
    platform: Platform,
    linker: &dyn Linker,
    package_dir: &Path,
    interpreter: &mut InterpreterSource,
) -> Result<Vec<(Artifact, LinkOutcome)>> {
    let launcher = LinkSpec::debug_launcher();
    let launcher_applies = platform.is_darwin();

    // IDE builds colocate artifacts; the native binding name must not be
    // derived, since that may need the interpreter.
    if !config.from_build_system {
        let launcher_outcome = if launcher_applies {
            LinkOutcome::NotRequired
        } else {
            LinkOutcome::NotApplicable
        };
        return Ok(vec![
            (Artifact::NativeBinding, LinkOutcome::NotRequired),
            (launcher.artifact, launcher_outcome),
            (Artifact::ArgumentDumper, LinkOutcome::NotRequired),
        ]);
    }

    let mut outcomes = Vec::with_capacity(3);

    let native = LinkSpec::native_binding(config, platform, interpreter)?;
    outcomes.push((
        native.artifact,
        create_spec_link(config, platform, linker, package_dir, &native)?,
    ));

    let outcome = if launcher_applies {
        create_spec_link(config, platform, linker, package_dir, &launcher)?
    } else {
        LinkOutcome::NotApplicable
    };
    outcomes.push((launcher.artifact, outcome));

    let dumper = LinkSpec::argument_dumper(platform);
    outcomes.push((
        dumper.artifact,
        create_spec_link(config, platform, linker, package_dir, &dumper)?,
    ));

    for (artifact, outcome) in &outcomes {
        debug!("{artifact}: {outcome:?}");
    }
    Ok(outcomes)
}
