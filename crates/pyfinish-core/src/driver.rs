//! The finishing sequence.
//!
//! Strictly linear: every step runs only if the previous one succeeded, the
//! first failure ends the run, and nothing already done is rolled back. The
//! caller is expected to re-run until it succeeds, so every step is
//! idempotent.

use crate::assembler::{
    AssemblyReport, SubpackageSpec, assemble_package, copy_into, ensure_directory,
};
use crate::error::{EXIT_PROGRAM_FAILURE, FinishError, Result};
use crate::interpreter::{InterpreterSource, Probe};
use crate::links::{Artifact, LinkOutcome, Linker, create_all_links, linker_for};
use crate::location::{resolve_config_build_dir, resolve_package_dir};
use crate::paths::normcase;
use crate::reporter::Reporter;
use pyfinish_schema::{Config, INIT_FILE, Platform};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File the binding generator writes; installed as the package's init file.
pub const PRIMARY_GLUE_FILE: &str = "lldb.py";

/// Driver states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ResolvePlatform,
    ResolvePackageDir,
    ResolveConfigBuildDir,
    EnsurePackageDir,
    CreateAllLinks,
    InstallPrimaryGlueFile,
    AssembleRootPackage,
    AssembleFormattersCpp,
    AssembleRuntimeStub,
    AssembleFormatters,
    AssembleUtils,
    AssembleMacOSExtras,
    AssembleDiagnoseExtras,
    CopyHeapSupportFiles,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolvePlatform => "resolve platform",
            Self::ResolvePackageDir => "resolve package directory",
            Self::ResolveConfigBuildDir => "resolve configuration build directory",
            Self::EnsurePackageDir => "create package directory",
            Self::CreateAllLinks => "create links",
            Self::InstallPrimaryGlueFile => "install lldb.py",
            Self::AssembleRootPackage => "assemble lldb",
            Self::AssembleFormattersCpp => "assemble lldb.formatters.cpp",
            Self::AssembleRuntimeStub => "assemble lldb.runtime",
            Self::AssembleFormatters => "assemble lldb.formatters",
            Self::AssembleUtils => "assemble lldb.utils",
            Self::AssembleMacOSExtras => "assemble lldb.macosx",
            Self::AssembleDiagnoseExtras => "assemble lldb.diagnose",
            Self::CopyHeapSupportFiles => "copy heap support files",
        }
    }

    /// Steps that only run on Darwin.
    pub fn darwin_only(&self) -> bool {
        matches!(
            self,
            Self::AssembleMacOSExtras | Self::AssembleDiagnoseExtras | Self::CopyHeapSupportFiles
        )
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status and message handed back to the build-system wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// `0` on success, [`EXIT_PROGRAM_FAILURE`] otherwise.
    pub status: i32,
    /// Empty on success, the failing step's message otherwise.
    pub message: String,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            status: 0,
            message: String::new(),
        }
    }

    pub fn failure(err: &FinishError) -> Self {
        Self {
            status: EXIT_PROGRAM_FAILURE,
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Result of the heap support copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapCopy {
    /// Not Darwin.
    NotApplicable,
    /// `macosx/heap` existed; nothing was touched.
    AlreadyPresent,
    /// Files copied on this run.
    Copied(Vec<PathBuf>),
}

/// Everything a successful run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub platform: Platform,
    pub package_dir: PathBuf,
    pub config_build_dir: PathBuf,
    pub links: Vec<(Artifact, LinkOutcome)>,
    pub glue_file: PathBuf,
    pub packages: Vec<(Step, AssemblyReport)>,
    pub heap: HeapCopy,
}

/// Subpackage slots in assembly order, with sources under `source_root`.
pub fn subpackage_plan(source_root: &Path, platform: Platform) -> Vec<(Step, SubpackageSpec)> {
    let src = |parts: &[&str]| parts.iter().fold(source_root.to_path_buf(), |p, s| p.join(s));

    let mut plan = vec![
        (
            Step::AssembleRootPackage,
            SubpackageSpec::new(
                "",
                vec![src(&["source", "Interpreter", "embedded_interpreter.py"])],
            ),
        ),
        (
            Step::AssembleFormattersCpp,
            SubpackageSpec::new(
                "/formatters/cpp",
                vec![
                    src(&["examples", "synthetic", "gnu_libstdcpp.py"]),
                    src(&["examples", "synthetic", "libcxx.py"]),
                ],
            ),
        ),
        // An empty lldb/runtime still has to be a package so that
        // lldb.runtime.objc can be imported.
        (Step::AssembleRuntimeStub, SubpackageSpec::new("/runtime", vec![])),
        (
            Step::AssembleFormatters,
            SubpackageSpec::new(
                "/formatters",
                vec![
                    src(&["examples", "summaries", "cocoa", "cache.py"]),
                    src(&["examples", "summaries", "cocoa", "metrics.py"]),
                    src(&["examples", "summaries", "cocoa", "attrib_fromdict.py"]),
                    src(&["examples", "summaries", "cocoa", "Logger.py"]),
                ],
            ),
        ),
        (
            Step::AssembleUtils,
            SubpackageSpec::new("/utils", vec![src(&["examples", "python", "symbolication.py"])]),
        ),
    ];

    plan.push((
        Step::AssembleMacOSExtras,
        SubpackageSpec::new(
            "/macosx",
            vec![
                src(&["examples", "python", "crashlog.py"]),
                src(&["examples", "darwin", "heap_find", "heap.py"]),
            ],
        ),
    ));
    plan.push((
        Step::AssembleDiagnoseExtras,
        SubpackageSpec::new(
            "/diagnose",
            vec![
                src(&["examples", "python", "diagnose_unwind.py"]),
                src(&["examples", "python", "diagnose_nsstring.py"]),
            ],
        ),
    ));

    plan.retain(|(step, _)| platform.is_darwin() || !step.darwin_only());
    plan
}

/// Copy `<cfg_build_dir>/lldb.py` to `<package_dir>/__init__.py`.
///
/// # Errors
///
/// [`FinishError::PrimaryGlueFileMissing`] if the generator output is not
/// there, [`FinishError::FileCopyFailed`] if the copy fails.
pub fn install_primary_glue_file(
    cfg_build_dir: &Path,
    package_dir: &Path,
    platform: Platform,
) -> Result<PathBuf> {
    let src = normcase(&cfg_build_dir.join(PRIMARY_GLUE_FILE), platform);
    let dest = normcase(&package_dir.join(INIT_FILE), platform);

    if !src.exists() {
        return Err(FinishError::PrimaryGlueFileMissing { path: src });
    }

    debug!("Copying lldb.py from '{}' to '{}'", src.display(), dest.display());
    std::fs::copy(&src, &dest).map_err(|e| FinishError::copy_failed(&src, &dest, e))?;
    Ok(dest)
}

/// Sources `heap.py` compiles into `libheap.dylib`.
const HEAP_SUPPORT_FILES: [&str; 2] = ["heap_find.cpp", "Makefile"];

/// Give `lldb/macosx/heap` the sources `heap.py` needs to build `libheap.dylib`.
///
/// Runs once: if the directory already exists nothing is touched.
///
/// # Errors
///
/// [`FinishError::DirectoryCreateFailed`] / [`FinishError::FileCopyFailed`].
pub fn copy_heap_support_files(
    config: &Config,
    platform: Platform,
    package_dir: &Path,
) -> Result<HeapCopy> {
    if !platform.is_darwin() {
        return Ok(HeapCopy::NotApplicable);
    }

    let heap_dir = normcase(&package_dir.join("macosx").join("heap"), platform);
    if heap_dir.is_dir() {
        return Ok(HeapCopy::AlreadyPresent);
    }

    let src_dir = config
        .source_root
        .join("examples")
        .join("darwin")
        .join("heap_find")
        .join("heap");
    let sources = HEAP_SUPPORT_FILES.map(|name| src_dir.join(name));

    // The directory marks completion; create it only once every source is present.
    if let Some(missing) = sources.iter().find(|src| !src.is_file()) {
        return Err(FinishError::copy_failed(
            missing,
            &heap_dir,
            "source file not found",
        ));
    }
    ensure_directory(&heap_dir)?;

    let copied = sources
        .iter()
        .map(|src| copy_into(src, &heap_dir))
        .collect::<Result<Vec<_>>>()?;

    Ok(HeapCopy::Copied(copied))
}

/// Runs the finishing sequence for one configuration.
pub struct Driver<'a, R: Reporter> {
    config: &'a Config,
    platform: Platform,
    interpreter: InterpreterSource,
    linker: Option<Box<dyn Linker>>,
    reporter: R,
}

impl<R: Reporter> std::fmt::Debug for Driver<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("linker", &self.linker)
            .finish_non_exhaustive()
    }
}

impl<'a, R: Reporter> Driver<'a, R> {
    pub fn new(config: &'a Config, platform: Platform, reporter: R) -> Self {
        Self {
            config,
            platform,
            interpreter: InterpreterSource::from_config(config),
            linker: None,
            reporter,
        }
    }

    /// Replace the interpreter probe used for facts missing from the config.
    pub fn with_probe(mut self, probe: Box<dyn Probe>) -> Self {
        self.interpreter = InterpreterSource::with_probe(self.config, probe);
        self
    }

    /// Use `linker` instead of the platform's default mechanism.
    pub fn with_linker(mut self, linker: Box<dyn Linker>) -> Self {
        self.linker = Some(linker);
        self
    }

    /// Run every step, mapping the result to a status and message.
    pub fn finish(&mut self) -> Outcome {
        match self.run() {
            Ok(_) => Outcome::success(),
            Err(e) => Outcome::failure(&e),
        }
    }

    /// Run every step, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The failing step's [`FinishError`].
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut current = Step::ResolvePlatform;
        let result = self.run_steps(&mut current);
        match &result {
            Ok(summary) => info!(
                "Python package ready at '{}'",
                summary.package_dir.display()
            ),
            Err(e) => self.reporter.failed(current, &e.to_string()),
        }
        result
    }

    fn enter(&self, current: &mut Step, step: Step) {
        *current = step;
        self.reporter.step(step);
    }

    fn run_steps(&mut self, current: &mut Step) -> Result<RunSummary> {
        let config = self.config;
        let platform = self.platform;

        self.enter(current, Step::ResolvePlatform);
        self.reporter.info(&format!("The current OS is {platform}"));

        self.enter(current, Step::ResolvePackageDir);
        let package_dir = resolve_package_dir(config, platform, &mut self.interpreter)?;
        self.reporter.info(&format!(
            "Python files will be put in '{}'",
            package_dir.display()
        ));

        self.enter(current, Step::ResolveConfigBuildDir);
        let config_build_dir = resolve_config_build_dir(config, &package_dir);
        self.reporter.info(&format!(
            "Configuration build directory located at '{}'",
            config_build_dir.display()
        ));

        self.enter(current, Step::EnsurePackageDir);
        ensure_directory(&package_dir)?;

        self.enter(current, Step::CreateAllLinks);
        let default_linker;
        let linker: &dyn Linker = match self.linker.as_deref() {
            Some(linker) => linker,
            None => {
                default_linker = linker_for(platform)?;
                default_linker.as_ref()
            }
        };
        let links = create_all_links(
            config,
            platform,
            linker,
            &package_dir,
            &mut self.interpreter,
        )?;

        self.enter(current, Step::InstallPrimaryGlueFile);
        let glue_file = install_primary_glue_file(&config_build_dir, &package_dir, platform)?;

        let mut packages = Vec::new();
        for (step, spec) in subpackage_plan(&config.source_root, platform) {
            self.enter(current, step);
            let report = assemble_package(&package_dir, platform, &spec)?;
            for missing in &report.skipped {
                self.reporter.warning(&format!(
                    "{step}: optional file '{}' not found",
                    missing.display()
                ));
            }
            packages.push((step, report));
        }

        let heap = if platform.is_darwin() {
            self.enter(current, Step::CopyHeapSupportFiles);
            let heap = copy_heap_support_files(config, platform, &package_dir)?;
            if heap == HeapCopy::AlreadyPresent {
                self.reporter
                    .skipped(Step::CopyHeapSupportFiles, "macosx/heap already exists");
            }
            heap
        } else {
            HeapCopy::NotApplicable
        };

        Ok(RunSummary {
            platform,
            package_dir,
            config_build_dir,
            links,
            glue_file,
            packages,
            heap,
        })
    }
}
