//! Where the package goes.
//!
//! Two layouts exist:
//!
//! - **site-packages**: Windows always, and POSIX hosts when the
//!   command-line build driver invoked us. `<root>/Lib/site-packages/lldb`
//!   on Windows, `<root>/lib/pythonX.Y/site-packages/lldb` elsewhere.
//! - **framework**: POSIX IDE builds put the package inside
//!   `<targetDir>/LLDB.framework/Resources/Python/lldb`, and the framework
//!   must already exist.

use crate::error::{FinishError, Result};
use crate::interpreter::InterpreterSource;
use crate::paths::{normalize, normcase};
use pyfinish_schema::{Config, PACKAGE_NAME, Platform};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name of the framework bundle produced by IDE builds.
pub const FRAMEWORK_DIR: &str = "LLDB.framework";

/// Compute the absolute package directory for this run.
///
/// # Errors
///
/// - [`FinishError::UnknownPlatform`] when `platform` is [`Platform::Unknown`].
/// - [`FinishError::FrameworkDirectoryMissing`] for POSIX IDE builds whose
///   framework directory does not exist.
/// - [`FinishError::InterpreterUnavailable`] when the site-packages layout
///   needs interpreter facts that cannot be obtained.
pub fn resolve_package_dir(
    config: &Config,
    platform: Platform,
    interpreter: &mut InterpreterSource,
) -> Result<PathBuf> {
    match platform {
        Platform::Unknown => Err(FinishError::UnknownPlatform),
        Platform::Windows => site_package_dir(config, platform, interpreter),
        Platform::Darwin | Platform::OtherUnix if config.from_build_system => {
            debug!("Built by the command-line build driver");
            site_package_dir(config, platform, interpreter)
        }
        Platform::Darwin | Platform::OtherUnix => {
            debug!("Built by an IDE");
            framework_package_dir(config, platform)
        }
    }
}

/// Directory holding the generator's `lldb.py`.
///
/// The configured override when present and non-empty, otherwise the
/// package directory itself.
pub fn resolve_config_build_dir(config: &Config, package_dir: &Path) -> PathBuf {
    config
        .cfg_build_dir_override()
        .map_or_else(|| package_dir.to_path_buf(), Path::to_path_buf)
}

/// `<site-packages>/lldb` for the configured prefix or the interpreter's own.
///
/// # Errors
///
/// Returns [`FinishError::InterpreterUnavailable`] when the interpreter is
/// needed (no prefix, or a POSIX versioned layout) and cannot be resolved.
pub fn site_package_dir(
    config: &Config,
    platform: Platform,
    interpreter: &mut InterpreterSource,
) -> Result<PathBuf> {
    let root = match config.prefix_override() {
        Some(prefix) => {
            let prefix = normalize(prefix);
            match config.cmake_build_configuration.as_deref() {
                Some(cfg) if !cfg.is_empty() => prefix.join(cfg),
                _ => prefix,
            }
        }
        None => interpreter.get()?.prefix.clone(),
    };

    let site_packages = if platform.is_windows() {
        root.join("Lib").join("site-packages")
    } else {
        root.join("lib")
            .join(interpreter.get()?.version_dir())
            .join("site-packages")
    };

    Ok(normcase(&site_packages.join(PACKAGE_NAME), platform))
}

fn framework_package_dir(config: &Config, platform: Platform) -> Result<PathBuf> {
    let framework = config.target_dir.join(FRAMEWORK_DIR);
    if !framework.is_dir() {
        return Err(FinishError::FrameworkDirectoryMissing { path: framework });
    }
    debug!("Found '{}'", framework.display());

    let dir = framework
        .join("Resources")
        .join("Python")
        .join(PACKAGE_NAME);
    Ok(normcase(&dir, platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::testing::{FailingProbe, FixedProbe};
    use pyfinish_schema::{Interpreter, PythonVersion};

    fn failing_source(config: &Config) -> InterpreterSource {
        InterpreterSource::with_probe(config, Box::new(FailingProbe::default()))
    }

    fn fixed_source(config: &Config) -> InterpreterSource {
        let interpreter = Interpreter::new(PythonVersion::new(3, 11), "/usr", false);
        InterpreterSource::with_probe(config, Box::new(FixedProbe(interpreter)))
    }

    #[test]
    fn test_unknown_platform_fails() {
        let config = Config::new("/src", "/build");
        let result = resolve_package_dir(&config, Platform::Unknown, &mut failing_source(&config));
        assert!(matches!(result, Err(FinishError::UnknownPlatform)));
    }

    #[test]
    fn test_windows_prefix_without_build_configuration() {
        let mut config = Config::new("/src", "/build");
        config.from_build_system = true;
        config.prefix = Some(PathBuf::from("/inst"));

        let probe = FailingProbe::default();
        let calls = probe.calls.clone();
        let mut source = InterpreterSource::with_probe(&config, Box::new(probe));

        let dir = resolve_package_dir(&config, Platform::Windows, &mut source).unwrap();
        assert_eq!(dir, PathBuf::from("\\inst\\lib\\site-packages\\lldb"));
        assert_eq!(calls.get(), 0, "prefix alone must not need the interpreter");
    }

    #[test]
    fn test_windows_prefix_with_build_configuration() {
        let mut config = Config::new("/src", "/build");
        config.prefix = Some(PathBuf::from("/Inst/./tools"));
        config.cmake_build_configuration = Some("Debug".to_string());

        let dir =
            resolve_package_dir(&config, Platform::Windows, &mut failing_source(&config)).unwrap();
        assert_eq!(dir, PathBuf::from("\\inst\\tools\\debug\\lib\\site-packages\\lldb"));
    }

    #[test]
    fn test_windows_without_prefix_uses_interpreter() {
        let mut config = Config::new("/src", "/build");
        config.python_prefix = Some(PathBuf::from("/Python27"));
        config.python_version = Some(PythonVersion::new(2, 7));
        config.debug_interpreter = Some(false);

        let dir =
            resolve_package_dir(&config, Platform::Windows, &mut failing_source(&config)).unwrap();
        assert_eq!(dir, PathBuf::from("\\python27\\lib\\site-packages\\lldb"));
    }

    #[test]
    fn test_posix_build_system_uses_versioned_site_packages() {
        let mut config = Config::new("/src", "/build");
        config.from_build_system = true;
        config.prefix = Some(PathBuf::from("/build"));

        let dir =
            resolve_package_dir(&config, Platform::OtherUnix, &mut fixed_source(&config)).unwrap();
        assert_eq!(
            dir,
            PathBuf::from("/build/lib/python3.11/site-packages/lldb")
        );
    }

    #[test]
    fn test_posix_ide_build_missing_framework() {
        let mut config = Config::new("/src", "/build/out");
        config.from_build_system = false;

        let result =
            resolve_package_dir(&config, Platform::OtherUnix, &mut failing_source(&config));
        match result {
            Err(FinishError::FrameworkDirectoryMissing { path }) => {
                assert_eq!(path, PathBuf::from("/build/out/LLDB.framework"));
            }
            other => panic!("expected FrameworkDirectoryMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_posix_ide_build_with_framework() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(FRAMEWORK_DIR)).unwrap();
        let config = Config::new("/src", tmp.path());

        let dir = resolve_package_dir(&config, Platform::Darwin, &mut failing_source(&config))
            .unwrap();
        assert_eq!(
            dir,
            tmp.path().join("LLDB.framework/Resources/Python/lldb")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut config = Config::new("/src", "/build");
        config.prefix = Some(PathBuf::from("/inst"));

        for platform in [Platform::Windows, Platform::OtherUnix] {
            for from_build_system in [true, false] {
                config.from_build_system = from_build_system;
                let first = resolve_package_dir(&config, platform, &mut fixed_source(&config));
                let second = resolve_package_dir(&config, platform, &mut fixed_source(&config));
                assert_eq!(
                    first.map_err(|e| e.to_string()),
                    second.map_err(|e| e.to_string())
                );
            }
        }
    }

    #[test]
    fn test_config_build_dir_fallback() {
        let package_dir = Path::new("/pkg/lldb");
        let mut config = Config::new("/src", "/build");
        assert_eq!(resolve_config_build_dir(&config, package_dir), package_dir);

        config.cfg_build_dir = Some(PathBuf::new());
        assert_eq!(resolve_config_build_dir(&config, package_dir), package_dir);

        config.cfg_build_dir = Some(PathBuf::from("/build/scripts"));
        assert_eq!(
            resolve_config_build_dir(&config, package_dir),
            PathBuf::from("/build/scripts")
        );
    }
}
