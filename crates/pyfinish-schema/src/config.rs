//! Run configuration.
//!
//! The build-system wrapper hands us a flat mapping of option names to
//! values. [`Config::from_map`] validates that mapping once; afterwards the
//! configuration is only ever borrowed.

use crate::interpreter::PythonVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while turning raw options into a [`Config`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required option was not supplied.
    #[error("Missing required option '{0}'")]
    MissingKey(&'static str),

    /// An option name we do not recognize.
    #[error("Unrecognized option '{0}'")]
    UnknownKey(String),

    /// A boolean option with a value we cannot interpret.
    #[error("Option '{key}' expects a boolean, got '{value}'")]
    InvalidBool {
        /// Option name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// A malformed `pythonVersion`.
    #[error("{0}")]
    InvalidVersion(String),
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Root of the source tree holding the support scripts.
    #[serde(alias = "srcRoot")]
    pub source_root: PathBuf,

    /// Where the framework or shared library gets put.
    pub target_dir: PathBuf,

    /// Where the generator deposited `lldb.py`, if not the package directory.
    #[serde(default, alias = "cfgBldDir", skip_serializing_if = "Option::is_none")]
    pub cfg_build_dir: Option<PathBuf>,

    /// Install root for third-party scripting modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    /// Build-configuration subdirectory under `prefix` (e.g. `Debug`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_build_configuration: Option<String>,

    /// Emit extra diagnostics.
    #[serde(default)]
    pub verbose: bool,

    /// Invoked by the command-line build driver rather than an IDE build.
    #[serde(default)]
    pub from_build_system: bool,

    /// Interpreter version; probed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<PythonVersion>,

    /// Interpreter `sys.prefix`; probed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_prefix: Option<PathBuf>,

    /// Interpreter is a reference-count debugging build; probed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_interpreter: Option<bool>,
}

impl Config {
    /// Minimal configuration with every optional field unset.
    pub fn new(source_root: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_dir: target_dir.into(),
            cfg_build_dir: None,
            prefix: None,
            cmake_build_configuration: None,
            verbose: false,
            from_build_system: false,
            python_version: None,
            python_prefix: None,
            debug_interpreter: None,
        }
    }

    /// Build a configuration from a flat option mapping.
    ///
    /// Keys may carry the leading dashes of the wrapper's switches
    /// (`--srcRoot`, `-m`). Boolean values accept `1/0`, `true/false`,
    /// `yes/no`, `on/off`, and the empty string (a bare switch) as true.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when `sourceRoot` or `targetDir`
    /// is absent, [`ConfigError::UnknownKey`] for unrecognized names, and
    /// [`ConfigError::InvalidBool`] / [`ConfigError::InvalidVersion`] for
    /// malformed values.
    pub fn from_map<I, K, V>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut source_root = None;
        let mut target_dir = None;
        let mut config = Self::new("", "");

        for (key, value) in entries {
            let key = key.as_ref().trim_start_matches('-');
            let value = value.as_ref();
            match key {
                "sourceRoot" | "srcRoot" => source_root = Some(PathBuf::from(value)),
                "targetDir" => target_dir = Some(PathBuf::from(value)),
                "cfgBuildDir" | "cfgBldDir" => config.cfg_build_dir = Some(PathBuf::from(value)),
                "prefix" => config.prefix = Some(PathBuf::from(value)),
                "cmakeBuildConfiguration" => {
                    config.cmake_build_configuration = Some(value.to_string());
                }
                "verbose" | "d" => config.verbose = parse_bool(key, value)?,
                "fromBuildSystem" | "m" => config.from_build_system = parse_bool(key, value)?,
                "pythonVersion" => {
                    config.python_version =
                        Some(value.parse().map_err(ConfigError::InvalidVersion)?);
                }
                "pythonPrefix" => config.python_prefix = Some(PathBuf::from(value)),
                "debugInterpreter" => config.debug_interpreter = Some(parse_bool(key, value)?),
                other => return Err(ConfigError::UnknownKey(other.to_string())),
            }
        }

        config.source_root = source_root.ok_or(ConfigError::MissingKey("sourceRoot"))?;
        config.target_dir = target_dir.ok_or(ConfigError::MissingKey("targetDir"))?;
        Ok(config)
    }

    /// The configured glue-file directory, ignoring an empty override.
    pub fn cfg_build_dir_override(&self) -> Option<&Path> {
        self.cfg_build_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// The configured install prefix, ignoring an empty value.
    pub fn prefix_override(&self) -> Option<&Path> {
        self.prefix.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_minimal() {
        let config = Config::from_map([("sourceRoot", "/src/lldb"), ("targetDir", "/build")])
            .unwrap();
        assert_eq!(config, Config::new("/src/lldb", "/build"));
    }

    #[test]
    fn test_from_map_accepts_wrapper_switches() {
        let config = Config::from_map([
            ("--srcRoot", "/src/lldb"),
            ("--targetDir", "/build"),
            ("--cfgBldDir", "/build/scripts"),
            ("--prefix", "/inst"),
            ("--cmakeBuildConfiguration", "Debug"),
            ("-m", ""),
            ("-d", ""),
        ])
        .unwrap();

        assert!(config.from_build_system);
        assert!(config.verbose);
        assert_eq!(config.cfg_build_dir.as_deref(), Some(Path::new("/build/scripts")));
        assert_eq!(config.prefix.as_deref(), Some(Path::new("/inst")));
        assert_eq!(config.cmake_build_configuration.as_deref(), Some("Debug"));
    }

    #[test]
    fn test_from_map_interpreter_keys() {
        let config = Config::from_map([
            ("sourceRoot", "/s"),
            ("targetDir", "/t"),
            ("pythonVersion", "2.7"),
            ("pythonPrefix", "/usr"),
            ("debugInterpreter", "yes"),
        ])
        .unwrap();
        assert_eq!(config.python_version, Some(PythonVersion::new(2, 7)));
        assert_eq!(config.debug_interpreter, Some(true));
    }

    #[test]
    fn test_from_map_errors() {
        assert_eq!(
            Config::from_map([("targetDir", "/t")]),
            Err(ConfigError::MissingKey("sourceRoot"))
        );
        assert_eq!(
            Config::from_map([("sourceRoot", "/s"), ("targetDir", "/t"), ("bogus", "1")]),
            Err(ConfigError::UnknownKey("bogus".to_string()))
        );
        assert!(matches!(
            Config::from_map([("sourceRoot", "/s"), ("targetDir", "/t"), ("verbose", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
        assert!(matches!(
            Config::from_map([("sourceRoot", "/s"), ("targetDir", "/t"), ("pythonVersion", "x")]),
            Err(ConfigError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let mut config = Config::new("/s", "/t");
        config.cfg_build_dir = Some(PathBuf::new());
        config.prefix = Some(PathBuf::new());
        assert_eq!(config.cfg_build_dir_override(), None);
        assert_eq!(config.prefix_override(), None);
    }

    #[test]
    fn test_deserialize_toml() {
        let config: Config = toml::from_str(
            r#"
            srcRoot = "/src/lldb"
            targetDir = "/build"
            fromBuildSystem = true
            pythonVersion = "3.11"
            "#,
        )
        .unwrap();
        assert_eq!(config.source_root, PathBuf::from("/src/lldb"));
        assert!(config.from_build_system);
        assert_eq!(config.python_version, Some(PythonVersion::new(3, 11)));
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            sourceRoot = "/s"
            targetDir = "/t"
            colour = "blue"
            "#,
        );
        assert!(result.is_err());
    }
}
