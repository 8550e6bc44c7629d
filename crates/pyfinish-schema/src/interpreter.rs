//! Facts about the Python interpreter the package is built for.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A `MAJOR.MINOR` Python version.
///
/// Parses `"3.11"` and tolerates a trailing patch component (`"3.11.4"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PythonVersion {
    /// Major version (2 or 3 in practice).
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl PythonVersion {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for PythonVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts.next().and_then(|p| p.parse().ok());
        let minor = parts.next().and_then(|p| p.parse().ok());
        match (major, minor) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(format!("Invalid Python version '{s}': expected MAJOR.MINOR")),
        }
    }
}

impl TryFrom<String> for PythonVersion {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PythonVersion> for String {
    fn from(v: PythonVersion) -> Self {
        v.to_string()
    }
}

/// The interpreter whose site-packages receive the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpreter {
    /// Interpreter version.
    pub version: PythonVersion,
    /// `sys.prefix` of the interpreter.
    pub prefix: PathBuf,
    /// Built with internal reference-count debugging (`sys.gettotalrefcount`).
    pub debug_build: bool,
}

impl Interpreter {
    /// Create an interpreter description.
    pub fn new(version: PythonVersion, prefix: impl Into<PathBuf>, debug_build: bool) -> Self {
        Self {
            version,
            prefix: prefix.into(),
            debug_build,
        }
    }

    /// Interpreter prefix as a path.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Versioned library directory name, e.g. `python3.11`.
    pub fn version_dir(&self) -> String {
        format!("python{}.{}", self.version.major, self.version.minor)
    }

    /// Debug builds of Python 2 on Windows look for `foo_d.pyd` when
    /// importing `foo`. Python 3 dropped the suffix.
    pub fn wants_debug_extension_suffix(&self) -> bool {
        self.debug_build && self.version.major == 2
    }
}
