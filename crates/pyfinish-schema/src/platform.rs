//! Host platform classification.
//!
//! Every path, extension and link decision branches on the [`Platform`].
//! It is resolved once per run and passed around as a plain value.
//!
//! # Example
//!
//! ```
//! use pyfinish_schema::Platform;
//!
//! let current = Platform::current();
//! println!("Running on: {}", current);
//! ```

/// The closed set of platforms the package layout knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows: hard links, `.pyd` extension modules, `Lib/site-packages`.
    Windows,
    /// macOS: symlinks, framework builds, extra `macosx`/`diagnose` packages.
    Darwin,
    /// Linux and the BSDs: symlinks, `lib/pythonX.Y/site-packages`.
    #[serde(rename = "unix")]
    OtherUnix,
    /// A host we cannot classify. Platform-dependent steps fail on it.
    Unknown,
}

/// The filesystem alias mechanism used for links into the package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `symlink(2)`; the link stores a path relative to the package directory.
    Symbolic,
    /// A hard link; presents as an ordinary file once created.
    Hard,
}

impl Platform {
    /// Classify the platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else if cfg!(unix) {
            Self::OtherUnix
        } else {
            Self::Unknown
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Darwin => "darwin",
            Self::OtherUnix => "unix",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is [`Platform::Windows`].
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Whether this is [`Platform::Darwin`].
    pub fn is_darwin(&self) -> bool {
        matches!(self, Self::Darwin)
    }

    /// Suffix appended to helper executable names (`.exe` on Windows).
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            _ => "",
        }
    }

    /// Suffix of the native shared library produced by the build.
    pub fn shared_lib_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".dll",
            Self::Darwin => ".dylib",
            Self::OtherUnix => ".so",
            Self::Unknown => "",
        }
    }

    /// Suffix the Python interpreter looks for on native extension modules.
    ///
    /// Darwin uses `.so` too: the interpreter does not load `.dylib` modules.
    pub fn extension_module_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".pyd",
            _ => ".so",
        }
    }

    /// Link mechanism for this platform, or `None` when unknown.
    pub fn link_kind(&self) -> Option<LinkKind> {
        match self {
            Self::Windows => Some(LinkKind::Hard),
            Self::Darwin | Self::OtherUnix => Some(LinkKind::Symbolic),
            Self::Unknown => None,
        }
    }

    /// Number of parent directories between a site-packages `lldb` package
    /// and the build root.
    ///
    /// Windows: `build\Lib\site-packages\lldb` (3).
    /// POSIX: `build/lib/pythonX.Y/site-packages/lldb` (4).
    pub fn build_root_depth(&self) -> usize {
        match self {
            Self::Windows => 3,
            _ => 4,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win32" | "win" => Ok(Self::Windows),
            "darwin" | "macos" | "macosx" => Ok(Self::Darwin),
            "unix" | "linux" | "freebsd" | "netbsd" | "openbsd" => Ok(Self::OtherUnix),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_is_classified() {
        #[cfg(target_os = "linux")]
        assert_eq!(Platform::current(), Platform::OtherUnix);
        #[cfg(target_os = "macos")]
        assert_eq!(Platform::current(), Platform::Darwin);
        #[cfg(windows)]
        assert_eq!(Platform::current(), Platform::Windows);
    }

    #[test]
    fn test_naming_conventions() {
        assert_eq!(Platform::Windows.exe_suffix(), ".exe");
        assert_eq!(Platform::Darwin.exe_suffix(), "");
        assert_eq!(Platform::Darwin.shared_lib_suffix(), ".dylib");
        assert_eq!(Platform::OtherUnix.shared_lib_suffix(), ".so");
        assert_eq!(Platform::Windows.extension_module_suffix(), ".pyd");
        assert_eq!(Platform::Darwin.extension_module_suffix(), ".so");
    }

    #[test]
    fn test_link_kind_and_depth() {
        assert_eq!(Platform::Windows.link_kind(), Some(LinkKind::Hard));
        assert_eq!(Platform::OtherUnix.link_kind(), Some(LinkKind::Symbolic));
        assert_eq!(Platform::Unknown.link_kind(), None);
        assert_eq!(Platform::Windows.build_root_depth(), 3);
        assert_eq!(Platform::Darwin.build_root_depth(), 4);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Win32".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("macosx".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::OtherUnix);
        assert!("plan9".parse::<Platform>().is_err());
    }
}
