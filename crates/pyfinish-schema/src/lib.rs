//! Shared value types for pyfinish: the run configuration, the host
//! platform and the target Python interpreter.

pub mod config;
pub mod interpreter;
pub mod platform;

// Re-exports
pub use config::{Config, ConfigError};
pub use interpreter::{Interpreter, PythonVersion};
pub use platform::{LinkKind, Platform};

/// Name of the top-level Python package.
pub const PACKAGE_NAME: &str = "lldb";

/// Name of the package init file.
pub const INIT_FILE: &str = "__init__.py";
