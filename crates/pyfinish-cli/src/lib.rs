//! pyfinish - finish SWIG Python output into an importable `lldb` package
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! The build system runs this after SWIG has generated `lldb.py`. Options
//! mirror the switches the build-system wrapper passes; a TOML file with
//! the same keys can supply any of them, and switches on the command line
//! win over the file.

use anyhow::{Context, Result};
use clap::Parser;
use pyfinish_schema::{Config, Platform, PythonVersion};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "pyfinish")]
#[command(author, version = env!("PYFINISH_VERSION"))]
#[command(about = "Assemble the lldb Python package from SWIG output")]
pub struct Cli {
    /// Root of the lldb source tree
    #[arg(long = "srcRoot", value_name = "DIR")]
    pub src_root: Option<PathBuf>,

    /// Where the lldb framework or shared library gets put
    #[arg(long = "targetDir", value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Where SWIG put the lldb.py it generated
    #[arg(long = "cfgBldDir", value_name = "DIR")]
    pub cfg_bld_dir: Option<PathBuf>,

    /// Root under which third-party Python modules are installed
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Build configuration subdirectory under --prefix (e.g. Debug)
    #[arg(long = "cmakeBuildConfiguration", value_name = "NAME")]
    pub cmake_build_configuration: Option<String>,

    /// Invoked from the command-line build system rather than an IDE
    #[arg(short = 'm', long = "fromBuildSystem")]
    pub from_build_system: bool,

    /// Print additional information while running
    #[arg(short = 'd', long = "verbose")]
    pub verbose: bool,

    /// Target Python version (MAJOR.MINOR); probed if omitted
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<PythonVersion>,

    /// Target Python sys.prefix; probed if omitted
    #[arg(long, value_name = "DIR")]
    pub python_prefix: Option<PathBuf>,

    /// Target Python is a reference-count debugging build (true/false)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub debug_interpreter: Option<bool>,

    /// Override the detected host platform (windows, darwin, unix)
    #[arg(long, value_name = "NAME")]
    pub platform: Option<Platform>,

    /// TOML file of options, keyed like the switches (sourceRoot, targetDir, ...)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Platform to run for: the override, or the host.
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// Command-line switches as flat option entries.
    pub fn entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            entries.insert(key.to_string(), value);
        };

        if let Some(p) = &self.src_root {
            put("sourceRoot", p.display().to_string());
        }
        if let Some(p) = &self.target_dir {
            put("targetDir", p.display().to_string());
        }
        if let Some(p) = &self.cfg_bld_dir {
            put("cfgBuildDir", p.display().to_string());
        }
        if let Some(p) = &self.prefix {
            put("prefix", p.display().to_string());
        }
        if let Some(c) = &self.cmake_build_configuration {
            put("cmakeBuildConfiguration", c.clone());
        }
        if self.from_build_system {
            put("fromBuildSystem", "true".to_string());
        }
        if self.verbose {
            put("verbose", "true".to_string());
        }
        if let Some(v) = self.python_version {
            put("pythonVersion", v.to_string());
        }
        if let Some(p) = &self.python_prefix {
            put("pythonPrefix", p.display().to_string());
        }
        if let Some(debug) = self.debug_interpreter {
            put("debugInterpreter", debug.to_string());
        }
        entries
    }

    /// Merge the config file (if any) with the switches and validate.
    pub fn to_config(&self) -> Result<Config> {
        let mut entries = match &self.config {
            Some(path) => load_config_file(path)?,
            None => BTreeMap::new(),
        };
        entries.extend(self.entries());

        Config::from_map(&entries).context("Invalid options")
    }
}

/// Read a TOML options file into flat entries.
///
/// Keys are canonicalized so that an alias in the file (`srcRoot`) is
/// overridden by the matching switch on the command line.
pub fn load_config_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => anyhow::bail!(
                    "Config key '{key}' in {} must be a string or boolean, got {}",
                    path.display(),
                    other.type_str()
                ),
            };
            Ok((canonical_key(&key).to_string(), value))
        })
        .collect()
}

fn canonical_key(key: &str) -> &str {
    match key {
        "srcRoot" => "sourceRoot",
        "cfgBldDir" => "cfgBuildDir",
        other => other,
    }
}
