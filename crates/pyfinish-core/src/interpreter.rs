//! Lazily resolved interpreter facts.
//!
//! Site-packages layout and the Windows debug suffix depend on the Python
//! interpreter. Values given in the [`Config`] win; anything missing is
//! asked of a real interpreter, and only when a step actually needs it.

use crate::error::{FinishError, Result};
use pyfinish_schema::{Config, Interpreter, PythonVersion};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Something that can describe the target interpreter.
pub trait Probe: std::fmt::Debug {
    /// Query the interpreter.
    ///
    /// # Errors
    ///
    /// Returns [`FinishError::InterpreterUnavailable`] if no interpreter can
    /// be found or its answer cannot be understood.
    fn probe(&self) -> Result<Interpreter>;
}

const PROBE_SCRIPT: &str = "import json, sys; print(json.dumps({\
\"major\": sys.version_info[0], \
\"minor\": sys.version_info[1], \
\"prefix\": sys.prefix, \
\"debug\": hasattr(sys, \"gettotalrefcount\")}))";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    major: u32,
    minor: u32,
    prefix: PathBuf,
    debug: bool,
}

/// Runs the first `python3`/`python` found on `PATH`.
#[derive(Debug, Clone)]
pub struct PythonProbe {
    candidates: Vec<String>,
}

impl Default for PythonProbe {
    fn default() -> Self {
        Self {
            candidates: vec!["python3".to_string(), "python".to_string()],
        }
    }
}

impl PythonProbe {
    /// Probe a specific set of executable names, in order.
    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl Probe for PythonProbe {
    fn probe(&self) -> Result<Interpreter> {
        let exe = self
            .candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                FinishError::interpreter(format!(
                    "none of [{}] found on PATH",
                    self.candidates.join(", ")
                ))
            })?;

        debug!("Probing interpreter {}", exe.display());
        let output = Command::new(&exe)
            .args(["-c", PROBE_SCRIPT])
            .output()
            .map_err(|e| FinishError::interpreter(format!("{}: {e}", exe.display())))?;

        if !output.status.success() {
            return Err(FinishError::interpreter(format!(
                "{} exited with {}: {}",
                exe.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| FinishError::interpreter(format!("unexpected probe output: {e}")))?;

        Ok(Interpreter::new(
            PythonVersion::new(parsed.major, parsed.minor),
            parsed.prefix,
            parsed.debug,
        ))
    }
}

/// Config overrides plus a fallback probe, resolved at most once.
#[derive(Debug)]
pub struct InterpreterSource {
    version: Option<PythonVersion>,
    prefix: Option<PathBuf>,
    debug_build: Option<bool>,
    probe: Box<dyn Probe>,
    resolved: Option<Interpreter>,
}

impl InterpreterSource {
    /// Overrides from `config`, falling back to a [`PythonProbe`].
    pub fn from_config(config: &Config) -> Self {
        Self::with_probe(config, Box::new(PythonProbe::default()))
    }

    /// Overrides from `config`, falling back to `probe`.
    pub fn with_probe(config: &Config, probe: Box<dyn Probe>) -> Self {
        Self {
            version: config.python_version,
            prefix: config.python_prefix.clone(),
            debug_build: config.debug_interpreter,
            probe,
            resolved: None,
        }
    }

    /// The interpreter description, probing on first use if needed.
    ///
    /// # Errors
    ///
    /// Propagates the probe's error when the config does not fully describe
    /// the interpreter and probing fails.
    pub fn get(&mut self) -> Result<&Interpreter> {
        if self.resolved.is_none() {
            let interpreter = self.resolve()?;
            debug!(
                "Python {} at '{}' (debug build: {})",
                interpreter.version,
                interpreter.prefix.display(),
                interpreter.debug_build
            );
            self.resolved = Some(interpreter);
        }
        self.resolved
            .as_ref()
            .ok_or_else(|| FinishError::interpreter("interpreter was not resolved"))
    }

    fn resolve(&self) -> Result<Interpreter> {
        if let (Some(version), Some(prefix), Some(debug_build)) =
            (self.version, self.prefix.as_ref(), self.debug_build)
        {
            return Ok(Interpreter::new(version, prefix.clone(), debug_build));
        }

        let probed = self.probe.probe()?;
        Ok(Interpreter {
            version: self.version.unwrap_or(probed.version),
            prefix: self.prefix.clone().unwrap_or(probed.prefix),
            debug_build: self.debug_build.unwrap_or(probed.debug_build),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Probe that always fails and counts how often it was asked.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct FailingProbe {
        pub(crate) calls: Rc<Cell<usize>>,
    }

    impl Probe for FailingProbe {
        fn probe(&self) -> Result<Interpreter> {
            self.calls.set(self.calls.get() + 1);
            Err(FinishError::interpreter("no interpreter in tests"))
        }
    }

    /// Probe that answers with a fixed interpreter.
    #[derive(Debug, Clone)]
    pub(crate) struct FixedProbe(pub(crate) Interpreter);

    impl Probe for FixedProbe {
        fn probe(&self) -> Result<Interpreter> {
            Ok(self.0.clone())
        }
    }
}
