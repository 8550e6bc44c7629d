//! pyfinish-core - turns binding-generator output into an importable
//! Python package.
//!
//! # Layout produced
//!
//! ```text
//! <package dir>/
//! ├── __init__.py          # the generator's lldb.py
//! ├── _lldb.so             # link to the native library (.pyd on Windows)
//! ├── lldb-argdumper       # link to the helper executable
//! ├── formatters/cpp/      # support scripts + synthesized __init__.py
//! ├── runtime/
//! ├── utils/
//! └── macosx/, diagnose/   # Darwin only
//! ```

pub mod assembler;
pub mod driver;
pub mod error;
pub mod interpreter;
pub mod links;
pub mod location;
pub mod paths;
pub mod reporter;

pub use driver::{Driver, Outcome, RunSummary, Step};
pub use error::{EXIT_PROGRAM_FAILURE, FinishError, PROGRAM_FAILURE_MARKER, Result};
pub use reporter::{NullReporter, Reporter, TracingReporter};
