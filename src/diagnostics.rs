//! Recoverable warnings raised while compiling.
//!
//! Converters report problems in the body they render (an unclosed inline
//! code span, for example) without failing the build. The pipeline turns
//! each report into a [`Warning`] naming the file and line, and hands it to
//! a [`DiagnosticSink`] right away:
//!
//! ```text
//! posts/hello.md:3: warning: Closing unclosed backquotes ` at end of input
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// A warning located in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: warning: {}",
            self.path.display(),
            self.line,
            self.message
        )
    }
}

/// Receives warnings as they occur.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, warning: &Warning);
}

/// Writes each warning as one line on standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, warning: &Warning) {
        eprintln!("{warning}");
    }
}

/// Keeps warnings in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings received so far, in arrival order.
    pub fn warnings(&self) -> Vec<Warning> {
        match self.warnings.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The warnings formatted the way [`StderrSink`] prints them.
    pub fn lines(&self) -> Vec<String> {
        self.warnings().iter().map(ToString::to_string).collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, warning: &Warning) {
        let mut guard = match self.warnings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(warning.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<S> {
    fn emit(&self, warning: &Warning) {
        (**self).emit(warning)
    }
}
