//! Execution sandbox: protocol and result types.
//!
//! The sandbox is a pluggable seam so the orchestration loop can be driven by
//! a scripted executor in tests while production runs generated code in an
//! isolated interpreter process.

use std::path::Path;

use async_trait::async_trait;

use crate::dataset::Dataset;

pub mod python;

/// Outcome of one execution attempt. `output` is whatever the script printed
/// to stdout; on failure `error` carries the interpreter's message.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self { success: true, output: output.into(), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, output: String::new(), error: Some(error.into()) }
    }

    /// True when the attempt failed before producing any meaningful output,
    /// the only situation that triggers the retry cycle.
    pub fn failed_silently(&self) -> bool {
        !self.success && self.output.trim().is_empty()
    }
}

/// Runs one generated script against a bound namespace (the dataset copy,
/// numeric/plotting libraries, the reserved plot path) and captures stdout.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(
        &self,
        code: &str,
        dataset: &Dataset,
        plot_path: &Path,
    ) -> ExecutionResult;
}
