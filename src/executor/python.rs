//! Python interpreter sandbox: runs one generated script per subprocess.
//!
//! Process isolation gives each request its own interpreter state and its
//! own parse of the dataset copy, so concurrent requests cannot observe each
//! other's mutations. No CPU/time/memory limits are imposed.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{CodeExecutor, ExecutionResult};
use crate::dataset::Dataset;

/// Interpreter preamble. Binds the namespace the system prompt promises
/// (df, pd, np, plt, sns, PLOT_PATH) around the script passed as argv[2],
/// with the Agg backend so nothing ever opens a display. A failure inside
/// the script surfaces as a one-line message on stderr and a non-zero exit.
const BOOTSTRAP: &str = r#"
import os, sys, uuid
import pandas as pd
import numpy as np
import matplotlib
matplotlib.use("Agg")
import matplotlib.pyplot as plt
import seaborn as sns

df = pd.read_csv(sys.argv[1])
with open(sys.argv[2]) as fh:
    code = fh.read()
ns = {"df": df, "pd": pd, "np": np, "plt": plt, "sns": sns,
      "PLOT_PATH": sys.argv[3], "os": os, "uuid": uuid}
try:
    exec(compile(code, "<generated>", "exec"), ns)
except Exception as exc:
    print(f"{type(exc).__name__}: {exc}", file=sys.stderr)
    sys.exit(1)
"#;

pub struct PythonExecutor {
    python_bin: String,
}

impl PythonExecutor {
    pub fn new(python_bin: impl Into<String>) -> Self {
        Self { python_bin: python_bin.into() }
    }
}

#[async_trait]
impl CodeExecutor for PythonExecutor {
    async fn execute(
        &self,
        code: &str,
        dataset: &Dataset,
        plot_path: &Path,
    ) -> ExecutionResult {
        debug!(code = %code, "executing generated code");

        // The subprocess reads its own copy of the table from disk; the temp
        // files live until the process has exited.
        let handoff = write_handoff(dataset, code);
        let (csv_file, code_file) = match handoff {
            Ok(files) => files,
            Err(e) => return ExecutionResult::failed(format!("sandbox setup failed: {e}")),
        };

        let output = Command::new(&self.python_bin)
            .arg("-u")
            .arg("-c")
            .arg(BOOTSTRAP)
            .arg(csv_file.path())
            .arg(code_file.path())
            .arg(plot_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(out) => out,
            Err(e) => {
                return ExecutionResult::failed(format!(
                    "failed to launch {}: {e}",
                    self.python_bin
                ))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            return ExecutionResult { success: true, output: stdout, error: None };
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        // The bootstrap emits a single message line; anything longer (e.g. a
        // traceback from a missing library) is reduced to its last line.
        let message = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("execution failed with no error message")
            .trim()
            .to_string();
        warn!(error = %message, "generated code execution failed");

        ExecutionResult { success: false, output: stdout, error: Some(message) }
    }
}

fn write_handoff(
    dataset: &Dataset,
    code: &str,
) -> std::io::Result<(tempfile::NamedTempFile, tempfile::NamedTempFile)> {
    let mut csv_file = tempfile::Builder::new()
        .prefix("titanic_")
        .suffix(".csv")
        .tempfile()?;
    csv_file.write_all(dataset.as_csv().as_bytes())?;
    csv_file.flush()?;

    let mut code_file = tempfile::Builder::new()
        .prefix("generated_")
        .suffix(".py")
        .tempfile()?;
    code_file.write_all(code.as_bytes())?;
    code_file.flush()?;

    Ok((csv_file, code_file))
}
