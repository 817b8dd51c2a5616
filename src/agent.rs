//! Query-to-answer orchestration: prompt build, model invocation over the
//! cascade, sanitization, sandboxed execution, single retry, and response
//! assembly. Every per-request path resolves to a [`QueryResult`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dataset::Dataset,
    executor::{CodeExecutor, ExecutionResult},
    gateway::{GatewayError, ModelGateway},
    llm::{ChatMessage, Role},
    prompt::{build_retry_prompt, build_system_prompt},
    sanitize::clean_code,
};

const RATE_LIMITED_MSG: &str =
    "All models are currently rate-limited. Please wait a minute and try again.";
const QUOTA_REACHED_MSG: &str =
    "API quota reached. Please wait a moment and try again.";
const NO_OUTPUT_MSG: &str =
    "The analysis ran but produced no printable output. Try rephrasing.";
const VISUALISATION_MSG: &str = "Here is the visualisation:";

/// The only value crossing the core's outer boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub text: String,
    pub image: Option<PathBuf>,
}

impl QueryResult {
    fn text_only(text: impl Into<String>) -> Self {
        Self { text: text.into(), image: None }
    }
}

pub struct Agent {
    gateway: ModelGateway,
    executor: Box<dyn CodeExecutor>,
    dataset: Dataset,
    plot_dir: PathBuf,
}

impl Agent {
    pub fn new(
        gateway: ModelGateway,
        executor: Box<dyn CodeExecutor>,
        dataset: Dataset,
        plot_dir: PathBuf,
    ) -> Result<Self> {
        std::fs::create_dir_all(&plot_dir)
            .with_context(|| format!("failed to create plot dir {}", plot_dir.display()))?;
        Ok(Self { gateway, executor, dataset, plot_dir })
    }

    /// Answer one natural-language question about the dataset.
    pub async fn answer(&self, question: &str) -> QueryResult {
        // Reserve a unique artifact path for this request.
        let short = Uuid::new_v4().simple().to_string();
        let plot_path = self.plot_dir.join(format!("plot_{}.png", &short[..8]));

        let mut messages = vec![
            ChatMessage::new(Role::System, build_system_prompt(&plot_path.to_string_lossy())),
            ChatMessage::new(Role::User, question),
        ];

        let code = match self.gateway.generate_code(&messages).await {
            Ok(raw) => clean_code(&raw),
            Err(GatewayError::MissingApiKey) => {
                return QueryResult::text_only(GatewayError::MissingApiKey.to_string());
            }
            Err(GatewayError::CascadeExhausted) => {
                return QueryResult::text_only(RATE_LIMITED_MSG);
            }
            Err(GatewayError::Api(e)) => {
                return QueryResult::text_only(format!("Could not contact the model API: {e}"));
            }
        };

        let dataset = self.dataset.copy();
        let mut result = self.executor.execute(&code, &dataset, &plot_path).await;

        // Retry once, only when the failure happened before any output.
        if result.failed_silently() {
            info!("retrying with error context");
            let error = result.error.clone().unwrap_or_default();
            messages.push(ChatMessage::new(Role::User, build_retry_prompt(&error, &code)));

            match self.gateway.generate_code(&messages).await {
                Ok(raw) => {
                    let code = clean_code(&raw);
                    result = self.executor.execute(&code, &dataset, &plot_path).await;
                }
                Err(GatewayError::CascadeExhausted) => {
                    return QueryResult::text_only(QUOTA_REACHED_MSG);
                }
                Err(e) => {
                    warn!(error = %e, "retry also failed");
                    result = ExecutionResult::failed(e.to_string());
                }
            }
        }

        let image = detect_artifact(&plot_path);
        assemble(result, image)
    }
}

/// A non-empty file at the reserved path is the sole signal that a chart was
/// produced; zero-byte placeholders are deleted.
fn detect_artifact(plot_path: &Path) -> Option<PathBuf> {
    match std::fs::metadata(plot_path) {
        Ok(meta) if meta.len() > 0 => {
            info!(path = %plot_path.display(), "plot written");
            Some(plot_path.to_path_buf())
        }
        Ok(_) => {
            let _ = std::fs::remove_file(plot_path);
            None
        }
        Err(_) => None,
    }
}

fn assemble(result: ExecutionResult, image: Option<PathBuf>) -> QueryResult {
    let text = result.output.trim().to_string();

    if text.is_empty() {
        if let Some(image) = image {
            return QueryResult { text: VISUALISATION_MSG.into(), image: Some(image) };
        }
        if let Some(err) = result.error {
            return QueryResult::text_only(format!(
                "I ran into an error while analysing your request: `{err}`\n\n\
                 Please try rephrasing your question."
            ));
        }
        return QueryResult::text_only(NO_OUTPUT_MSG);
    }

    QueryResult { text, image }
}
