//! Model gateway: one "generate code" operation over an ordered fallback
//! cascade of model identifiers.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::llm::{ChatError, ChatMessage, ChatTransport};

/// Fallback ladder, best code generation first. Tried in order whenever a
/// model reports a quota/rate-limit error.
pub const DEFAULT_CASCADE: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama3-70b-8192",
    "mixtral-8x7b-32768",
    "llama3-8b-8192",
];

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error(
        "GROQ_API_KEY is not configured. Add it to your .agentrc file or \
         environment and try again."
    )]
    MissingApiKey,
    /// Every model in the cascade is rate-limited.
    #[error("all models in the cascade are rate-limited")]
    CascadeExhausted,
    /// Terminal non-quota failure from the remote endpoint.
    #[error("{0}")]
    Api(ChatError),
}

/// Process-wide gateway session. The cascade index is shared mutable state:
/// it only moves forward, and a compare-and-advance under the lock keeps
/// concurrent requests from skipping entries.
pub struct ModelGateway {
    transport: Arc<dyn ChatTransport>,
    cascade: Vec<String>,
    index: Mutex<usize>,
    api_key_configured: bool,
}

impl ModelGateway {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        cascade: Vec<String>,
        api_key_configured: bool,
    ) -> Self {
        Self { transport, cascade, index: Mutex::new(0), api_key_configured }
    }

    pub fn default_cascade() -> Vec<String> {
        DEFAULT_CASCADE.iter().map(|s| s.to_string()).collect()
    }

    /// Model the next invocation will use, if the cascade is not exhausted.
    pub fn current_model(&self) -> Option<String> {
        let idx = *self.index.lock().unwrap();
        self.cascade.get(idx).cloned()
    }

    /// Ask the remote model for code. Quota-classified failures advance the
    /// cascade (at most once per entry); any other failure is terminal.
    pub async fn generate_code(
        &self,
        messages: &[ChatMessage],
    ) -> Result<String, GatewayError> {
        if !self.api_key_configured {
            return Err(GatewayError::MissingApiKey);
        }

        loop {
            let idx = *self.index.lock().unwrap();
            let Some(model) = self.cascade.get(idx) else {
                warn!("all models in cascade are rate-limited");
                return Err(GatewayError::CascadeExhausted);
            };

            match self.transport.complete(model, messages).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_quota() => {
                    warn!(model = %model, error = %e, "model rate-limited");
                    self.advance(idx);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "LLM request failed");
                    return Err(GatewayError::Api(e));
                }
            }
        }
    }

    /// Move past the entry observed at `seen`. If another request already
    /// advanced the index, this is a no-op.
    fn advance(&self, seen: usize) {
        let mut idx = self.index.lock().unwrap();
        if *idx == seen {
            *idx = seen + 1;
            if let Some(next) = self.cascade.get(*idx) {
                info!(model = %next, "switching to fallback model");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm::Role;

    struct AlwaysQuota {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for AlwaysQuota {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<String, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ChatError::quota("rate limit reached"))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ChatTransport for AlwaysFails {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<String, ChatError> {
            Err(ChatError::other("invalid request"))
        }
    }

    fn question() -> Vec<ChatMessage> {
        vec![ChatMessage::new(Role::User, "how many survived?")]
    }

    #[tokio::test]
    async fn exhausts_cascade_with_one_attempt_per_entry() {
        let transport = Arc::new(AlwaysQuota { calls: AtomicUsize::new(0) });
        let gateway = ModelGateway::new(
            transport.clone(),
            ModelGateway::default_cascade(),
            true,
        );
        let err = gateway.generate_code(&question()).await.unwrap_err();
        assert!(matches!(err, GatewayError::CascadeExhausted));
        assert_eq!(transport.calls.load(Ordering::SeqCst), DEFAULT_CASCADE.len());

        // The index never resets: a later request fails without any call.
        let err = gateway.generate_code(&question()).await.unwrap_err();
        assert!(matches!(err, GatewayError::CascadeExhausted));
        assert_eq!(transport.calls.load(Ordering::SeqCst), DEFAULT_CASCADE.len());
    }

    #[tokio::test]
    async fn non_quota_error_is_terminal_without_cascade_advance() {
        let gateway = ModelGateway::new(
            Arc::new(AlwaysFails),
            ModelGateway::default_cascade(),
            true,
        );
        let err = gateway.generate_code(&question()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Api(_)));
        assert_eq!(gateway.current_model().as_deref(), Some(DEFAULT_CASCADE[0]));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_call() {
        let transport = Arc::new(AlwaysQuota { calls: AtomicUsize::new(0) });
        let gateway =
            ModelGateway::new(transport.clone(), ModelGateway::default_cascade(), false);
        let err = gateway.generate_code(&question()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
