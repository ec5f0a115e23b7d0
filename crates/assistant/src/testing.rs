//! Scripted completion provider for tests.

use std::sync::{Arc, Mutex};

use crate::{AssistantError, Completion, CompletionProvider, CompletionRequest};

/// Answers every prompt with `"{prefix}{prompt}"` and remembers each request.
#[derive(Debug, Clone)]
pub struct EchoProvider {
    prefix: String,
    fail: bool,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoProvider {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            fail: false,
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for EchoProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AssistantError> {
        let prompt = request.prompt.clone();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if self.fail {
            return Err(AssistantError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(Completion {
            content: format!("{}{}", self.prefix, prompt),
            model: "echo".to_string(),
        })
    }

    fn model(&self) -> &str {
        "echo"
    }
}
