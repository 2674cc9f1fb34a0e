use std::collections::VecDeque;
use std::sync::Mutex;

use crate::chat::ChatMessage;
use crate::provider::{GatewayError, InferenceProvider};

/// Provider double that replays queued responses in order and records
/// every request it receives.
#[derive(Debug, Default)]
pub(crate) struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub(crate) fn with_reply(mut self, raw: &str) -> Self {
        self.responses
            .get_mut()
            .expect("response queue should lock")
            .push_back(Ok(raw.to_string()));
        self
    }

    pub(crate) fn with_failure(mut self, error: GatewayError) -> Self {
        self.responses
            .get_mut()
            .expect("response queue should lock")
            .push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .expect("request log should lock")
            .clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().expect("request log should lock").len()
    }
}

impl InferenceProvider for ScriptedProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        self.requests
            .lock()
            .expect("request log should lock")
            .push(messages.to_vec());
        self.responses
            .lock()
            .expect("response queue should lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(GatewayError::Transport(
                    "no scripted response remaining".to_string(),
                ))
            })
    }
}
