use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatRole};

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_OPENROUTER_MODEL: &str = "qwen/qwen2.5-vl-3b-instruct:free";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    Transport(String),
    Provider { status: u16, body: String },
    EmptyResponse,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(message) => {
                write!(f, "provider request failed: {message}")
            }
            GatewayError::Provider { status, body } => {
                write!(f, "provider returned status {status}: {body}")
            }
            GatewayError::EmptyResponse => f.write_str("provider returned no completion text"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A chat-completions backend. One request per call, no retries; returns
/// the first choice's text content.
pub trait InferenceProvider {
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// Azure OpenAI deployment endpoint. Authenticates with the `api-key`
/// header; the model is fixed by the deployment, so the body carries only
/// the messages.
#[derive(Debug, Clone)]
pub struct AzureOpenAi {
    client: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
}

impl AzureOpenAi {
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            api_key: api_key.into(),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

impl InferenceProvider for AzureOpenAi {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.request_url())
            .header("api-key", &self.api_key)
            .json(&AzureRequest { messages })
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let raw = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        log::debug!("azure completion response: {raw}");
        first_content(&raw)
    }
}

/// OpenRouter fallback. Bearer-token auth, explicit model in the body, and
/// message content flattened to plain strings (this path never carries
/// images).
#[derive(Debug, Clone)]
pub struct OpenRouter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: OPENROUTER_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl InferenceProvider for OpenRouter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let request = OpenRouterRequest {
            model: &self.model,
            messages: flatten_messages(messages),
        };
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        log::debug!("openrouter completion response: {raw}");

        if !status.is_success() {
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body: raw,
            });
        }
        first_content(&raw)
    }
}

/// The configured backend, selected once at startup.
#[derive(Debug, Clone)]
pub enum Provider {
    Azure(AzureOpenAi),
    OpenRouter(OpenRouter),
}

impl InferenceProvider for Provider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        match self {
            Provider::Azure(provider) => provider.complete(messages).await,
            Provider::OpenRouter(provider) => provider.complete(messages).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    UnknownProvider(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "environment variable {name} is not set")
            }
            ConfigError::UnknownProvider(value) => {
                write!(
                    f,
                    "unknown provider '{value}', expected 'azure' or 'openrouter'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Provider credentials, read once at binary startup.
#[derive(Debug, Clone)]
pub enum GatewayConfig {
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
        api_key: String,
    },
    OpenRouter {
        api_key: String,
        model: String,
    },
}

impl GatewayConfig {
    /// Reads `FLOORPLAN_PROVIDER` (`azure` by default, or `openrouter`)
    /// plus the selected provider's credential variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let selector =
            std::env::var("FLOORPLAN_PROVIDER").unwrap_or_else(|_| "azure".to_string());
        match selector.as_str() {
            "azure" => Ok(GatewayConfig::Azure {
                endpoint: required_var("AZURE_OPENAI_ENDPOINT")?,
                deployment: required_var("AZURE_OPENAI_DEPLOYMENT")?,
                api_version: required_var("AZURE_OPENAI_API_VERSION")?,
                api_key: required_var("AZURE_OPENAI_API_KEY")?,
            }),
            "openrouter" => Ok(GatewayConfig::OpenRouter {
                api_key: required_var("OPENROUTER_API_KEY")?,
                model: std::env::var("OPENROUTER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OPENROUTER_MODEL.to_string()),
            }),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    pub fn into_provider(self) -> Provider {
        match self {
            GatewayConfig::Azure {
                endpoint,
                deployment,
                api_version,
                api_key,
            } => Provider::Azure(AzureOpenAi::new(endpoint, deployment, api_version, api_key)),
            GatewayConfig::OpenRouter { api_key, model } => {
                Provider::OpenRouter(OpenRouter::new(api_key, model))
            }
        }
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[derive(Debug, Serialize)]
struct AzureRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<FlatMessage>,
}

#[derive(Debug, Serialize)]
struct FlatMessage {
    role: ChatRole,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: CompletionMessage,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

fn flatten_messages(messages: &[ChatMessage]) -> Vec<FlatMessage> {
    messages
        .iter()
        .map(|message| FlatMessage {
            role: message.role,
            content: message.content.flattened_text(),
        })
        .collect()
}

fn first_content(raw: &str) -> Result<String, GatewayError> {
    let completion: ChatCompletion = serde_json::from_str(raw).map_err(|err| {
        GatewayError::Transport(format!("provider response was not valid JSON: {err}"))
    })?;

    let text = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
}
