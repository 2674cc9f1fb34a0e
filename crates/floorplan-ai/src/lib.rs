pub mod chat;
pub mod edit;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod synthesize;

#[cfg(test)]
mod testutil;

pub use chat::{
    ChatMessage, ChatRole, ChatTurn, ContentPart, ImageAttachment, ImageUrl, MessageContent,
};
pub use edit::{EMPTY_SCENE_REPLY, EditOutcome, apply_instruction};
pub use error::LayoutError;
pub use parse::{parse_scene, strip_code_fences};
pub use prompt::{
    REFERENCE_ASSETS, ReferenceAsset, analysis_system_prompt, build_analysis_messages,
    build_edit_messages, edit_system_prompt,
};
pub use provider::{
    AzureOpenAi, ConfigError, DEFAULT_OPENROUTER_MODEL, GatewayConfig, GatewayError,
    InferenceProvider, OPENROUTER_URL, OpenRouter, Provider,
};
pub use synthesize::{AnalysisOutcome, NO_IMAGES_REPLY, analyze_images};
