use floorplan_scene::{Scene, validate_scene};

use crate::chat::ChatTurn;
use crate::error::LayoutError;
use crate::parse::parse_scene;
use crate::prompt::build_edit_messages;
use crate::provider::InferenceProvider;

/// Canned reply when an edit is requested before any scene exists.
pub const EMPTY_SCENE_REPLY: &str =
    "There is no floor plan to edit yet. Upload a photo or sketch of the store first.";

const UPDATED_REPLY: &str = "Scene updated.";

/// What one edit turn produced: a complete replacement scene with a reply
/// line, or a conversational reply with the scene left as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Replaced { scene: Scene, reply: String },
    Message(String),
}

/// Applies one instruction to the current scene. The model picks the mode:
/// a reply that parses as a scene array replaces the scene wholesale,
/// anything else is treated verbatim as conversation. `history` is the
/// caller's transcript and is read, never appended to.
pub async fn apply_instruction<P: InferenceProvider>(
    provider: &P,
    scene: &Scene,
    history: &[ChatTurn],
    instruction: &str,
) -> Result<EditOutcome, LayoutError> {
    if scene.is_empty() {
        return Ok(EditOutcome::Message(EMPTY_SCENE_REPLY.to_string()));
    }

    let messages = build_edit_messages(scene, history, instruction);
    let raw = provider.complete(&messages).await?;

    let Ok(replacement) = parse_scene(&raw) else {
        return Ok(EditOutcome::Message(raw));
    };

    let validation = validate_scene(&replacement);
    if !validation.is_valid() {
        return Err(LayoutError::Validation {
            violations: validation.errors,
            raw,
        });
    }

    let reply = replacement
        .floor_annotation()
        .unwrap_or(UPDATED_REPLY)
        .to_string();
    Ok(EditOutcome::Replaced {
        scene: replacement,
        reply,
    })
}
