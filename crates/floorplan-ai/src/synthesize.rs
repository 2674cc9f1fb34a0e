use floorplan_scene::{Scene, validate_scene};

use crate::chat::ImageAttachment;
use crate::error::LayoutError;
use crate::parse::parse_scene;
use crate::prompt::build_analysis_messages;
use crate::provider::InferenceProvider;

/// Canned reply when analysis is requested with nothing to analyze.
pub const NO_IMAGES_REPLY: &str =
    "Upload at least one photo or sketch of the store and I will draft a floor plan.";

const DRAFTED_REPLY: &str = "Here is the floor plan drafted from your images.";

/// What one analysis request produced: a freshly drafted scene with a
/// report line, or a plain message when there was nothing to analyze.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Scene { scene: Scene, reply: String },
    Message(String),
}

/// Drafts a scene from uploaded images. Invalid model output is surfaced
/// as an error, never repaired; on failure the caller keeps whatever scene
/// it already had.
pub async fn analyze_images<P: InferenceProvider>(
    provider: &P,
    images: &[ImageAttachment],
) -> Result<AnalysisOutcome, LayoutError> {
    if images.is_empty() {
        return Ok(AnalysisOutcome::Message(NO_IMAGES_REPLY.to_string()));
    }

    let messages = build_analysis_messages(images);
    let raw = provider.complete(&messages).await?;

    let scene = parse_scene(&raw).map_err(|err| LayoutError::Parse {
        detail: err.to_string(),
        raw: raw.clone(),
    })?;

    let validation = validate_scene(&scene);
    if !validation.is_valid() {
        return Err(LayoutError::Validation {
            violations: validation.errors,
            raw,
        });
    }

    let reply = scene
        .floor_annotation()
        .unwrap_or(DRAFTED_REPLY)
        .to_string();
    Ok(AnalysisOutcome::Scene { scene, reply })
}

#[cfg(test)]
mod tests {
    use floorplan_scene::ItemRole;

    use super::{AnalysisOutcome, DRAFTED_REPLY, NO_IMAGES_REPLY, analyze_images};
    use crate::chat::{ChatRole, ImageAttachment, MessageContent};
    use crate::error::LayoutError;
    use crate::provider::GatewayError;
    use crate::testutil::ScriptedProvider;

    const VALID_SCENE: &str = r#"[
        {"type": "box", "role": "floor", "position": [0, 0, 0], "scale": [8.0, 0.1, 6.0],
         "annotation": "1 image, 8.0m x 6.0m floor, fridge and shelf detected"},
        {"type": "box", "role": "wall", "position": [0.0, 1.25, -3.0], "scale": [8.0, 2.5, 0.1]},
        {"type": "model", "role": "furniture", "path": "models/fridge.glb",
         "position": [2.0, 0.9, 1.0], "scale": [0.7, 1.8, 0.65]}
    ]"#;

    fn one_image() -> Vec<ImageAttachment> {
        vec![ImageAttachment::from_base64("aGk=")]
    }

    #[tokio::test]
    async fn zero_images_short_circuits_without_a_model_call() {
        let provider = ScriptedProvider::default();
        let outcome = analyze_images(&provider, &[])
            .await
            .expect("zero images should produce a message outcome");

        assert_eq!(
            outcome,
            AnalysisOutcome::Message(NO_IMAGES_REPLY.to_string())
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn valid_reply_becomes_a_scene_with_the_annotation_as_report() {
        let provider = ScriptedProvider::default().with_reply(VALID_SCENE);
        let outcome = analyze_images(&provider, &one_image())
            .await
            .expect("valid reply should produce a scene");

        let AnalysisOutcome::Scene { scene, reply } = outcome else {
            panic!("expected a scene outcome");
        };
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.items[0].role, ItemRole::Floor);
        assert_eq!(reply, "1 image, 8.0m x 6.0m floor, fridge and shelf detected");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn reply_without_annotation_gets_the_generic_report() {
        let bare = r#"[{"type": "box", "role": "floor", "scale": [8.0, 0.1, 6.0]}]"#;
        let provider = ScriptedProvider::default().with_reply(bare);
        let outcome = analyze_images(&provider, &one_image())
            .await
            .expect("valid reply should produce a scene");

        let AnalysisOutcome::Scene { reply, .. } = outcome else {
            panic!("expected a scene outcome");
        };
        assert_eq!(reply, DRAFTED_REPLY);
    }

    #[tokio::test]
    async fn fenced_reply_still_parses() {
        let fenced = format!("```json\n{VALID_SCENE}\n```");
        let provider = ScriptedProvider::default().with_reply(&fenced);
        let outcome = analyze_images(&provider, &one_image())
            .await
            .expect("fenced reply should produce a scene");
        assert!(matches!(outcome, AnalysisOutcome::Scene { .. }));
    }

    #[tokio::test]
    async fn request_carries_the_rules_and_every_image() {
        let provider = ScriptedProvider::default().with_reply(VALID_SCENE);
        let images = vec![
            ImageAttachment::from_base64("Zmlyc3Q="),
            ImageAttachment::from_base64("c2Vjb25k"),
        ];
        analyze_images(&provider, &images)
            .await
            .expect("valid reply should produce a scene");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0];
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(
            messages[0]
                .content
                .flattened_text()
                .contains("Layout rules:")
        );

        let MessageContent::Parts(parts) = &messages[1].content else {
            panic!("user message should carry content parts");
        };
        assert_eq!(parts.len(), 3);
    }

    #[tokio::test]
    async fn malformed_reply_is_a_parse_error_carrying_the_raw_text() {
        let provider = ScriptedProvider::default().with_reply("Sorry, I cannot see the images.");
        let error = analyze_images(&provider, &one_image())
            .await
            .expect_err("prose reply should fail analysis");

        let LayoutError::Parse { raw, .. } = error else {
            panic!("expected a parse error, got {error:?}");
        };
        assert_eq!(raw, "Sorry, I cannot see the images.");
    }

    #[tokio::test]
    async fn floating_item_is_a_validation_error() {
        let floating = r#"[
            {"type": "box", "role": "floor", "scale": [8.0, 0.1, 6.0]},
            {"type": "box", "role": "furniture", "position": [1.0, 2.0, 1.0], "scale": [1.0, 1.0, 1.0]}
        ]"#;
        let provider = ScriptedProvider::default().with_reply(floating);
        let error = analyze_images(&provider, &one_image())
            .await
            .expect_err("floating item should fail validation");

        let LayoutError::Validation { violations, raw } = error else {
            panic!("expected a validation error, got {error:?}");
        };
        assert!(
            violations
                .iter()
                .any(|violation| violation.contains("item 1 must rest on the floor"))
        );
        assert_eq!(raw, floating);
    }

    #[tokio::test]
    async fn empty_array_reply_fails_validation() {
        let provider = ScriptedProvider::default().with_reply("[]");
        let error = analyze_images(&provider, &one_image())
            .await
            .expect_err("empty scene should fail validation");
        assert!(matches!(error, LayoutError::Validation { .. }));
    }

    #[tokio::test]
    async fn gateway_failures_propagate_unchanged() {
        let provider = ScriptedProvider::default().with_failure(GatewayError::EmptyResponse);
        let error = analyze_images(&provider, &one_image())
            .await
            .expect_err("gateway failure should propagate");
        assert_eq!(error, LayoutError::EmptyResponse);
    }
}
