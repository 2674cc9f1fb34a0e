use floorplan_scene::Scene;

use crate::chat::{ChatMessage, ChatTurn, ContentPart, ImageAttachment, ImageUrl, MessageContent};

const SCENE_RULES: &str = r#"Scene item format (one JSON object per item):
- "type": "box" for a solid block, "model" for a catalog asset.
- "role": "floor", "wall", or "furniture".
- "path": catalog asset path, required when "type" is "model".
- "position", "rotation", "scale": triples of numbers. Units are meters, Y-up, rotation in degrees.
- "color": optional CSS color for boxes.
- "annotation": optional free text, floor item only.

Layout rules:
- Emit exactly one floor item and emit it first: a box with role "floor", position [0, 0, 0], and scale [width, 0.1, depth].
- Add wall items along the floor edges, but omit or shorten the customer-facing wall so the entrance stays open.
- Keep every other item inside the floor footprint: |position.x| <= width / 2 and |position.z| <= depth / 2.
- Rest every other item on the floor: position.y = scale.y / 2."#;

const ANALYSIS_GUIDANCE: &str = r#"Reading the inputs:
- Prefer a sketch for the wall structure and a photo for real-world scale when both are present.
- Estimate the floor footprint in meters from whatever evidence the images give.
- Size "model" items with the reference catalog below.

Diagnostics:
- Set the floor item's "annotation" to a short report: how many images were provided, the estimated floor dimensions, and the objects detected.

Output:
- Respond with the JSON array only. No prose, no markdown fences."#;

const EDIT_GUIDANCE: &str = r#"Editing rules:
- Apply the user's instruction and respond with the complete replacement scene as a bare JSON array, never a diff.
- Do not change items unrelated to the instruction.
- Put any reply for the user in the floor item's "annotation".
- If the instruction needs clarification instead of a scene change, answer in plain text with no JSON."#;

/// A 3D asset the model may place, with its real-world bounding box so
/// generated scales stay plausible.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceAsset {
    pub path: &'static str,
    pub label: &'static str,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

pub const REFERENCE_ASSETS: [ReferenceAsset; 4] = [
    ReferenceAsset {
        path: "models/fridge.glb",
        label: "refrigerator",
        width: 0.7,
        height: 1.8,
        depth: 0.65,
    },
    ReferenceAsset {
        path: "models/shelf.glb",
        label: "shelving unit",
        width: 0.9,
        height: 1.8,
        depth: 0.4,
    },
    ReferenceAsset {
        path: "models/counter.glb",
        label: "checkout counter",
        width: 1.2,
        height: 0.9,
        depth: 0.6,
    },
    ReferenceAsset {
        path: "models/table.glb",
        label: "display table",
        width: 1.0,
        height: 0.75,
        depth: 1.0,
    },
];

pub fn analysis_system_prompt() -> String {
    format!(
        "You are a store floor-plan analyst that turns photos and sketches of a retail space into a 3D scene.\n\n{SCENE_RULES}\n\n{ANALYSIS_GUIDANCE}\n\nReference catalog:\n{}",
        reference_catalog()
    )
}

pub fn edit_system_prompt(scene: &Scene) -> String {
    let context = serde_json::to_string(&scene.without_annotations())
        .expect("scene serializes to JSON");
    format!(
        "You are a store floor-plan editor that applies one instruction to an existing 3D scene.\n\n{SCENE_RULES}\n\n{EDIT_GUIDANCE}\n\nReference catalog:\n{}\n\nCurrent scene:\n{}",
        reference_catalog(),
        context
    )
}

/// Messages for drafting a scene from uploaded images: the system rules
/// plus one user message carrying a text part and every image inline.
pub fn build_analysis_messages(images: &[ImageAttachment]) -> Vec<ChatMessage> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(ContentPart::Text {
        text: format!(
            "Build the store floor plan from the attached {} image(s).",
            images.len()
        ),
    });
    for image in images {
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image.as_data_url().to_string(),
            },
        });
    }

    vec![
        ChatMessage::system(analysis_system_prompt()),
        ChatMessage::user_parts(parts),
    ]
}

/// Messages for one edit turn: the system rules carrying the current scene
/// (annotations stripped), the prior conversation, then the new instruction.
pub fn build_edit_messages(
    scene: &Scene,
    history: &[ChatTurn],
    instruction: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(edit_system_prompt(scene)));
    for turn in history {
        messages.push(ChatMessage {
            role: turn.role,
            content: MessageContent::Text(turn.content.clone()),
        });
    }
    messages.push(ChatMessage::user(instruction));
    messages
}

fn reference_catalog() -> String {
    REFERENCE_ASSETS
        .iter()
        .map(|asset| {
            format!(
                "- {} ({}): {:.2} m wide, {:.2} m tall, {:.2} m deep",
                asset.path, asset.label, asset.width, asset.height, asset.depth
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use floorplan_scene::{Scene, SceneItem};

    use super::{
        ChatTurn, ImageAttachment, analysis_system_prompt, build_analysis_messages,
        build_edit_messages, edit_system_prompt,
    };
    use crate::chat::{ChatRole, ContentPart, MessageContent};

    fn sample_scene() -> Scene {
        Scene::new(vec![
            SceneItem::floor(8.0, 6.0).with_annotation("draft ready"),
            SceneItem::model("models/fridge.glb", [2.0, 0.9, 1.0], [0.7, 1.8, 0.65]),
        ])
    }

    #[test]
    fn analysis_prompt_includes_required_sections() {
        let prompt = analysis_system_prompt();
        assert!(prompt.contains("Scene item format"));
        assert!(prompt.contains("Layout rules:"));
        assert!(prompt.contains("Diagnostics:"));
        assert!(prompt.contains("Reference catalog:"));
        assert!(prompt.contains("JSON array only"));
        assert!(prompt.contains("rotation in degrees"));
    }

    #[test]
    fn catalog_dimensions_use_fixed_precision() {
        let prompt = analysis_system_prompt();
        assert!(prompt.contains(
            "- models/fridge.glb (refrigerator): 0.70 m wide, 1.80 m tall, 0.65 m deep"
        ));
    }

    #[test]
    fn analysis_messages_embed_every_image() {
        let images = vec![
            ImageAttachment::from_base64("data:image/png;base64,Zmlyc3Q="),
            ImageAttachment::from_base64("c2Vjb25k"),
        ];

        let messages = build_analysis_messages(&images);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);

        let MessageContent::Parts(parts) = &messages[1].content else {
            panic!("user message should carry content parts");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], ContentPart::Text { text } if text.contains("2 image(s)")));
        assert!(matches!(
            &parts[1],
            ContentPart::ImageUrl { image_url }
                if image_url.url == "data:image/png;base64,Zmlyc3Q="
        ));
        assert!(matches!(
            &parts[2],
            ContentPart::ImageUrl { image_url }
                if image_url.url == "data:image/jpeg;base64,c2Vjb25k"
        ));
    }

    #[test]
    fn edit_messages_put_history_between_rules_and_instruction() {
        let scene = sample_scene();
        let history = vec![
            ChatTurn::user("add a fridge"),
            ChatTurn::assistant("Added a fridge by the back wall."),
        ];

        let messages = build_edit_messages(&scene, &history, "move the fridge right");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content.flattened_text(), "add a fridge");
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[3].role, ChatRole::User);
        assert_eq!(messages[3].content.flattened_text(), "move the fridge right");

        let system_text = messages[0].content.flattened_text();
        assert!(system_text.contains("Current scene:"));
        assert!(system_text.contains("models/fridge.glb"));
    }

    #[test]
    fn edit_prompt_strips_annotations_from_scene_context() {
        let scene = sample_scene();
        let prompt = edit_system_prompt(&scene);

        assert!(!prompt.contains("draft ready"));
        assert!(prompt.contains("\"role\":\"floor\""));
    }

    #[test]
    fn prompts_are_deterministic() {
        assert_eq!(analysis_system_prompt(), analysis_system_prompt());

        let scene = sample_scene();
        assert_eq!(edit_system_prompt(&scene), edit_system_prompt(&scene));
    }
}
