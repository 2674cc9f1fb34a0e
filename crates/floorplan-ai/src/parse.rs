use floorplan_scene::Scene;

/// Removes one markdown code-fence wrapper, if the model added one despite
/// being told not to. A language tag line after the opening fence is
/// dropped with it.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(index) => &rest[index + 1..],
        None => rest,
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Fence-strips a model reply and parses it as a scene array.
pub fn parse_scene(raw: &str) -> Result<Scene, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw))
}

#[cfg(test)]
mod tests {
    use super::{parse_scene, strip_code_fences};

    const SCENE_JSON: &str = r#"[{"type": "box", "role": "floor", "scale": [8.0, 0.1, 6.0]}]"#;

    #[test]
    fn unfenced_text_passes_through_trimmed() {
        assert_eq!(strip_code_fences("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let fenced = format!("```json\n{SCENE_JSON}\n```");
        assert_eq!(strip_code_fences(&fenced), SCENE_JSON);
    }

    #[test]
    fn strips_fence_without_language_tag() {
        let fenced = format!("```\n{SCENE_JSON}\n```");
        assert_eq!(strip_code_fences(&fenced), SCENE_JSON);
    }

    #[test]
    fn fenced_reply_parses_as_scene() {
        let fenced = format!("```json\n{SCENE_JSON}\n```");
        let scene = parse_scene(&fenced).expect("fenced scene should parse");
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.items[0].scale, [8.0, 0.1, 6.0]);
    }

    #[test]
    fn prose_does_not_parse_as_scene() {
        assert!(parse_scene("Which wall should the fridge go against?").is_err());
    }

    #[test]
    fn object_reply_does_not_parse_as_scene() {
        assert!(parse_scene(r#"{"type": "box"}"#).is_err());
    }
}
