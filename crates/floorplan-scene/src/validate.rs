use crate::item::{ItemKind, ItemRole, Scene};

/// Tolerance for the floating-point geometry checks.
pub const TOLERANCE: f64 = 1e-6;

/// Outcome of checking a scene against the layout constraints. Violations
/// are reported, never repaired; the caller decides what to do with a scene
/// the model got wrong.
#[derive(Debug, Clone)]
pub struct SceneValidation {
    pub non_empty: bool,
    pub floor_first: bool,
    pub single_floor: bool,
    pub within_bounds: bool,
    pub resting_on_floor: bool,
    pub models_have_paths: bool,
    pub errors: Vec<String>,
}

impl SceneValidation {
    pub fn is_valid(&self) -> bool {
        self.non_empty
            && self.floor_first
            && self.single_floor
            && self.within_bounds
            && self.resting_on_floor
            && self.models_have_paths
            && self.errors.is_empty()
    }
}

/// Checks the structural invariants every model-produced scene must satisfy:
/// the first item is a box-shaped floor at y=0, it is the only floor, every
/// other item sits inside the floor footprint and rests on the floor plane,
/// and every model item names its asset.
pub fn validate_scene(scene: &Scene) -> SceneValidation {
    let mut errors = Vec::new();

    let Some(first) = scene.items.first() else {
        errors.push("scene must contain at least one item".to_string());
        return SceneValidation {
            non_empty: false,
            floor_first: false,
            single_floor: false,
            within_bounds: false,
            resting_on_floor: false,
            models_have_paths: false,
            errors,
        };
    };

    let mut floor_first = true;
    if first.role != ItemRole::Floor {
        floor_first = false;
        errors.push(format!(
            "item 0 must have the floor role (found {})",
            first.role
        ));
    }
    if first.kind != ItemKind::Box {
        floor_first = false;
        errors.push(format!("the floor must be a box (found {})", first.kind));
    }
    if first.position[1].abs() > TOLERANCE {
        floor_first = false;
        errors.push(format!(
            "the floor must sit at y=0 (found {:.3})",
            first.position[1]
        ));
    }

    let floor_count = scene
        .items
        .iter()
        .filter(|item| item.role == ItemRole::Floor)
        .count();
    let single_floor = floor_count == 1;
    if !single_floor {
        errors.push(format!(
            "scene must contain exactly one floor item (found {floor_count})"
        ));
    }

    let half_width = first.scale[0] / 2.0;
    let half_depth = first.scale[2] / 2.0;
    let mut within_bounds = true;
    let mut resting_on_floor = true;
    let mut models_have_paths = true;

    for (index, item) in scene.items.iter().enumerate() {
        if item.kind == ItemKind::Model && item.path.is_none() {
            models_have_paths = false;
            errors.push(format!("item {index} is a model without an asset path"));
        }
        if index == 0 {
            continue;
        }

        if item.position[0].abs() > half_width + TOLERANCE {
            within_bounds = false;
            errors.push(format!(
                "item {index} position.x {:.3} is outside the floor footprint (half-width {:.3})",
                item.position[0], half_width
            ));
        }
        if item.position[2].abs() > half_depth + TOLERANCE {
            within_bounds = false;
            errors.push(format!(
                "item {index} position.z {:.3} is outside the floor footprint (half-depth {:.3})",
                item.position[2], half_depth
            ));
        }

        let expected_y = item.scale[1] / 2.0;
        if (item.position[1] - expected_y).abs() > TOLERANCE {
            resting_on_floor = false;
            errors.push(format!(
                "item {index} must rest on the floor: position.y {:.3}, expected scale.y/2 = {:.3}",
                item.position[1], expected_y
            ));
        }
    }

    SceneValidation {
        non_empty: true,
        floor_first,
        single_floor,
        within_bounds,
        resting_on_floor,
        models_have_paths,
        errors,
    }
}
