use crate::item::{Scene, Vec3};

/// Moves the item at `index` by `delta` meters. Returns false when the
/// index does not exist.
pub fn translate(scene: &mut Scene, index: usize, delta: Vec3) -> bool {
    let Some(item) = scene.items.get_mut(index) else {
        return false;
    };
    item.position[0] += delta[0];
    item.position[1] += delta[1];
    item.position[2] += delta[2];
    true
}

/// Rotates the item at `index` around the vertical axis by `degrees`.
pub fn rotate_y(scene: &mut Scene, index: usize, degrees: f64) -> bool {
    let Some(item) = scene.items.get_mut(index) else {
        return false;
    };
    item.rotation[1] += degrees;
    true
}

/// Scales the item at `index` uniformly by `factor`.
pub fn scale_uniform(scene: &mut Scene, index: usize, factor: f64) -> bool {
    let Some(item) = scene.items.get_mut(index) else {
        return false;
    };
    item.scale[0] *= factor;
    item.scale[1] *= factor;
    item.scale[2] *= factor;
    true
}

/// Restores the item at `index` from a snapshot taken when the scene was
/// loaded. Returns false when either side lacks the index.
pub fn reset(scene: &mut Scene, index: usize, snapshot: &Scene) -> bool {
    let Some(original) = snapshot.items.get(index) else {
        return false;
    };
    let Some(item) = scene.items.get_mut(index) else {
        return false;
    };
    *item = original.clone();
    true
}
