pub mod item;
pub mod manipulate;
pub mod store;
pub mod validate;

pub use item::{FLOOR_THICKNESS, ItemKind, ItemRole, Scene, SceneItem, Vec3};
pub use manipulate::{reset, rotate_y, scale_uniform, translate};
pub use store::{SceneStore, StoreError};
pub use validate::{SceneValidation, TOLERANCE, validate_scene};
