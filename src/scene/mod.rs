// scene/mod.rs

pub mod camera;
pub mod components;
pub mod model;
pub mod scene;

pub use camera::{Camera, FirstPersonCamera, LookAtCamera};
pub use components::{InstanceTransform, ModelRef, Name, RotateAnimation, Visible};
pub use model::{Model, ModelDraw, ModelManager, StaticModel};
pub use scene::{Scene, SceneInstance, SceneInstances, ScenePassRenderer};
