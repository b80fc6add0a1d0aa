// scene/components.rs
// hecs components carried by scene instances

use glam::{Mat4, Quat, Vec3};

/// Placement of one instance in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl InstanceTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Index into the scene's [`ModelManager`](super::ModelManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRef(pub usize);

/// Instances without this component are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Spins the instance about `axis` at `speed` radians per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateAnimation {
    pub axis: Vec3,
    pub speed: f32,
}
