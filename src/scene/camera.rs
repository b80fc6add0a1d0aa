use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

/// Source of the player view. Independent of any render pass.
pub trait Camera {
    fn view_matrix(&self) -> Mat4;
    fn eye_position(&self) -> Vec3;
}

/// Fixed camera aimed at a target point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAtCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for LookAtCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera for LookAtCamera {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    fn eye_position(&self) -> Vec3 {
        self.eye
    }
}

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Yaw/pitch camera; yaw 0 looks down +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, -10.0), 0.0, 0.0)
    }
}

impl FirstPersonCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, cy * cp)
    }

    pub fn right(&self) -> Vec3 {
        Vec3::Y.cross(self.forward()).normalize_or_zero()
    }

    /// Moves along (right, up, forward) of the current heading.
    pub fn translate(&mut self, local: Vec3) {
        self.position += self.right() * local.x + Vec3::Y * local.y + self.forward() * local.z;
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

impl Camera for FirstPersonCamera {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.forward(), Vec3::Y)
    }

    fn eye_position(&self) -> Vec3 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_view_is_invertible() {
        let cam = LookAtCamera::default();
        let view = cam.view_matrix();
        let id = view * view.inverse();
        assert!(id.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let cam = FirstPersonCamera::default();
        let p = cam.view_matrix().transform_point3(cam.eye_position());
        assert!(p.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn forward_points_into_positive_view_z() {
        let cam = FirstPersonCamera::new(Vec3::ZERO, 0.7, 0.2);
        let ahead = cam.view_matrix().transform_point3(cam.forward() * 5.0);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-4));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FirstPersonCamera::default();
        cam.rotate(0.0, 10.0);
        assert!(cam.pitch() < FRAC_PI_2);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn translate_follows_heading() {
        let mut cam = FirstPersonCamera::new(Vec3::ZERO, FRAC_PI_2, 0.0);
        cam.translate(Vec3::new(0.0, 0.0, 2.0));
        assert!(cam.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }
}
