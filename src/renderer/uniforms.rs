// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TransformUniform {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// x: orthographic flag, y: animation tick.
    pub params: [f32; 4],
}

impl TransformUniform {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            params: [0.0; 4],
        }
    }

    pub fn with_params(mut self, orthographic: bool, animation_tick: f32) -> Self {
        self.params = [
            if orthographic { 1.0 } else { 0.0 },
            animation_tick,
            0.0,
            0.0,
        ];
        self
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct FrameUniform {
    pub eye_position: [f32; 4],
    /// x: seconds since init.
    pub time: [f32; 4],
}

impl FrameUniform {
    pub fn new(eye_position: Vec3, elapsed: f32) -> Self {
        Self {
            eye_position: eye_position.extend(1.0).to_array(),
            time: [elapsed, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_uniform_is_208_bytes() {
        // 3 * mat4x4<f32> = 192 bytes, vec4<f32> params = 16 bytes
        assert_eq!(std::mem::size_of::<TransformUniform>(), 208);
    }

    #[test]
    fn orthographic_flag_lands_in_params() {
        let uniform = TransformUniform::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
            .with_params(true, 0.5);
        assert_eq!(uniform.params, [1.0, 0.5, 0.0, 0.0]);
    }
}
