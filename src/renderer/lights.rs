use std::f32::consts::FRAC_PI_2;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

pub const MAX_LIGHTS: usize = 8;

/// The shadow frustum has to enclose the whole illumination cone; twice the
/// half-angle only inscribes the frustum inside the lit circle, 2.5 was
/// found to cover it.
pub const SHADOW_FRUSTUM_ANGLE_MULTIPLIER: f32 = 2.5;
pub const SHADOW_NEAR_PLANE: f32 = 0.1;
pub const SHADOW_FAR_PLANE: f32 = 1000.0;
pub const DIRECTIONAL_SHADOW_EXTENT: f32 = 50.0;

const DEFAULT_HALF_ANGLE_DEGREES: f32 = 18.0;
/// Beyond this |y| the look-to basis against +Y degenerates.
const UP_PARALLEL_THRESHOLD: f32 = 0.99999;
/// Applied along x, away from zero, so it can never cancel an existing offset.
const UP_PERTURBATION: f32 = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowTuning {
    pub frustum_angle_multiplier: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Half-size of the orthographic box used by directional lights.
    pub directional_extent: f32,
}

impl Default for ShadowTuning {
    fn default() -> Self {
        Self {
            frustum_angle_multiplier: SHADOW_FRUSTUM_ANGLE_MULTIPLIER,
            near_plane: SHADOW_NEAR_PLANE,
            far_plane: SHADOW_FAR_PLANE,
            directional_extent: DIRECTIONAL_SHADOW_EXTENT,
        }
    }
}

impl ShadowTuning {
    pub(crate) fn is_valid(&self) -> bool {
        self.frustum_angle_multiplier > 0.0
            && self.near_plane > 0.0
            && self.far_plane > self.near_plane
            && self.directional_extent > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Spot,
    /// Shadowed through an orthographic projection.
    Directional,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.95,
            linear: 0.0,
            quadratic: 0.025,
        }
    }
}

/// One shadow-casting light slot.
///
/// Pose and cone are only reachable through mutators, each of which
/// recomputes `view` and `projection` before returning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    kind: LightKind,
    position: Vec4,
    direction: Vec3,
    half_angle: f32,
    cos_half_angle: f32,
    attenuation: Attenuation,
    view: Mat4,
    projection: Mat4,
    color: Vec4,
    enabled: bool,
    tuning: ShadowTuning,
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

impl Light {
    /// Disabled spot light pointing straight down.
    pub fn new() -> Self {
        Self::with_kind(LightKind::Spot, ShadowTuning::default())
    }

    pub fn directional() -> Self {
        Self::with_kind(LightKind::Directional, ShadowTuning::default())
    }

    pub fn with_kind(kind: LightKind, tuning: ShadowTuning) -> Self {
        let half_angle = DEFAULT_HALF_ANGLE_DEGREES.to_radians();
        let mut light = Self {
            kind,
            position: Vec4::ZERO,
            direction: Vec3::NEG_Y,
            half_angle,
            cos_half_angle: half_angle.cos(),
            attenuation: Attenuation::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            color: Vec4::ONE,
            enabled: false,
            tuning,
        };
        light.update_projection();
        light
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn position(&self) -> Vec4 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn half_angle(&self) -> f32 {
        self.half_angle
    }

    pub fn cos_half_angle(&self) -> f32 {
        self.cos_half_angle
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn tuning(&self) -> ShadowTuning {
        self.tuning
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn is_orthographic(&self) -> bool {
        self.kind == LightKind::Directional
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Vertical field of view of the spot shadow frustum.
    pub fn shadow_fov(&self) -> f32 {
        (self.half_angle * self.tuning.frustum_angle_multiplier).min(FRAC_PI_2)
    }

    /// Repositions the light and enables it.
    pub fn move_to(&mut self, position: Vec3, direction: Vec3) {
        self.position = position.extend(1.0);
        self.direction = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        self.enabled = true;
        self.update_projection();
    }

    pub fn set_half_angle(&mut self, half_angle: f32) {
        self.half_angle = half_angle;
        self.cos_half_angle = half_angle.cos();
        self.update_projection();
    }

    pub fn set_tuning(&mut self, tuning: ShadowTuning) {
        self.tuning = tuning;
        self.update_projection();
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    pub fn set_attenuation(&mut self, attenuation: Attenuation) {
        self.attenuation = attenuation;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    fn update_projection(&mut self) {
        let mut direction = self.direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        if direction.y.abs() > UP_PARALLEL_THRESHOLD {
            let nudge = UP_PERTURBATION.copysign(direction.x);
            direction = (direction + Vec3::new(nudge, 0.0, 0.0)).normalize();
        }

        let tuning = self.tuning;
        self.view = Mat4::look_to_lh(self.position.truncate(), direction, Vec3::Y);
        self.projection = match self.kind {
            // shadow maps are square at any resolution
            LightKind::Spot => Mat4::perspective_lh(
                self.shadow_fov(),
                1.0,
                tuning.near_plane,
                tuning.far_plane,
            ),
            LightKind::Directional => {
                let extent = tuning.directional_extent;
                Mat4::orthographic_lh(
                    -extent,
                    extent,
                    -extent,
                    extent,
                    tuning.near_plane,
                    tuning.far_plane,
                )
            }
        };
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct LightRaw {
    pub position: [f32; 4],
    pub direction_cos: [f32; 4],
    /// constant, linear, quadratic, enabled
    pub attenuation: [f32; 4],
    pub color: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl LightRaw {
    pub fn from_light(light: &Light) -> Self {
        let direction = light.direction();
        let attenuation = light.attenuation();
        Self {
            position: light.position().to_array(),
            direction_cos: [
                direction.x,
                direction.y,
                direction.z,
                light.cos_half_angle(),
            ],
            attenuation: [
                attenuation.constant,
                attenuation.linear,
                attenuation.quadratic,
                if light.enabled() { 1.0 } else { 0.0 },
            ],
            color: light.color().to_array(),
            view_proj: light.view_projection().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct LightsUniform {
    /// x: slots written, y: enabled slots
    pub counts: [u32; 4],
    pub lights: [LightRaw; MAX_LIGHTS],
}

impl LightsUniform {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::zeroed();

        let count = lights.len().min(MAX_LIGHTS);
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights supplied, only the first {} reach the shader",
                lights.len(),
                MAX_LIGHTS
            );
        }

        for (dst, src) in uniform.lights.iter_mut().zip(lights.iter()).take(count) {
            *dst = LightRaw::from_light(src);
        }
        uniform.counts[0] = count as u32;
        uniform.counts[1] = lights.iter().take(count).filter(|l| l.enabled()).count() as u32;

        uniform
    }
}
