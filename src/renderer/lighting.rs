use glam::{Mat4, Vec3};

use crate::error::{DrawError, InitError, ShadowPassError};
use crate::renderer::device::{GraphicsDevice, ShadowMapId, UniformSlot};
use crate::renderer::lights::{Light, LightKind, LightsUniform, ShadowTuning, MAX_LIGHTS};
use crate::renderer::shader::{ShaderModule, ShaderProgram, ShaderStages};
use crate::renderer::uniforms::FrameUniform;
use crate::settings::LightingSettings;

/// One light's turn in the shadow-map pass.
pub struct ShadowPass<'a> {
    pub light_index: usize,
    /// Depth-only program owned by the lighting subsystem.
    pub shader: &'a mut dyn ShaderModule,
    pub view: Mat4,
    pub projection: Mat4,
    pub orthographic: bool,
    pub lights: &'a [Light],
}

/// Draws the visible instance set from one light's point of view.
pub trait ShadowPassRenderer {
    fn render_shadow_pass(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pass: ShadowPass<'_>,
    ) -> Result<(), DrawError>;
}

/// Owns the light slots, their shadow maps and the shadow program.
pub struct LightingSubsystem {
    lights: Vec<Light>,
    shadow_maps: Vec<ShadowMapId>,
    shadow_shader: ShaderProgram,
    shadow_map_size: u32,
}

impl LightingSubsystem {
    pub const SHADOW_SHADER: &'static str = "shadow";

    /// Spot slots come first, the directional slot (if any) last.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        settings: &LightingSettings,
        tuning: ShadowTuning,
    ) -> Result<Self, InitError> {
        let mut kinds = vec![LightKind::Spot; settings.spot_lights];
        if settings.directional_light {
            kinds.push(LightKind::Directional);
        }
        Self::with_slots(device, &kinds, settings.shadow_map_size, tuning)
    }

    pub fn with_slots(
        device: &mut dyn GraphicsDevice,
        kinds: &[LightKind],
        shadow_map_size: u32,
        tuning: ShadowTuning,
    ) -> Result<Self, InitError> {
        if kinds.len() > MAX_LIGHTS {
            return Err(InitError::TooManyLights {
                requested: kinds.len(),
                max: MAX_LIGHTS,
            });
        }

        let shadow_shader = ShaderProgram::new(device, ShaderStages::named(Self::SHADOW_SHADER))?;

        let mut shadow_maps = Vec::with_capacity(kinds.len());
        for slot in 0..kinds.len() {
            let map = device
                .create_shadow_map(shadow_map_size)
                .map_err(|source| InitError::ShadowMap { slot, source })?;
            shadow_maps.push(map);
        }

        let lights = kinds
            .iter()
            .map(|kind| Light::with_kind(*kind, tuning))
            .collect::<Vec<_>>();

        log::info!(
            "Lighting: {} light slots, {}x{} shadow maps",
            lights.len(),
            shadow_map_size,
            shadow_map_size
        );

        Ok(Self {
            lights,
            shadow_maps,
            shadow_shader,
            shadow_map_size,
        })
    }

    /// Every slot; disabled slots carry `enabled() == false`.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn enabled_lights(&self) -> impl Iterator<Item = &Light> + '_ {
        self.lights.iter().filter(|light| light.enabled())
    }

    pub fn light(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    pub fn light_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    /// Positions slot `index` and enables it. Returns false for an unknown slot.
    pub fn move_light(&mut self, index: usize, position: Vec3, direction: Vec3) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => {
                light.move_to(position, direction);
                true
            }
            None => {
                log::warn!("No light slot {index} ({} slots)", self.lights.len());
                false
            }
        }
    }

    pub fn shadow_maps(&self) -> &[ShadowMapId] {
        &self.shadow_maps
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Pushes the light array and camera-dependent shading data.
    pub fn update_frame_data(
        &mut self,
        device: &mut dyn GraphicsDevice,
        elapsed: f32,
        eye_position: Vec3,
    ) {
        let lights = LightsUniform::from_lights(&self.lights);
        device.write_uniform(UniformSlot::Lights, bytemuck::bytes_of(&lights));

        let frame = FrameUniform::new(eye_position, elapsed);
        device.write_uniform(UniformSlot::Frame, bytemuck::bytes_of(&frame));
    }

    /// Renders one shadow map per enabled light, stopping at the first
    /// failing light.
    pub fn render_shadow_maps(
        &mut self,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ShadowPassRenderer,
    ) -> Result<(), ShadowPassError> {
        device.set_depth_bias(true);

        for (index, (light, map)) in self.lights.iter().zip(&self.shadow_maps).enumerate() {
            if !light.enabled() {
                continue;
            }

            device.bind_shadow_map(*map);
            let pass = ShadowPass {
                light_index: index,
                shader: &mut self.shadow_shader,
                view: light.view(),
                projection: light.projection(),
                orthographic: light.is_orthographic(),
                lights: &self.lights,
            };

            renderer
                .render_shadow_pass(device, pass)
                .map_err(|source| ShadowPassError {
                    light: index,
                    source,
                })?;
        }

        Ok(())
    }

    pub fn set_shadows_as_view_resources(&self, device: &mut dyn GraphicsDevice) {
        device.bind_shadow_resources(&self.shadow_maps);
    }

    pub fn shutdown(&mut self, device: &mut dyn GraphicsDevice) {
        for map in self.shadow_maps.drain(..) {
            device.destroy_shadow_map(map);
        }
        self.shadow_shader.shutdown(device);
    }
}
