use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::{DrawError, InitError};
use crate::renderer::device::{GraphicsDevice, ProgramId, TextureId, UniformSlot};
use crate::renderer::lights::{Light, LightsUniform};
use crate::renderer::uniforms::TransformUniform;

/// A (vertex-stage, pixel-stage) program pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderStages {
    pub vertex: String,
    pub pixel: String,
}

impl ShaderStages {
    pub fn new(vertex: impl Into<String>, pixel: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            pixel: pixel.into(),
        }
    }

    /// `light` -> `light_vs` / `light_ps`.
    pub fn named(base: &str) -> Self {
        Self::new(format!("{base}_vs"), format!("{base}_ps"))
    }
}

/// Everything one draw through a [`ShaderModule`] needs.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    pub index_count: u32,
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub lights: &'a [Light],
    pub orthographic: bool,
    pub animation_tick: f32,
    pub textures: &'a [TextureId],
}

impl<'a> DrawCall<'a> {
    pub fn new(index_count: u32, world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            index_count,
            world,
            view,
            projection,
            lights: &[],
            orthographic: false,
            animation_tick: 0.0,
            textures: &[],
        }
    }

    pub fn with_lights(mut self, lights: &'a [Light]) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_textures(mut self, textures: &'a [TextureId]) -> Self {
        self.textures = textures;
        self
    }

    pub fn orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    pub fn animation_tick(mut self, tick: f32) -> Self {
        self.animation_tick = tick;
        self
    }
}

pub trait ShaderModule {
    fn name(&self) -> &str;
    fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        draw: &DrawCall<'_>,
    ) -> Result<(), DrawError>;
    fn shutdown(&mut self, device: &mut dyn GraphicsDevice);
}

/// Device program bound to one [`ShaderStages`] pair.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    stages: ShaderStages,
    program: Option<ProgramId>,
}

impl ShaderProgram {
    pub fn new(device: &mut dyn GraphicsDevice, stages: ShaderStages) -> Result<Self, InitError> {
        let program = device
            .create_program(&stages)
            .map_err(|source| InitError::Shader {
                vertex: stages.vertex.clone(),
                pixel: stages.pixel.clone(),
                source,
            })?;
        let name = stages
            .vertex
            .strip_suffix("_vs")
            .unwrap_or(&stages.vertex)
            .to_string();
        log::debug!("Created shader program {name} ({program:?})");

        Ok(Self {
            name,
            stages,
            program: Some(program),
        })
    }

    pub fn stages(&self) -> &ShaderStages {
        &self.stages
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }
}

impl ShaderModule for ShaderProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        draw: &DrawCall<'_>,
    ) -> Result<(), DrawError> {
        let Some(program) = self.program else {
            return Err(DrawError::Shader {
                shader: self.name.clone(),
                source: crate::error::DeviceError::Draw {
                    program: self.name.clone(),
                },
            });
        };

        let transforms = TransformUniform::new(draw.world, draw.view, draw.projection)
            .with_params(draw.orthographic, draw.animation_tick);
        device.write_uniform(UniformSlot::Transforms, bytemuck::bytes_of(&transforms));

        if !draw.lights.is_empty() {
            let lights = LightsUniform::from_lights(draw.lights);
            device.write_uniform(UniformSlot::Lights, bytemuck::bytes_of(&lights));
        }

        device
            .draw_indexed(program, draw.index_count, draw.textures)
            .map_err(|source| DrawError::Shader {
                shader: self.name.clone(),
                source,
            })
    }

    fn shutdown(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(program) = self.program.take() {
            device.destroy_program(program);
        }
    }
}
