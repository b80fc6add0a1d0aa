use glam::Mat4;

use crate::error::DrawError;
use crate::renderer::device::{GraphicsDevice, TextureId};
use crate::renderer::lights::Light;
use crate::renderer::mesh::{GpuMesh, Mesh};
use crate::renderer::shader::{DrawCall, ShaderModule};

/// Per-draw parameters a pass hands to a model.
#[derive(Clone, Copy, Debug)]
pub struct ModelDraw<'a> {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub lights: &'a [Light],
    pub orthographic: bool,
    pub animation_tick: f32,
}

pub trait Model {
    fn name(&self) -> &str;
    fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderModule,
        draw: &ModelDraw<'_>,
    ) -> Result<(), DrawError>;
}

/// One mesh with an optional diffuse texture.
#[derive(Clone, Debug)]
pub struct StaticModel {
    name: String,
    mesh: GpuMesh,
    texture: Option<TextureId>,
}

impl StaticModel {
    pub fn new(name: impl Into<String>, mesh: GpuMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn mesh(&self) -> &GpuMesh {
        &self.mesh
    }
}

impl Model for StaticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderModule,
        draw: &ModelDraw<'_>,
    ) -> Result<(), DrawError> {
        self.mesh.set_buffers(device);

        let textures: &[TextureId] = match &self.texture {
            Some(texture) => std::slice::from_ref(texture),
            None => &[],
        };
        let call = DrawCall::new(self.mesh.index_count(), draw.world, draw.view, draw.projection)
            .with_lights(draw.lights)
            .with_textures(textures)
            .orthographic(draw.orthographic)
            .animation_tick(draw.animation_tick);
        shader.render(device, &call)
    }
}

#[derive(Default)]
pub struct ModelManager {
    models: Vec<Box<dyn Model>>,
}

impl ModelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index instances refer to the model by.
    pub fn add(&mut self, model: impl Model + 'static) -> usize {
        self.models.push(Box::new(model));
        self.models.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&dyn Model> {
        self.models.get(index).map(|model| model.as_ref())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
