use std::path::Path;

use bitflags::bitflags;

use crate::error::DeviceError;
use crate::renderer::shader::ShaderStages;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

resource_id!(
    /// Off-screen color+depth target owned by the device.
    RenderTargetId
);
resource_id!(
    /// Shader-readable texture (resolved render target, skybox, ...).
    TextureId
);
resource_id!(ShadowMapId);
resource_id!(ProgramId);
resource_id!(MeshId);
resource_id!(FontId);

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DeviceFlags: u32 {
        const VSYNC = 1 << 0;
        const STENCIL = 1 << 1;
        const FULLSCREEN = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceConfig {
    pub width: u32,
    pub height: u32,
    pub flags: DeviceFlags,
    pub sample_count: u32,
    pub gamma: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTargetBinding {
    /// The swap-chain back buffer that `end_frame` presents.
    Presentation,
    Offscreen(RenderTargetId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshInfo {
    pub id: MeshId,
    pub index_count: u32,
}

/// Constant buffers the shaders read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    /// Per-frame camera data (eye position, elapsed time).
    Frame,
    Lights,
    /// Per-draw world/view/projection.
    Transforms,
}

/// The capability surface the frame pipeline drives.
///
/// Device creation, swap-chain presentation, target binding and fixed
/// function state all live behind this trait; the pipeline only decides
/// *when* each of them happens. The trait is object safe so that every
/// collaborator can take `&mut dyn GraphicsDevice`.
pub trait GraphicsDevice {
    fn initialize(&mut self, config: &DeviceConfig) -> Result<(), DeviceError>;
    fn shutdown(&mut self);

    fn begin_frame(&mut self, clear: bool);
    /// Presents the frame.
    fn end_frame(&mut self);

    fn bind_render_target(&mut self, target: RenderTargetBinding);
    fn clear_render_target(&mut self, target: RenderTargetBinding, color: [f32; 4]);
    fn set_viewport(&mut self, viewport: Viewport);
    fn set_depth_test(&mut self, enabled: bool);
    fn set_depth_bias(&mut self, enabled: bool);
    fn disable_culling_and_bias(&mut self);

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, DeviceError>;
    /// Resolves a (possibly multisampled) target into a shader-readable texture.
    fn resolve_render_target(&mut self, target: RenderTargetId) -> Result<TextureId, DeviceError>;
    fn destroy_render_target(&mut self, target: RenderTargetId);

    fn create_shadow_map(&mut self, size: u32) -> Result<ShadowMapId, DeviceError>;
    /// Binds the map as depth target, sets its viewport and clears it.
    fn bind_shadow_map(&mut self, map: ShadowMapId);
    /// Binds completed maps as shader inputs for the lit pass.
    fn bind_shadow_resources(&mut self, maps: &[ShadowMapId]);
    fn destroy_shadow_map(&mut self, map: ShadowMapId);

    fn create_program(&mut self, stages: &ShaderStages) -> Result<ProgramId, DeviceError>;
    fn destroy_program(&mut self, program: ProgramId);

    fn load_mesh(&mut self, path: &Path) -> Result<MeshInfo, DeviceError>;
    fn create_mesh(&mut self, vertices: &[u8], indices: &[u32]) -> Result<MeshInfo, DeviceError>;
    fn bind_mesh(&mut self, mesh: MeshId);

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, DeviceError>;
    fn load_font(&mut self, family: &str) -> Result<FontId, DeviceError>;

    fn write_uniform(&mut self, slot: UniformSlot, data: &[u8]);
    fn draw_indexed(
        &mut self,
        program: ProgramId,
        index_count: u32,
        textures: &[TextureId],
    ) -> Result<(), DeviceError>;
    fn draw_text(&mut self, font: FontId, text: &str, x: f32, y: f32) -> Result<(), DeviceError>;
}
