pub mod device;
pub mod frame_timing;
pub mod graphics;
pub mod headless;
pub mod lighting;
pub mod lights;
pub mod mesh;
pub mod primitives;
pub mod render_target;
pub mod shader;
pub mod text;
pub mod uniforms;
pub mod vertex;

pub use device::{
    DeviceConfig, DeviceFlags, FontId, GraphicsDevice, MeshId, MeshInfo, ProgramId,
    RenderTargetBinding, RenderTargetDescriptor, RenderTargetId, ShadowMapId, TextureId,
    UniformSlot, Viewport,
};
pub use frame_timing::{FrameTimingState, FPS_WINDOW};
pub use graphics::Graphics;
pub use headless::{DeviceCommand, HeadlessDevice};
pub use lighting::{LightingSubsystem, ShadowPass, ShadowPassRenderer};
pub use lights::{Attenuation, Light, LightKind, LightsUniform, ShadowTuning, MAX_LIGHTS};
pub use mesh::{GpuMesh, Mesh};
pub use primitives::{cube_mesh, quad_mesh};
pub use render_target::IntermediateRenderTarget;
pub use shader::{DrawCall, ShaderModule, ShaderProgram, ShaderStages};
pub use text::SimpleText;
pub use uniforms::{FrameUniform, TransformUniform};
pub use vertex::Vertex;
