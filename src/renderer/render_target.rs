use crate::error::DeviceError;
use crate::renderer::device::{
    GraphicsDevice, RenderTargetBinding, RenderTargetDescriptor, RenderTargetId, TextureId,
};

pub const OFFSCREEN_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Off-screen color+depth buffer the scene is drawn into before
/// post-processing.
///
/// Binding or clearing the target invalidates the last resolve, so the
/// texture handed to the post-process pass is always resolved after the
/// final draw into it. Resolving twice without an intervening bind is a
/// no-op.
#[derive(Debug)]
pub struct IntermediateRenderTarget {
    id: Option<RenderTargetId>,
    width: u32,
    height: u32,
    sample_count: u32,
    resolved: Option<TextureId>,
}

impl IntermediateRenderTarget {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Result<Self, DeviceError> {
        let descriptor = RenderTargetDescriptor {
            width,
            height,
            sample_count: sample_count.max(1),
        };
        let id = device.create_render_target(&descriptor)?;
        log::info!(
            "Created off-screen target {}x{} ({} samples)",
            width,
            height,
            descriptor.sample_count
        );

        Ok(Self {
            id: Some(id),
            width,
            height,
            sample_count: descriptor.sample_count,
            resolved: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    pub fn binding(&self) -> Option<RenderTargetBinding> {
        self.id.map(RenderTargetBinding::Offscreen)
    }

    pub fn set_as_render_target(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(binding) = self.binding() {
            device.bind_render_target(binding);
            self.resolved = None;
        }
    }

    pub fn clear(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(binding) = self.binding() {
            device.clear_render_target(binding, OFFSCREEN_CLEAR_COLOR);
            self.resolved = None;
        }
    }

    /// Shader-readable view of the target, resolving MSAA if needed.
    pub fn resolved_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
    ) -> Result<TextureId, DeviceError> {
        if let Some(texture) = self.resolved {
            return Ok(texture);
        }
        let id = self
            .id
            .ok_or_else(|| DeviceError::Resource("off-screen target already released".into()))?;
        let texture = device.resolve_render_target(id)?;
        self.resolved = Some(texture);
        Ok(texture)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn shutdown(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(id) = self.id.take() {
            device.destroy_render_target(id);
            self.resolved = None;
        }
    }
}
