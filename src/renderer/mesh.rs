use std::path::Path;

use crate::error::DeviceError;
use crate::renderer::device::{GraphicsDevice, MeshId, MeshInfo};
use crate::renderer::vertex::Vertex;

pub trait Mesh {
    /// Binds vertex and index buffers for the next draw.
    fn set_buffers(&self, device: &mut dyn GraphicsDevice);
    fn index_count(&self) -> u32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuMesh {
    id: MeshId,
    index_count: u32,
}

impl GpuMesh {
    pub fn load(device: &mut dyn GraphicsDevice, path: &Path) -> Result<Self, DeviceError> {
        let info = device.load_mesh(path)?;
        log::info!(
            "Loaded mesh {:?} ({} indices)",
            path.display(),
            info.index_count
        );
        Ok(info.into())
    }

    pub fn from_geometry(
        device: &mut dyn GraphicsDevice,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, DeviceError> {
        let info = device.create_mesh(bytemuck::cast_slice(vertices), indices)?;
        Ok(info.into())
    }

    pub fn id(&self) -> MeshId {
        self.id
    }
}

impl From<MeshInfo> for GpuMesh {
    fn from(info: MeshInfo) -> Self {
        Self {
            id: info.id,
            index_count: info.index_count,
        }
    }
}

impl Mesh for GpuMesh {
    fn set_buffers(&self, device: &mut dyn GraphicsDevice) {
        device.bind_mesh(self.id);
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}
