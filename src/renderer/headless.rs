// renderer/headless.rs
// GraphicsDevice that does no GPU work and records every call in order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::DeviceError;
use crate::renderer::device::{
    DeviceConfig, FontId, GraphicsDevice, MeshId, MeshInfo, ProgramId, RenderTargetBinding,
    RenderTargetDescriptor, RenderTargetId, ShadowMapId, TextureId, UniformSlot, Viewport,
};
use crate::renderer::shader::ShaderStages;
use crate::renderer::uniforms::TransformUniform;
use crate::settings::AssetSettings;

const QUAD_INDEX_COUNT: u32 = 6;
const CUBE_INDEX_COUNT: u32 = 36;

#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    Initialize(DeviceConfig),
    Shutdown,
    BeginFrame { clear: bool },
    EndFrame,
    BindTarget(RenderTargetBinding),
    Clear(RenderTargetBinding),
    SetViewport(Viewport),
    DepthTest(bool),
    DepthBias(bool),
    DisableCullingAndBias,
    CreateRenderTarget(RenderTargetId),
    Resolve(RenderTargetId),
    DestroyRenderTarget(RenderTargetId),
    CreateShadowMap(ShadowMapId),
    BindShadowMap(ShadowMapId),
    BindShadowResources(Vec<ShadowMapId>),
    DestroyShadowMap(ShadowMapId),
    CreateProgram(String),
    DestroyProgram(String),
    LoadMesh(PathBuf),
    CreateMesh { index_count: u32 },
    BindMesh(MeshId),
    LoadTexture(PathBuf),
    LoadFont(String),
    WriteUniform { slot: UniformSlot, len: usize },
    Draw {
        program: String,
        index_count: u32,
        textures: Vec<TextureId>,
    },
    Text { text: String, x: f32, y: f32 },
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    commands: Vec<DeviceCommand>,
    next_id: u32,
    programs: HashMap<ProgramId, String>,
    mesh_files: HashMap<PathBuf, u32>,
    resolve_textures: HashMap<RenderTargetId, TextureId>,
    failing_programs: HashSet<String>,
    fail_resolve: bool,
    fail_text: bool,
    fail_initialize: bool,
    config: Option<DeviceConfig>,
    depth_test: bool,
    frames_presented: u64,
    transforms: Vec<TransformUniform>,
    recording_paused: bool,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            depth_test: true,
            ..Self::default()
        }
    }

    /// Device with the configured quad and skybox meshes available.
    pub fn with_default_assets(assets: &AssetSettings) -> Self {
        let mut device = Self::new();
        device.register_mesh(&assets.quad_mesh, QUAD_INDEX_COUNT);
        device.register_mesh(&assets.skybox_mesh, CUBE_INDEX_COUNT);
        device
    }

    pub fn register_mesh(&mut self, path: impl AsRef<Path>, index_count: u32) {
        self.mesh_files
            .insert(path.as_ref().to_path_buf(), index_count);
    }

    /// Draws through the program whose vertex stage is `<name>_vs` fail.
    pub fn fail_program(&mut self, name: impl Into<String>) {
        self.failing_programs.insert(name.into());
    }

    pub fn fail_resolve(&mut self, fail: bool) {
        self.fail_resolve = fail;
    }

    pub fn fail_text(&mut self, fail: bool) {
        self.fail_text = fail;
    }

    pub fn fail_initialize(&mut self, fail: bool) {
        self.fail_initialize = fail;
    }

    /// With recording off the device keeps its state and failure injection
    /// but stores no commands or transform blocks.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording_paused = !recording;
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.transforms.clear();
    }

    /// Program names of every successful draw, in submission order.
    pub fn draws(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::Draw { program, .. } => Some(program.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn position_of(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> Option<usize> {
        self.commands.iter().position(predicate)
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    pub fn is_depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    /// Every per-draw transform block written, in order.
    pub fn transforms(&self) -> &[TransformUniform] {
        &self.transforms
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, command: DeviceCommand) {
        log::trace!("headless: {command:?}");
        if !self.recording_paused {
            self.commands.push(command);
        }
    }

    fn program_name(&self, program: ProgramId) -> String {
        self.programs
            .get(&program)
            .cloned()
            .unwrap_or_else(|| format!("program#{}", program.index()))
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn initialize(&mut self, config: &DeviceConfig) -> Result<(), DeviceError> {
        if self.fail_initialize {
            return Err(DeviceError::Initialization(
                "headless device configured to fail".into(),
            ));
        }
        self.config = Some(config.clone());
        self.record(DeviceCommand::Initialize(config.clone()));
        Ok(())
    }

    fn shutdown(&mut self) {
        self.config = None;
        self.record(DeviceCommand::Shutdown);
    }

    fn begin_frame(&mut self, clear: bool) {
        self.record(DeviceCommand::BeginFrame { clear });
    }

    fn end_frame(&mut self) {
        self.frames_presented += 1;
        self.record(DeviceCommand::EndFrame);
    }

    fn bind_render_target(&mut self, target: RenderTargetBinding) {
        self.record(DeviceCommand::BindTarget(target));
    }

    fn clear_render_target(&mut self, target: RenderTargetBinding, _color: [f32; 4]) {
        self.record(DeviceCommand::Clear(target));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record(DeviceCommand::SetViewport(viewport));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.record(DeviceCommand::DepthTest(enabled));
    }

    fn set_depth_bias(&mut self, enabled: bool) {
        self.record(DeviceCommand::DepthBias(enabled));
    }

    fn disable_culling_and_bias(&mut self) {
        self.record(DeviceCommand::DisableCullingAndBias);
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, DeviceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(DeviceError::Resource(format!(
                "render target must not be empty ({}x{})",
                descriptor.width, descriptor.height
            )));
        }
        let id = RenderTargetId(self.allocate());
        let texture = TextureId(self.allocate());
        self.resolve_textures.insert(id, texture);
        self.record(DeviceCommand::CreateRenderTarget(id));
        Ok(id)
    }

    fn resolve_render_target(&mut self, target: RenderTargetId) -> Result<TextureId, DeviceError> {
        if self.fail_resolve {
            return Err(DeviceError::Resolve(target.index()));
        }
        let texture = *self
            .resolve_textures
            .get(&target)
            .ok_or(DeviceError::Resolve(target.index()))?;
        self.record(DeviceCommand::Resolve(target));
        Ok(texture)
    }

    fn destroy_render_target(&mut self, target: RenderTargetId) {
        self.resolve_textures.remove(&target);
        self.record(DeviceCommand::DestroyRenderTarget(target));
    }

    fn create_shadow_map(&mut self, size: u32) -> Result<ShadowMapId, DeviceError> {
        if size == 0 {
            return Err(DeviceError::Resource("shadow map size must be non-zero".into()));
        }
        let id = ShadowMapId(self.allocate());
        self.record(DeviceCommand::CreateShadowMap(id));
        Ok(id)
    }

    fn bind_shadow_map(&mut self, map: ShadowMapId) {
        self.record(DeviceCommand::BindShadowMap(map));
    }

    fn bind_shadow_resources(&mut self, maps: &[ShadowMapId]) {
        self.record(DeviceCommand::BindShadowResources(maps.to_vec()));
    }

    fn destroy_shadow_map(&mut self, map: ShadowMapId) {
        self.record(DeviceCommand::DestroyShadowMap(map));
    }

    fn create_program(&mut self, stages: &ShaderStages) -> Result<ProgramId, DeviceError> {
        let name = stages
            .vertex
            .strip_suffix("_vs")
            .unwrap_or(&stages.vertex)
            .to_string();
        let id = ProgramId(self.allocate());
        self.programs.insert(id, name.clone());
        self.record(DeviceCommand::CreateProgram(name));
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        let name = self.program_name(program);
        self.programs.remove(&program);
        self.record(DeviceCommand::DestroyProgram(name));
    }

    fn load_mesh(&mut self, path: &Path) -> Result<MeshInfo, DeviceError> {
        let index_count = *self
            .mesh_files
            .get(path)
            .ok_or_else(|| DeviceError::AssetNotFound(path.to_path_buf()))?;
        let id = MeshId(self.allocate());
        self.record(DeviceCommand::LoadMesh(path.to_path_buf()));
        Ok(MeshInfo { id, index_count })
    }

    fn create_mesh(&mut self, _vertices: &[u8], indices: &[u32]) -> Result<MeshInfo, DeviceError> {
        let id = MeshId(self.allocate());
        let index_count = indices.len() as u32;
        self.record(DeviceCommand::CreateMesh { index_count });
        Ok(MeshInfo { id, index_count })
    }

    fn bind_mesh(&mut self, mesh: MeshId) {
        self.record(DeviceCommand::BindMesh(mesh));
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId, DeviceError> {
        let id = TextureId(self.allocate());
        self.record(DeviceCommand::LoadTexture(path.to_path_buf()));
        Ok(id)
    }

    fn load_font(&mut self, family: &str) -> Result<FontId, DeviceError> {
        let id = FontId(self.allocate());
        self.record(DeviceCommand::LoadFont(family.to_string()));
        Ok(id)
    }

    fn write_uniform(&mut self, slot: UniformSlot, data: &[u8]) {
        if slot == UniformSlot::Transforms && !self.recording_paused {
            if let Ok(block) = bytemuck::try_pod_read_unaligned::<TransformUniform>(data) {
                self.transforms.push(block);
            }
        }
        self.record(DeviceCommand::WriteUniform {
            slot,
            len: data.len(),
        });
    }

    fn draw_indexed(
        &mut self,
        program: ProgramId,
        index_count: u32,
        textures: &[TextureId],
    ) -> Result<(), DeviceError> {
        let name = self.program_name(program);
        if self.failing_programs.contains(&name) {
            return Err(DeviceError::Draw { program: name });
        }
        self.record(DeviceCommand::Draw {
            program: name,
            index_count,
            textures: textures.to_vec(),
        });
        Ok(())
    }

    fn draw_text(&mut self, _font: FontId, text: &str, x: f32, y: f32) -> Result<(), DeviceError> {
        if self.fail_text {
            return Err(DeviceError::Text("headless device configured to fail".into()));
        }
        self.record(DeviceCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }
}
