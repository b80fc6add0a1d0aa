// renderer/graphics.rs
use std::path::Path;

use glam::Mat4;

use crate::error::{DrawError, FrameError, InitError};
use crate::renderer::device::{GraphicsDevice, RenderTargetBinding, UniformSlot, Viewport};
use crate::renderer::frame_timing::FrameTimingState;
use crate::renderer::lighting::{ShadowPass, ShadowPassRenderer};
use crate::renderer::lights::Light;
use crate::renderer::mesh::{GpuMesh, Mesh};
use crate::renderer::render_target::IntermediateRenderTarget;
use crate::renderer::shader::{DrawCall, ShaderModule, ShaderProgram, ShaderStages};
use crate::renderer::text::SimpleText;
use crate::renderer::uniforms::FrameUniform;
use crate::scene::{
    Camera, FirstPersonCamera, ModelDraw, Scene, SceneInstance, SceneInstances, ScenePassRenderer,
};
use crate::settings::RenderSettings;
use crate::time::Clock;

pub const FIELD_OF_VIEW_Y_DEGREES: f32 = 60.0;
pub const SCENE_NEAR_PLANE: f32 = 0.1;
pub const SCENE_FAR_PLANE: f32 = 1000.0;
pub const COMPOSITE_NEAR_PLANE: f32 = 0.1;
pub const COMPOSITE_FAR_PLANE: f32 = 1.1;

pub const SCENE_SHADER: &str = "light";
pub const POSTPROCESS_SHADER: &str = "postprocess";
pub const SKYBOX_SHADER: &str = "skybox";

/// Draws each instance through one shader from one point of view.
struct InstanceDraw<'a> {
    shader: &'a mut dyn ShaderModule,
    view: Mat4,
    projection: Mat4,
    lights: &'a [Light],
    orthographic: bool,
}

impl ScenePassRenderer for InstanceDraw<'_> {
    fn render_instance(
        &mut self,
        device: &mut dyn GraphicsDevice,
        instance: SceneInstance<'_>,
    ) -> Result<(), DrawError> {
        let model = instance.model()?;
        let draw = ModelDraw {
            world: instance.world,
            view: self.view,
            projection: self.projection,
            lights: self.lights,
            orthographic: self.orthographic,
            animation_tick: instance.animation_tick,
        };
        model.render(device, &mut *self.shader, &draw)
    }
}

/// Renders the scene's instances into each light's shadow map.
struct ShadowCasters<'a> {
    instances: SceneInstances<'a>,
}

impl ShadowPassRenderer for ShadowCasters<'_> {
    fn render_shadow_pass(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pass: ShadowPass<'_>,
    ) -> Result<(), DrawError> {
        let mut draw = InstanceDraw {
            shader: pass.shader,
            view: pass.view,
            projection: pass.projection,
            lights: pass.lights,
            orthographic: pass.orthographic,
        };
        self.instances.render(device, &mut draw)
    }
}

/// Device resources owned by the pipeline for its whole lifetime.
struct FrameResources {
    offscreen: Option<IntermediateRenderTarget>,
    scene_shader: ShaderProgram,
    post_shader: ShaderProgram,
    skybox_shader: ShaderProgram,
    quad: GpuMesh,
    skybox_mesh: GpuMesh,
    text: SimpleText,
}

impl FrameResources {
    /// Everything created before a failure is released again before the
    /// error is returned.
    fn create(device: &mut dyn GraphicsDevice, settings: &RenderSettings) -> Result<Self, InitError> {
        let text = SimpleText::new(device, &settings.overlay.font)?;

        let mut offscreen = if settings.offscreen_composite {
            Some(create_offscreen(device, settings)?)
        } else {
            log::info!("Off-screen composite disabled; drawing straight to the presentation buffer");
            None
        };

        let (mut scene_shader, mut post_shader, mut skybox_shader) = match create_programs(device)
        {
            Ok(programs) => programs,
            Err(err) => {
                if let Some(target) = offscreen.as_mut() {
                    target.shutdown(device);
                }
                return Err(err);
            }
        };

        let meshes = load_required_mesh(device, &settings.assets.quad_mesh).and_then(|quad| {
            load_required_mesh(device, &settings.assets.skybox_mesh).map(|sky| (quad, sky))
        });
        let (quad, skybox_mesh) = match meshes {
            Ok(meshes) => meshes,
            Err(err) => {
                scene_shader.shutdown(device);
                post_shader.shutdown(device);
                skybox_shader.shutdown(device);
                if let Some(target) = offscreen.as_mut() {
                    target.shutdown(device);
                }
                return Err(err);
            }
        };

        Ok(Self {
            offscreen,
            scene_shader,
            post_shader,
            skybox_shader,
            quad,
            skybox_mesh,
            text,
        })
    }

    fn shutdown(&mut self, device: &mut dyn GraphicsDevice) {
        self.scene_shader.shutdown(device);
        self.post_shader.shutdown(device);
        self.skybox_shader.shutdown(device);
        if let Some(target) = self.offscreen.as_mut() {
            target.shutdown(device);
        }
    }
}

fn create_offscreen(
    device: &mut dyn GraphicsDevice,
    settings: &RenderSettings,
) -> Result<IntermediateRenderTarget, InitError> {
    let mut target = IntermediateRenderTarget::new(
        device,
        settings.resolution.width,
        settings.resolution.height,
        settings.sample_count,
    )
    .map_err(InitError::OffscreenTarget)?;
    // a target that cannot be resolved now will never composite
    if let Err(err) = target.resolved_texture(device) {
        target.shutdown(device);
        return Err(InitError::OffscreenTarget(err));
    }
    Ok(target)
}

fn create_programs(
    device: &mut dyn GraphicsDevice,
) -> Result<(ShaderProgram, ShaderProgram, ShaderProgram), InitError> {
    let mut scene = ShaderProgram::new(device, ShaderStages::named(SCENE_SHADER))?;
    let mut post = match ShaderProgram::new(device, ShaderStages::named(POSTPROCESS_SHADER)) {
        Ok(program) => program,
        Err(err) => {
            scene.shutdown(device);
            return Err(err);
        }
    };
    match ShaderProgram::new(device, ShaderStages::named(SKYBOX_SHADER)) {
        Ok(skybox) => Ok((scene, post, skybox)),
        Err(err) => {
            post.shutdown(device);
            scene.shutdown(device);
            Err(err)
        }
    }
}

fn load_required_mesh(device: &mut dyn GraphicsDevice, path: &str) -> Result<GpuMesh, InitError> {
    GpuMesh::load(device, Path::new(path)).map_err(|source| InitError::MissingMesh {
        path: path.into(),
        source,
    })
}

/// The per-frame pass sequencer.
///
/// Owns the device and every resource it creates on it, so it is move-only
/// and tears everything down on drop. Projections are fixed at construction;
/// there is no resize.
pub struct Graphics<D: GraphicsDevice> {
    device: D,
    settings: RenderSettings,
    camera: Box<dyn Camera>,
    projection: Mat4,
    ortho: Mat4,
    viewport: Viewport,
    resources: FrameResources,
    timing: FrameTimingState,
}

impl<D: GraphicsDevice> Graphics<D> {
    pub fn new(mut device: D, settings: &RenderSettings) -> Result<Self, InitError> {
        let settings = settings.clone();
        let config = settings.device_config();
        device.initialize(&config).map_err(InitError::Device)?;
        log::info!(
            "Graphics device initialized: {}x{}, {} samples, flags {:?}",
            config.width,
            config.height,
            config.sample_count,
            config.flags
        );

        let resources = match FrameResources::create(&mut device, &settings) {
            Ok(resources) => resources,
            Err(err) => {
                log::error!("Graphics initialization failed: {err}");
                device.shutdown();
                return Err(err);
            }
        };

        let projection = Mat4::perspective_lh(
            FIELD_OF_VIEW_Y_DEGREES.to_radians(),
            settings.aspect_ratio(),
            SCENE_NEAR_PLANE,
            SCENE_FAR_PLANE,
        );
        let ortho = Mat4::orthographic_lh(
            0.0,
            1.0,
            0.0,
            1.0,
            COMPOSITE_NEAR_PLANE,
            COMPOSITE_FAR_PLANE,
        );
        let viewport = Viewport::full(settings.resolution.width, settings.resolution.height);

        Ok(Self {
            device,
            settings,
            camera: Box::new(FirstPersonCamera::default()),
            projection,
            ortho,
            viewport,
            resources,
            timing: FrameTimingState::new(),
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> &mut dyn Camera {
        self.camera.as_mut()
    }

    pub fn set_camera(&mut self, camera: Box<dyn Camera>) {
        self.camera = camera;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn ortho(&self) -> Mat4 {
        self.ortho
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_timing(&self) -> &FrameTimingState {
        &self.timing
    }

    pub fn uses_offscreen_composite(&self) -> bool {
        self.resources.offscreen.is_some()
    }

    /// Runs every pass of one frame in order and presents it.
    ///
    /// Any pass failure abandons the rest of the frame without presenting;
    /// device state left behind is overwritten by the next frame. Overlay
    /// text failures are only logged.
    pub fn render_frame(&mut self, clock: &dyn Clock, scene: &mut Scene) -> Result<(), FrameError> {
        let now = clock.since_init();
        let skybox = scene.skybox();
        let (lighting, instances) = scene.split_for_frame();
        let Some(lighting) = lighting else {
            log::warn!("Scene has no lighting subsystem, skipping frame");
            return Err(FrameError::MissingLighting);
        };

        let device: &mut dyn GraphicsDevice = &mut self.device;
        let resources = &mut self.resources;

        // the composite overwrites the whole presentation buffer
        device.begin_frame(resources.offscreen.is_none());

        let eye = self.camera.eye_position();
        lighting.update_frame_data(device, now as f32, eye);

        let mut shadow_casters = ShadowCasters { instances };
        lighting
            .render_shadow_maps(device, &mut shadow_casters)
            .inspect_err(|err| log::warn!("Shadow pass failed: {err}"))?;
        log::debug!("Shadow maps rendered");

        device.set_viewport(self.viewport);
        let view = self.camera.view_matrix();
        let frame = FrameUniform::new(eye, now as f32);
        device.write_uniform(UniformSlot::Frame, bytemuck::bytes_of(&frame));

        match resources.offscreen.as_mut() {
            Some(target) => {
                target.set_as_render_target(device);
                target.clear(device);
            }
            None => device.bind_render_target(RenderTargetBinding::Presentation),
        }
        device.set_depth_test(true);

        device.set_depth_bias(false);
        lighting.set_shadows_as_view_resources(device);

        let mut scene_pass = InstanceDraw {
            shader: &mut resources.scene_shader,
            view,
            projection: self.projection,
            lights: lighting.lights(),
            orthographic: false,
        };
        instances
            .render(device, &mut scene_pass)
            .map_err(|err| {
                log::warn!("Main scene pass failed: {err}");
                FrameError::ScenePass(err)
            })?;
        log::debug!("Main pass rendered");

        if let Some(texture) = skybox {
            device.disable_culling_and_bias();
            resources.skybox_mesh.set_buffers(device);
            let textures = [texture];
            let call = DrawCall::new(
                resources.skybox_mesh.index_count(),
                Mat4::IDENTITY,
                view,
                self.projection,
            )
            .with_textures(&textures);
            if let Err(err) = resources.skybox_shader.render(device, &call) {
                log::warn!("Skybox draw failed: {err}");
            }
        }

        if let Some(target) = resources.offscreen.as_mut() {
            device.set_depth_test(false);
            device.bind_render_target(RenderTargetBinding::Presentation);
            resources.quad.set_buffers(device);

            let composite = match target.resolved_texture(device) {
                Ok(texture) => {
                    let textures = [texture];
                    let call = DrawCall::new(
                        resources.quad.index_count(),
                        Mat4::IDENTITY,
                        Mat4::IDENTITY,
                        self.ortho,
                    )
                    .with_textures(&textures)
                    .orthographic(true);
                    resources.post_shader.render(device, &call)
                }
                Err(err) => Err(DrawError::from(err)),
            };

            if let Err(err) = composite {
                log::error!("Failed to composite off-screen image to the display: {err}");
                return Err(FrameError::Composite(err));
            }
        }

        if let Some(fps) = self.timing.record(now) {
            let label = format!("{fps:.2} fps");
            let overlay = &self.settings.overlay;
            if let Err(err) = resources.text.write(device, &label, overlay.x, overlay.y) {
                log::warn!("Overlay text failed: {err}");
            }
        }

        device.set_depth_test(true);
        device.end_frame();
        Ok(())
    }
}

impl<D: GraphicsDevice> Drop for Graphics<D> {
    fn drop(&mut self) {
        self.resources.shutdown(&mut self.device);
        self.device.shutdown();
        log::info!("Graphics shut down");
    }
}
