use std::path::PathBuf;

use frame_pipeline::error::{DeviceError, DrawError, FrameError, InitError};
use frame_pipeline::renderer::{
    DeviceCommand, GpuMesh, Graphics, GraphicsDevice, HeadlessDevice, LightingSubsystem,
    RenderTargetBinding, ShaderModule, TextureId,
};
use frame_pipeline::scene::{Camera, InstanceTransform, Model, ModelDraw, Scene, StaticModel};
use frame_pipeline::settings::{LightingSettings, RenderSettings};
use frame_pipeline::time::ManualClock;
use glam::{Mat4, Vec3};

const FRAME_TIME: f64 = 1.0 / 60.0;

/// Fails every draw issued through the program named `fail_in`.
struct BrokenModel {
    fail_in: &'static str,
}

impl Model for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn render(
        &self,
        _device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderModule,
        _draw: &ModelDraw<'_>,
    ) -> Result<(), DrawError> {
        if shader.name() == self.fail_in {
            return Err(DrawError::Device(DeviceError::Draw {
                program: shader.name().to_string(),
            }));
        }
        Ok(())
    }
}

fn single_light_settings() -> RenderSettings {
    RenderSettings {
        lighting: LightingSettings {
            spot_lights: 0,
            directional_light: true,
            shadow_map_size: 1024,
        },
        ..RenderSettings::default()
    }
}

fn pipeline(settings: &RenderSettings) -> Graphics<HeadlessDevice> {
    let device = HeadlessDevice::with_default_assets(&settings.assets);
    Graphics::new(device, settings).unwrap()
}

/// Scene with one enabled directional light at the default pose.
fn lit_scene(graphics: &mut Graphics<HeadlessDevice>, settings: &RenderSettings) -> Scene {
    let mut lighting =
        LightingSubsystem::new(graphics.device_mut(), &settings.lighting, settings.shadow)
            .unwrap();
    assert!(lighting.move_light(0, Vec3::ZERO, Vec3::NEG_Y));
    Scene::new().with_lighting(lighting)
}

fn add_cube(graphics: &mut Graphics<HeadlessDevice>, scene: &mut Scene) {
    let (vertices, indices) = frame_pipeline::renderer::cube_mesh();
    let mesh = GpuMesh::from_geometry(graphics.device_mut(), &vertices, &indices).unwrap();
    let model = scene.models_mut().add(StaticModel::new("cube", mesh));
    scene.spawn_instance(model, InstanceTransform::default());
}

fn add_broken(scene: &mut Scene, fail_in: &'static str) {
    let model = scene.models_mut().add(BrokenModel { fail_in });
    scene.spawn_instance(model, InstanceTransform::default());
}

fn is_draw(program: &'static str) -> impl Fn(&DeviceCommand) -> bool {
    move |command: &DeviceCommand| matches!(command, DeviceCommand::Draw { program: p, .. } if p == program)
}

#[test]
fn empty_scene_renders_only_the_composite() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    graphics.device_mut().clear_commands();

    let clock = ManualClock::new(0.0);
    graphics.render_frame(&clock, &mut scene).unwrap();

    let device = graphics.device();
    assert_eq!(device.draws(), vec!["postprocess"]);
    assert!(device.texts().is_empty());
    assert_eq!(device.frames_presented(), 1);
    assert_eq!(
        device.commands().first(),
        Some(&DeviceCommand::BeginFrame { clear: false })
    );
    assert_eq!(device.commands().last(), Some(&DeviceCommand::EndFrame));
}

#[test]
fn passes_run_in_order() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    add_cube(&mut graphics, &mut scene);
    graphics.device_mut().clear_commands();

    graphics
        .render_frame(&ManualClock::new(1.0), &mut scene)
        .unwrap();

    let device = graphics.device();
    assert_eq!(device.draws(), vec!["shadow", "light", "postprocess"]);

    let bias_on = device
        .position_of(|c| *c == DeviceCommand::DepthBias(true))
        .unwrap();
    let shadow = device.position_of(is_draw("shadow")).unwrap();
    let bias_off = device
        .position_of(|c| *c == DeviceCommand::DepthBias(false))
        .unwrap();
    let shadow_inputs = device
        .position_of(|c| matches!(c, DeviceCommand::BindShadowResources(_)))
        .unwrap();
    let lit = device.position_of(is_draw("light")).unwrap();
    let resolve = device
        .position_of(|c| matches!(c, DeviceCommand::Resolve(_)))
        .unwrap();
    let composite = device.position_of(is_draw("postprocess")).unwrap();

    assert!(bias_on < shadow);
    assert!(shadow < bias_off && bias_off < shadow_inputs && shadow_inputs < lit);
    assert!(lit < resolve && resolve < composite);
}

#[test]
fn failing_instance_aborts_before_composite_and_overlay() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    add_broken(&mut scene, "light");

    let mut clock = ManualClock::default();
    for _ in 0..20 {
        let err = graphics.render_frame(&clock, &mut scene).unwrap_err();
        assert!(matches!(err, FrameError::ScenePass(_)));
        assert!(!err.is_display_fatal());
        clock.advance(FRAME_TIME);
    }

    let device = graphics.device();
    assert!(!device.draws().contains(&"postprocess"));
    assert!(device.texts().is_empty());
    assert_eq!(device.frames_presented(), 0);
}

#[test]
fn failing_shadow_caster_aborts_the_frame() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    add_broken(&mut scene, "shadow");
    graphics.device_mut().clear_commands();

    let err = graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap_err();
    match err {
        FrameError::ShadowPass(pass) => assert_eq!(pass.light, 0),
        other => panic!("unexpected error {other:?}"),
    }

    let device = graphics.device();
    assert!(device.draws().is_empty());
    assert!(device
        .position_of(|c| matches!(c, DeviceCommand::BindTarget(_)))
        .is_none());
}

#[test]
fn skybox_draws_between_main_pass_and_composite() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    add_cube(&mut graphics, &mut scene);
    let skybox = graphics
        .device_mut()
        .load_texture(std::path::Path::new("skybox.dds"))
        .unwrap();
    scene.set_skybox(Some(skybox));
    graphics.device_mut().clear_commands();

    graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap();

    let device = graphics.device();
    assert_eq!(
        device.draws(),
        vec!["shadow", "light", "skybox", "postprocess"]
    );

    let no_cull = device
        .position_of(|c| *c == DeviceCommand::DisableCullingAndBias)
        .unwrap();
    let sky = device.position_of(is_draw("skybox")).unwrap();
    assert!(device.position_of(is_draw("light")).unwrap() < no_cull);
    assert!(no_cull < sky);
    assert_eq!(
        device.commands()[sky],
        DeviceCommand::Draw {
            program: "skybox".into(),
            index_count: 36,
            textures: vec![skybox],
        }
    );

    // shadow, light, then the skybox block
    let sky_block = device.transforms()[2];
    assert_eq!(sky_block.world, Mat4::IDENTITY.to_cols_array_2d());
    assert_eq!(
        sky_block.view,
        graphics.camera().view_matrix().to_cols_array_2d()
    );
    assert_eq!(sky_block.projection, graphics.projection().to_cols_array_2d());
}

#[test]
fn skybox_failure_does_not_fail_the_frame() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    scene.set_skybox(Some(TextureId(4242)));
    graphics.device_mut().fail_program("skybox");

    graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap();
    assert_eq!(graphics.device().frames_presented(), 1);
}

#[test]
fn disabled_offscreen_path_draws_straight_to_presentation() {
    let settings = RenderSettings {
        offscreen_composite: false,
        ..single_light_settings()
    };
    let device = HeadlessDevice::with_default_assets(&settings.assets);
    let mut graphics = Graphics::new(device, &settings).unwrap();
    assert!(!graphics.uses_offscreen_composite());
    let mut scene = lit_scene(&mut graphics, &settings);
    add_cube(&mut graphics, &mut scene);

    graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap();

    let device = graphics.device();
    assert!(device
        .position_of(|c| matches!(
            c,
            DeviceCommand::CreateRenderTarget(_)
                | DeviceCommand::Resolve(_)
                | DeviceCommand::BindTarget(RenderTargetBinding::Offscreen(_))
        ))
        .is_none());
    assert!(device
        .position_of(|c| *c == DeviceCommand::BeginFrame { clear: true })
        .is_some());

    let present = device
        .position_of(|c| *c == DeviceCommand::BindTarget(RenderTargetBinding::Presentation))
        .unwrap();
    assert!(present < device.position_of(is_draw("light")).unwrap());
    assert_eq!(device.draws(), vec!["shadow", "light"]);
    assert_eq!(device.frames_presented(), 1);
}

#[test]
fn fps_overlay_starts_on_the_seventeenth_frame() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);

    let mut clock = ManualClock::default();
    for frame in 0..16 {
        graphics.render_frame(&clock, &mut scene).unwrap();
        assert!(graphics.device().texts().is_empty(), "frame {frame}");
        clock.advance(FRAME_TIME);
    }

    graphics.render_frame(&clock, &mut scene).unwrap();
    let device = graphics.device();
    assert_eq!(device.texts(), vec!["60.00 fps"]);
    assert!(device
        .position_of(|c| matches!(
            c,
            DeviceCommand::Text { x, y, .. } if *x == 25.0 && *y == 25.0
        ))
        .is_some());
}

#[test]
fn overlay_failure_never_fails_a_frame() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    graphics.device_mut().fail_text(true);

    let mut clock = ManualClock::default();
    for _ in 0..20 {
        graphics.render_frame(&clock, &mut scene).unwrap();
        clock.advance(FRAME_TIME);
    }
    assert_eq!(graphics.device().frames_presented(), 20);
}

#[test]
fn composite_failure_is_display_fatal() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    graphics.device_mut().fail_program("postprocess");

    let err = graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap_err();
    assert!(matches!(err, FrameError::Composite(_)));
    assert!(err.is_display_fatal());
    assert_eq!(graphics.device().frames_presented(), 0);
}

#[test]
fn unresolvable_offscreen_target_is_a_composite_failure() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    graphics.device_mut().fail_resolve(true);

    let err = graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap_err();
    assert!(err.is_display_fatal());
    assert!(graphics.device().draws().is_empty());
}

#[test]
fn depth_test_is_restored_after_composite() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    graphics.device_mut().clear_commands();

    graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap();

    let device = graphics.device();
    let off = device
        .position_of(|c| *c == DeviceCommand::DepthTest(false))
        .unwrap();
    assert!(off < device.position_of(is_draw("postprocess")).unwrap());
    assert_eq!(
        device.commands()[device.commands().len() - 2],
        DeviceCommand::DepthTest(true)
    );
    assert!(device.is_depth_test_enabled());
}

#[test]
fn frame_after_failed_composite_draws_with_depth() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = lit_scene(&mut graphics, &settings);
    add_cube(&mut graphics, &mut scene);

    graphics.device_mut().fail_program("postprocess");
    assert!(graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .is_err());
    assert!(!graphics.device().is_depth_test_enabled());

    graphics.device_mut().clear_commands();
    let _ = graphics.render_frame(&ManualClock::new(0.1), &mut scene);

    let device = graphics.device();
    let depth_on = device
        .position_of(|c| *c == DeviceCommand::DepthTest(true))
        .unwrap();
    assert!(depth_on < device.position_of(is_draw("light")).unwrap());
}

#[test]
fn scene_without_lighting_is_rejected() {
    let settings = single_light_settings();
    let mut graphics = pipeline(&settings);
    let mut scene = Scene::new();
    graphics.device_mut().clear_commands();

    let err = graphics
        .render_frame(&ManualClock::new(0.0), &mut scene)
        .unwrap_err();
    assert_eq!(err, FrameError::MissingLighting);
    assert!(graphics.device().commands().is_empty());
}

#[test]
fn missing_quad_mesh_is_fatal() {
    let settings = RenderSettings::default();
    let result = Graphics::new(HeadlessDevice::new(), &settings);

    match result {
        Err(InitError::MissingMesh { path, .. }) => {
            assert_eq!(path, PathBuf::from("square.obj"))
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("pipeline built without its quad mesh"),
    }
}

#[test]
fn device_failure_is_fatal() {
    let settings = RenderSettings::default();
    let mut device = HeadlessDevice::with_default_assets(&settings.assets);
    device.fail_initialize(true);

    assert!(matches!(
        Graphics::new(device, &settings),
        Err(InitError::Device(_))
    ));
}

#[test]
fn device_is_configured_from_settings() {
    let settings = RenderSettings::default();
    let graphics = pipeline(&settings);
    let config = graphics.device().config().unwrap();

    assert_eq!((config.width, config.height), (800, 600));
    assert_eq!(config.sample_count, 4);
    assert_eq!(config.gamma, 1.0);
}
