use std::path::Path;

use glam::{Quat, Vec3};
use log::{info, warn};

use crate::error::{FrameError, InitError};
use crate::renderer::device::GraphicsDevice;
use crate::renderer::graphics::Graphics;
use crate::renderer::lighting::LightingSubsystem;
use crate::renderer::lights::LightKind;
use crate::renderer::mesh::GpuMesh;
use crate::renderer::primitives::cube_mesh;
use crate::scene::{InstanceTransform, RotateAnimation, Scene, StaticModel};
use crate::settings::RenderSettings;
use crate::time::{Clock, ManualClock};

pub const SKYBOX_TEXTURE: &str = "skybox.dds";
pub const FRAME_TIME: f64 = 1.0 / 60.0;

const SUN_POSITION: Vec3 = Vec3::new(10.0, 40.0, -10.0);
const SUN_DIRECTION: Vec3 = Vec3::new(-0.25, -1.0, 0.25);

/// A floor, a ring of spinning cubes, every spot light aimed at the centre
/// and a sun overhead.
pub fn build_demo_scene(
    device: &mut dyn GraphicsDevice,
    settings: &RenderSettings,
) -> Result<Scene, InitError> {
    info!("Creating demo scene...");

    let mut lighting = LightingSubsystem::new(device, &settings.lighting, settings.shadow)?;

    let (vertices, indices) = cube_mesh();
    let mesh = GpuMesh::from_geometry(device, &vertices, &indices).map_err(|source| {
        InitError::MissingMesh {
            path: "<cube>".into(),
            source,
        }
    })?;

    let mut scene = Scene::new();
    let cube = scene.models_mut().add(StaticModel::new("cube", mesh));

    scene.spawn_named(
        "Floor",
        cube,
        InstanceTransform::from_translation(Vec3::new(0.0, -0.05, 0.0))
            .with_scale(Vec3::new(25.0, 0.1, 25.0)),
    );

    const RING: usize = 6;
    for i in 0..RING {
        let angle = i as f32 / RING as f32 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 4.0, 1.0, angle.sin() * 4.0);
        let entity = scene.spawn_named(
            format!("Cube {i}"),
            cube,
            InstanceTransform::from_translation(position)
                .with_rotation(Quat::from_rotation_y(angle)),
        );
        let _ = scene.world_mut().insert_one(
            entity,
            RotateAnimation {
                axis: Vec3::Y,
                speed: 0.5 + i as f32 * 0.1,
            },
        );
    }

    let slots = lighting.lights().len();
    let spots = lighting
        .lights()
        .iter()
        .filter(|light| light.kind() == LightKind::Spot)
        .count();
    for slot in 0..slots {
        if slot < spots {
            let angle = slot as f32 / spots as f32 * std::f32::consts::TAU;
            let position = Vec3::new(angle.cos() * 8.0, 6.0, angle.sin() * 8.0);
            lighting.move_light(slot, position, Vec3::new(0.0, 1.0, 0.0) - position);
        } else {
            lighting.move_light(slot, SUN_POSITION, SUN_DIRECTION);
        }
    }
    scene.set_lighting(lighting);

    match device.load_texture(Path::new(SKYBOX_TEXTURE)) {
        Ok(texture) => scene.set_skybox(Some(texture)),
        Err(err) => warn!("Skybox unavailable ({err}); rendering without it"),
    }

    info!(
        "Demo scene ready: {} instances, {} light slots",
        scene.instance_count(),
        slots
    );
    Ok(scene)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames_rendered: u32,
    pub frames_dropped: u32,
    pub last_fps: Option<f64>,
}

/// Steps `scene` and renders `frames` frames at a fixed 60 Hz.
///
/// Frames that fail a pass are dropped and the run continues. A display-fatal
/// error ends the run and is returned.
pub fn run_frames<D: GraphicsDevice>(
    graphics: &mut Graphics<D>,
    scene: &mut Scene,
    clock: &mut ManualClock,
    frames: u32,
) -> Result<RunSummary, FrameError> {
    let mut summary = RunSummary {
        frames_rendered: 0,
        frames_dropped: 0,
        last_fps: None,
    };
    for frame in 0..frames {
        scene.update(FRAME_TIME);
        match graphics.render_frame(clock, scene) {
            Ok(()) => summary.frames_rendered += 1,
            Err(err) if err.is_display_fatal() => {
                log::error!("Frame {frame}: {err}; stopping");
                return Err(err);
            }
            Err(err) => {
                summary.frames_dropped += 1;
                warn!("Frame {frame} dropped: {err}");
            }
        }
        clock.advance(FRAME_TIME);
    }

    summary.last_fps = graphics.frame_timing().last_fps();
    info!(
        "Rendered {} frames in {:.2}s of scene time ({} dropped, last fps {:?})",
        summary.frames_rendered,
        clock.since_init(),
        summary.frames_dropped,
        summary.last_fps
    );
    Ok(summary)
}
