use std::error::Error;

use frame_pipeline::demo::{build_demo_scene, run_frames};
use frame_pipeline::time::ManualClock;
use frame_pipeline::{init_logging, Graphics, HeadlessDevice, RenderSettings};

const DEFAULT_FRAMES: u32 = 120;

fn run(settings_path: &str, frames: u32) -> Result<(), Box<dyn Error>> {
    let settings = RenderSettings::load_from_path(settings_path);

    let mut device = HeadlessDevice::with_default_assets(&settings.assets);
    // nothing inspects the command log outside tests
    device.set_recording(false);
    let mut graphics = Graphics::new(device, &settings)?;
    let mut scene = build_demo_scene(graphics.device_mut(), &settings)?;

    let mut clock = ManualClock::default();
    let outcome = run_frames(&mut graphics, &mut scene, &mut clock, frames);

    scene.shutdown(graphics.device_mut());
    outcome?;
    Ok(())
}

fn main() {
    init_logging();

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().unwrap_or_else(|| "settings.json".to_string());
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    log::info!("Starting frame pipeline ({frames} frames)");
    if let Err(err) = run(&settings_path, frames) {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
    log::info!("Application shutdown complete");
}
