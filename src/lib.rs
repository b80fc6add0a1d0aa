pub mod demo;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod time;

pub use error::{DeviceError, DrawError, FrameError, InitError, ShadowPassError};
pub use renderer::{Graphics, GraphicsDevice, HeadlessDevice};
pub use scene::Scene;
pub use settings::RenderSettings;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` when set, `info` otherwise.
pub fn init_logging() {
    let _ = logger_builder(env_logger::Env::default()).try_init();
}

fn logger_builder(env: env_logger::Env<'_>) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or(DEFAULT_LOG_FILTER))
}
