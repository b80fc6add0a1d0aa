use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`GraphicsDevice`](crate::renderer::GraphicsDevice).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("device initialization failed: {0}")]
    Initialization(String),
    #[error("asset not found: {0}")]
    AssetNotFound(PathBuf),
    #[error("render target {0} could not be resolved")]
    Resolve(u32),
    #[error("draw through program `{program}` failed")]
    Draw { program: String },
    #[error("text draw failed: {0}")]
    Text(String),
    #[error("resource creation failed: {0}")]
    Resource(String),
}

/// A single draw (one instance, one quad, one skybox cube) failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("shader `{shader}` failed to draw")]
    Shader {
        shader: String,
        #[source]
        source: DeviceError,
    },
    #[error("model index {0} is not present in the model collection")]
    MissingModel(usize),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("shadow pass for light {light} failed")]
pub struct ShadowPassError {
    pub light: usize,
    #[source]
    pub source: DrawError,
}

/// Why a call to `Graphics::render_frame` aborted the current frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("scene exposes no lighting subsystem")]
    MissingLighting,
    #[error(transparent)]
    ShadowPass(#[from] ShadowPassError),
    #[error("main scene pass failed")]
    ScenePass(#[source] DrawError),
    #[error("failed to composite off-screen image to the display")]
    Composite(#[source] DrawError),
}

impl FrameError {
    /// The display pipeline itself is broken, not just one asset.
    pub fn is_display_fatal(&self) -> bool {
        matches!(self, FrameError::Composite(_))
    }
}

/// Construction of the pipeline or one of its subsystems failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("graphics device could not be created")]
    Device(#[source] DeviceError),
    #[error("required mesh `{}` could not be loaded", path.display())]
    MissingMesh {
        path: PathBuf,
        #[source]
        source: DeviceError,
    },
    #[error("shader `{vertex}`/`{pixel}` could not be created")]
    Shader {
        vertex: String,
        pixel: String,
        #[source]
        source: DeviceError,
    },
    #[error("off-screen buffer could not be initialized")]
    OffscreenTarget(#[source] DeviceError),
    #[error("shadow map for light slot {slot} could not be created")]
    ShadowMap {
        slot: usize,
        #[source]
        source: DeviceError,
    },
    #[error("overlay font `{font}` could not be loaded")]
    Font {
        font: String,
        #[source]
        source: DeviceError,
    },
    #[error("{requested} light slots requested but at most {max} are supported")]
    TooManyLights { requested: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_composite_failures_are_display_fatal() {
        let draw = DrawError::MissingModel(3);
        assert!(FrameError::Composite(draw.clone()).is_display_fatal());
        assert!(!FrameError::ScenePass(draw.clone()).is_display_fatal());
        assert!(!FrameError::MissingLighting.is_display_fatal());
        assert!(!FrameError::from(ShadowPassError {
            light: 0,
            source: draw
        })
        .is_display_fatal());
    }

    #[test]
    fn shadow_pass_error_names_the_light() {
        let err = ShadowPassError {
            light: 2,
            source: DrawError::MissingModel(0),
        };
        assert_eq!(err.to_string(), "shadow pass for light 2 failed");
    }
}
