use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::device::{DeviceConfig, DeviceFlags};
use crate::renderer::lights::{ShadowTuning, MAX_LIGHTS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "RenderSettings::default_sample_count")]
    pub sample_count: u32,
    #[serde(default = "RenderSettings::default_vsync")]
    pub vsync: bool,
    #[serde(default)]
    pub stencil: bool,
    #[serde(default = "RenderSettings::default_gamma")]
    pub gamma: f32,
    /// Draw the scene off-screen and composite it onto the presentation
    /// buffer with the post-process shader.
    #[serde(default = "RenderSettings::default_offscreen_composite")]
    pub offscreen_composite: bool,
    #[serde(default)]
    pub lighting: LightingSettings,
    #[serde(default)]
    pub shadow: ShadowTuning,
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default)]
    pub assets: AssetSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            sample_count: Self::default_sample_count(),
            vsync: Self::default_vsync(),
            stencil: false,
            gamma: Self::default_gamma(),
            offscreen_composite: Self::default_offscreen_composite(),
            lighting: LightingSettings::default(),
            shadow: ShadowTuning::default(),
            overlay: OverlaySettings::default(),
            assets: AssetSettings::default(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    pub fn validate(mut self) -> Self {
        if self.sample_count == 0 {
            warn!("Sample count must be greater than zero. Using default value.");
            self.sample_count = Self::default_sample_count();
        }

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if self.gamma.is_nan() || self.gamma <= 0.0 {
            warn!("Gamma must be positive. Using default value.");
            self.gamma = Self::default_gamma();
        }

        if self.lighting.shadow_map_size == 0 {
            warn!("Shadow map size must be greater than zero. Using default value.");
            self.lighting.shadow_map_size = LightingSettings::default_shadow_map_size();
        }

        if self.lighting.slot_count() > MAX_LIGHTS {
            warn!(
                "{} light slots requested but at most {} are supported. Using default lighting.",
                self.lighting.slot_count(),
                MAX_LIGHTS
            );
            let shadow_map_size = self.lighting.shadow_map_size;
            self.lighting = LightingSettings {
                shadow_map_size,
                ..LightingSettings::default()
            };
        }

        if !self.shadow.is_valid() {
            warn!("Shadow tuning values must be positive with near < far. Using defaults.");
            self.shadow = ShadowTuning::default();
        }

        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.resolution.width as f32 / self.resolution.height.max(1) as f32
    }

    pub fn device_config(&self) -> DeviceConfig {
        let mut flags = DeviceFlags::empty();
        flags.set(DeviceFlags::VSYNC, self.vsync);
        flags.set(DeviceFlags::STENCIL, self.stencil);

        DeviceConfig {
            width: self.resolution.width,
            height: self.resolution.height,
            flags,
            sample_count: self.sample_count,
            gamma: self.gamma,
        }
    }

    const fn default_sample_count() -> u32 {
        4
    }

    const fn default_vsync() -> bool {
        true
    }

    const fn default_gamma() -> f32 {
        1.0
    }

    const fn default_offscreen_composite() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Shadow-casting light slots created by the lighting subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingSettings {
    #[serde(default = "LightingSettings::default_spot_lights")]
    pub spot_lights: usize,
    #[serde(default = "LightingSettings::default_directional_light")]
    pub directional_light: bool,
    #[serde(default = "LightingSettings::default_shadow_map_size")]
    pub shadow_map_size: u32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            spot_lights: Self::default_spot_lights(),
            directional_light: Self::default_directional_light(),
            shadow_map_size: Self::default_shadow_map_size(),
        }
    }
}

impl LightingSettings {
    pub fn slot_count(&self) -> usize {
        self.spot_lights + usize::from(self.directional_light)
    }

    const fn default_spot_lights() -> usize {
        4
    }

    const fn default_directional_light() -> bool {
        true
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(default = "OverlaySettings::default_font")]
    pub font: String,
    #[serde(default = "OverlaySettings::default_position")]
    pub x: f32,
    #[serde(default = "OverlaySettings::default_position")]
    pub y: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            font: Self::default_font(),
            x: Self::default_position(),
            y: Self::default_position(),
        }
    }
}

impl OverlaySettings {
    fn default_font() -> String {
        "Special Elite".to_string()
    }

    const fn default_position() -> f32 {
        25.0
    }
}

/// Meshes the pipeline cannot run without.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "AssetSettings::default_quad_mesh")]
    pub quad_mesh: String,
    #[serde(default = "AssetSettings::default_skybox_mesh")]
    pub skybox_mesh: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            quad_mesh: Self::default_quad_mesh(),
            skybox_mesh: Self::default_skybox_mesh(),
        }
    }
}

impl AssetSettings {
    fn default_quad_mesh() -> String {
        "square.obj".to_string()
    }

    fn default_skybox_mesh() -> String {
        "cube.obj".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            sample_count: 0,
            gamma: -1.0,
            lighting: LightingSettings {
                spot_lights: MAX_LIGHTS,
                directional_light: true,
                shadow_map_size: 0,
            },
            shadow: ShadowTuning {
                near_plane: 10.0,
                far_plane: 1.0,
                ..ShadowTuning::default()
            },
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();
        let defaults = RenderSettings::default();

        assert_eq!(validated.sample_count, defaults.sample_count);
        assert_eq!(validated.resolution, defaults.resolution);
        assert_eq!(validated.gamma, defaults.gamma);
        assert_eq!(validated.lighting, defaults.lighting);
        assert_eq!(validated.shadow, defaults.shadow);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            sample_count: 8,
            offscreen_composite: false,
            lighting: LightingSettings {
                spot_lights: 2,
                directional_light: false,
                shadow_map_size: 1024,
            },
            ..RenderSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.resolution, valid.resolution);
        assert_eq!(validated.sample_count, valid.sample_count);
        assert!(!validated.offscreen_composite);
        assert_eq!(validated.lighting, valid.lighting);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{ "resolution": { "width": 1024, "height": 768 } }"#)
                .unwrap();

        assert_eq!(settings.resolution.width, 1024);
        assert_eq!(settings.sample_count, 4);
        assert!(settings.offscreen_composite);
        assert_eq!(settings.overlay.font, "Special Elite");
        assert_eq!(settings.assets.quad_mesh, "square.obj");
        assert_eq!(settings.shadow.frustum_angle_multiplier, 2.5);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = RenderSettings::load_from_path("does/not/exist.json");
        assert_eq!(settings.resolution, Resolution::default());
    }

    #[test]
    fn device_config_maps_flags() {
        let settings = RenderSettings {
            vsync: false,
            stencil: true,
            ..RenderSettings::default()
        };
        let config = settings.device_config();

        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.flags.contains(DeviceFlags::STENCIL));
        assert!(!config.flags.contains(DeviceFlags::VSYNC));
        assert_eq!(config.sample_count, 4);
    }
}
