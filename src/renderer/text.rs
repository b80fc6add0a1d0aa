use crate::error::{DeviceError, InitError};
use crate::renderer::device::{FontId, GraphicsDevice};

/// Screen-space text in a single font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleText {
    font: FontId,
    family: String,
}

impl SimpleText {
    pub fn new(device: &mut dyn GraphicsDevice, family: &str) -> Result<Self, InitError> {
        let font = device.load_font(family).map_err(|source| InitError::Font {
            font: family.to_string(),
            source,
        })?;
        Ok(Self {
            font,
            family: family.to_string(),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn write(
        &self,
        device: &mut dyn GraphicsDevice,
        text: &str,
        x: f32,
        y: f32,
    ) -> Result<(), DeviceError> {
        device.draw_text(self.font, text, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessDevice;

    #[test]
    fn writes_through_device() {
        let mut device = HeadlessDevice::new();
        let text = SimpleText::new(&mut device, "Special Elite").unwrap();
        text.write(&mut device, "60.00 fps", 25.0, 25.0).unwrap();
        assert_eq!(device.texts(), vec!["60.00 fps"]);
    }
}
