//! Display metadata handed to each capture surface

use serde::{Deserialize, Serialize};

/// Display bounds in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One physical display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub id: u32,
    pub scale_factor: f32,
    pub bounds: Bounds,
}

impl Display {
    /// Display id as used on the action channel
    pub fn screen_id(&self) -> String {
        self.id.to_string()
    }

    /// Size of the display's pixel buffer
    pub fn physical_size(&self) -> (u32, u32) {
        (
            scaled(self.bounds.width, self.scale_factor),
            scaled(self.bounds.height, self.scale_factor),
        )
    }
}

/// Scale a logical length to physical pixels
pub fn scaled(length: i32, scale_factor: f32) -> u32 {
    (length.max(0) as f32 * scale_factor).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_rounds_fractional_scales() {
        let display = Display {
            id: 7,
            scale_factor: 1.25,
            bounds: Bounds {
                x: 0,
                y: 0,
                width: 1366,
                height: 768,
            },
        };
        assert_eq!(display.physical_size(), (1708, 960));
        assert_eq!(display.screen_id(), "7");
    }

    #[test]
    fn deserializes_camel_case() {
        let display: Display = serde_json::from_str(
            r#"{"id":1,"scaleFactor":2.0,"bounds":{"x":0,"y":0,"width":800,"height":600}}"#,
        )
        .unwrap();
        assert_eq!(display.scale_factor, 2.0);
        assert_eq!(display.physical_size(), (1600, 1200));
    }
}
