use crate::shared::color::Rgba;

/// Allowed eye-bar extension, as a fraction of the eye-to-eye vector.
pub const EYE_EXTENSION_RANGE: (f64, f64) = (0.1, 0.4);

/// Geometry coefficients and colors for the four mask modes. All lengths
/// are relative to the face they apply to.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskStyle {
    /// Eye bar overshoot past each eye corner.
    pub eye_extension: f64,
    /// Eye bar thickness relative to the eye distance.
    pub eye_thickness: f64,
    /// Padding added on every side of the face box, relative to its width.
    pub face_padding: f64,
    /// Blur radius relative to the padded face width.
    pub blur_radius: f64,
    /// Mosaic block edge relative to the padded face width.
    pub mosaic_block: f64,
    pub mosaic_min_block: u32,
    /// Ellipse outline width relative to `rx + ry`.
    pub outline_width: f64,
    /// Label height relative to `rx + ry`.
    pub label_size: f64,
    pub label: String,
    pub mask_color: Rgba,
    pub outline_color: Rgba,
    pub label_color: Rgba,
}

impl Default for MaskStyle {
    fn default() -> Self {
        Self {
            eye_extension: 0.4,
            eye_thickness: 0.8,
            face_padding: 0.2,
            blur_radius: 0.08,
            mosaic_block: 0.08,
            mosaic_min_block: 4,
            outline_width: 0.01,
            label_size: 0.2,
            label: "FACE".to_string(),
            mask_color: Rgba::BLACK,
            outline_color: Rgba::RED,
            label_color: Rgba::WHITE,
        }
    }
}

impl MaskStyle {
    pub fn with_eye_extension(mut self, eye_extension: f64) -> Self {
        self.eye_extension = eye_extension;
        self
    }

    /// Blur radius in pixels for a region `width` pixels wide.
    pub fn blur_radius_px(&self, width: u32) -> u32 {
        (width as f64 * self.blur_radius).ceil() as u32
    }

    /// Mosaic block edge in pixels for a region `width` pixels wide.
    pub fn mosaic_block_px(&self, width: u32) -> u32 {
        ((width as f64 * self.mosaic_block).floor() as u32).max(self.mosaic_min_block.max(1))
    }
}
