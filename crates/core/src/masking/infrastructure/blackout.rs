use crate::masking::domain::face_geometry::Ellipse;
use crate::masking::domain::mask_style::MaskStyle;
use crate::shared::frame::Frame;

use super::glyphs::{draw_text, TextPlacement};
use super::raster::{fill_ellipse, stroke_ellipse};

/// Covers the face with a filled ellipse, outlines it and writes the label
/// across its centre, all rotated to follow the eye line.
pub fn draw_blackout(frame: &mut Frame, ellipse: &Ellipse, style: &MaskStyle) {
    let span = ellipse.radius_x + ellipse.radius_y;
    fill_ellipse(frame, ellipse, style.mask_color);
    stroke_ellipse(frame, ellipse, span * style.outline_width, style.outline_color);
    if !style.label.is_empty() {
        let placement = TextPlacement {
            center: ellipse.center,
            height: span * style.label_size,
            rotation: ellipse.rotation,
        };
        draw_text(frame, &style.label, &placement, style.label_color);
    }
}
