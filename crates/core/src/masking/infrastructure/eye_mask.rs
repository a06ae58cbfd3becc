use crate::detection::domain::face_record::FaceRecord;
use crate::masking::domain::face_geometry::eye_bar;
use crate::masking::domain::mask_style::MaskStyle;
use crate::shared::frame::Frame;

use super::raster::fill_convex_polygon;

/// Draws an opaque bar over both eyes. The bar is filled as a quad so its
/// width never depends on a line rasteriser. Returns `false` when the eye
/// corners coincide and nothing was drawn.
pub fn draw_eye_mask(frame: &mut Frame, face: &FaceRecord, style: &MaskStyle) -> bool {
    let Some(bar) = eye_bar(face, frame.width(), frame.height(), style.eye_extension, style.eye_thickness) else {
        return false;
    };
    fill_convex_polygon(frame, &bar.quad(), style.mask_color);
    true
}
