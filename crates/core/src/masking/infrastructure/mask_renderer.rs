use crate::detection::domain::face_record::FaceRecord;
use crate::masking::domain::face_geometry::{blackout_ellipse, padded_face_box};
use crate::masking::domain::mask_style::MaskStyle;
use crate::masking::domain::privacy_mode::PrivacyMode;
use crate::shared::frame::Frame;

use super::blackout::draw_blackout;
use super::eye_mask::draw_eye_mask;
use super::face_blur::blur_region;
use super::gaussian::GaussianBlur;
use super::mosaic::pixelate_region;
use super::scratch_buffer::ScratchBuffer;

/// Applies the active privacy mode to every face, in place.
///
/// Owns the scratch buffer and blur kernels shared by the region-based
/// modes; they persist across frames.
pub struct MaskRenderer {
    style: MaskStyle,
    scratch: ScratchBuffer,
    blur: GaussianBlur,
}

impl MaskRenderer {
    pub fn new(style: MaskStyle) -> Self {
        Self {
            style,
            scratch: ScratchBuffer::new(),
            blur: GaussianBlur::new(),
        }
    }

    pub fn style(&self) -> &MaskStyle {
        &self.style
    }

    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }

    /// Masks each face with `mode`. Returns how many faces were masked;
    /// faces with degenerate geometry are skipped.
    pub fn render(&mut self, frame: &mut Frame, faces: &[FaceRecord], mode: PrivacyMode) -> usize {
        let (width, height) = (frame.width(), frame.height());
        let mut masked = 0;
        for face in faces {
            let done = match mode {
                PrivacyMode::EyeMask => draw_eye_mask(frame, face, &self.style),
                PrivacyMode::FaceBlur => match padded_face_box(face, width, height, self.style.face_padding)
                    .and_then(|b| b.pixel_rect())
                {
                    Some(rect) => {
                        blur_region(frame, rect, &self.style, &mut self.scratch, &mut self.blur);
                        true
                    }
                    None => false,
                },
                PrivacyMode::Blackout => match blackout_ellipse(face, width, height, self.style.face_padding) {
                    Some(ellipse) => {
                        draw_blackout(frame, &ellipse, &self.style);
                        true
                    }
                    None => false,
                },
                PrivacyMode::Mosaic => match padded_face_box(face, width, height, self.style.face_padding)
                    .and_then(|b| b.pixel_rect())
                {
                    Some(rect) => {
                        pixelate_region(frame, rect, &self.style, &mut self.scratch);
                        true
                    }
                    None => false,
                },
            };
            if done {
                masked += 1;
            } else {
                log::debug!("Skipped face with degenerate geometry ({mode})");
            }
        }
        masked
    }
}

impl Default for MaskRenderer {
    fn default() -> Self {
        Self::new(MaskStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_record::LandmarkLayout;
    use crate::detection::domain::landmark::NormalizedLandmark;
    use rstest::rstest;

    /// A full-mesh face whose landmarks fill the square `[lo, hi]` (normalised).
    fn square_face(lo: f64, hi: f64) -> FaceRecord {
        let mut landmarks = vec![NormalizedLandmark::new((lo + hi) / 2.0, (lo + hi) / 2.0); 300];
        landmarks[0] = NormalizedLandmark::new(lo, lo);
        landmarks[1] = NormalizedLandmark::new(hi, hi);
        let eye_y = lo + (hi - lo) * 0.4;
        landmarks[33] = NormalizedLandmark::new(lo + (hi - lo) * 0.3, eye_y);
        landmarks[263] = NormalizedLandmark::new(lo + (hi - lo) * 0.7, eye_y);
        FaceRecord::from_raw(landmarks, &LandmarkLayout::default()).unwrap()
    }

    fn pattern(width: u32, height: u32) -> Frame {
        let mut frame = Frame::blank(width, height, 3);
        for (i, v) in frame.data_mut().iter_mut().enumerate() {
            *v = ((i * 37) % 251) as u8;
        }
        frame
    }

    #[rstest]
    #[case(PrivacyMode::EyeMask)]
    #[case(PrivacyMode::FaceBlur)]
    #[case(PrivacyMode::Blackout)]
    #[case(PrivacyMode::Mosaic)]
    fn test_every_mode_changes_face_and_spares_background(#[case] mode: PrivacyMode) {
        let mut frame = pattern(200, 200);
        let original = frame.clone();
        let faces = vec![square_face(0.3, 0.6)];
        let masked = MaskRenderer::default().render(&mut frame, &faces, mode);
        assert_eq!(masked, 1);
        assert_ne!(frame.data(), original.data());
        assert_eq!(frame.pixel(5, 5), original.pixel(5, 5));
        assert_eq!(frame.pixel(195, 195), original.pixel(195, 195));
    }

    #[rstest]
    #[case(PrivacyMode::EyeMask)]
    #[case(PrivacyMode::FaceBlur)]
    #[case(PrivacyMode::Blackout)]
    #[case(PrivacyMode::Mosaic)]
    fn test_rendering_is_deterministic(#[case] mode: PrivacyMode) {
        let faces = vec![square_face(0.2, 0.5), square_face(0.55, 0.9)];
        let mut a = pattern(160, 120);
        let mut b = pattern(160, 120);
        MaskRenderer::default().render(&mut a, &faces, mode);
        MaskRenderer::default().render(&mut b, &faces, mode);
        assert_eq!(a.data(), b.data());
    }

    #[rstest]
    #[case(PrivacyMode::FaceBlur)]
    #[case(PrivacyMode::Blackout)]
    #[case(PrivacyMode::Mosaic)]
    fn test_degenerate_face_is_skipped(#[case] mode: PrivacyMode) {
        let mut frame = pattern(100, 100);
        let original = frame.clone();
        // Entirely outside the buffer.
        let faces = vec![square_face(1.5, 1.8)];
        assert_eq!(MaskRenderer::default().render(&mut frame, &faces, mode), 0);
        assert_eq!(frame.data(), original.data());
    }

    #[test]
    fn test_no_faces_leaves_frame_untouched() {
        let mut frame = pattern(50, 50);
        let original = frame.clone();
        assert_eq!(MaskRenderer::default().render(&mut frame, &[], PrivacyMode::Blackout), 0);
        assert_eq!(frame.data(), original.data());
    }

    #[test]
    fn test_scratch_buffer_reused_across_frames() {
        let mut renderer = MaskRenderer::default();
        let faces = vec![square_face(0.3, 0.6)];
        for _ in 0..5 {
            let mut frame = pattern(200, 200);
            renderer.render(&mut frame, &faces, PrivacyMode::Mosaic);
            renderer.render(&mut frame, &faces, PrivacyMode::FaceBlur);
        }
        assert_eq!(renderer.scratch().reallocations(), 1);
    }

    #[test]
    fn test_eye_corner_faces_support_region_modes() {
        let mut frame = pattern(200, 200);
        let original = frame.clone();
        let face = FaceRecord::from_eye_corners(NormalizedLandmark::new(0.4, 0.5), NormalizedLandmark::new(0.6, 0.5));
        // The box is the eye line padded by 0.2 * 40 px on every side.
        assert_eq!(MaskRenderer::default().render(&mut frame, &[face], PrivacyMode::Blackout), 1);
        // Ellipse centred at (100, 100) with radii 28 x 8; the label sits
        // between x = 89 and 111.
        assert_eq!(frame.pixel(80, 100), &[0, 0, 0]);
        assert_eq!(frame.pixel(100, 80), original.pixel(100, 80));
    }
}
