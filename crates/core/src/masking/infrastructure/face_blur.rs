use crate::masking::domain::face_geometry::PixelRect;
use crate::masking::domain::mask_style::MaskStyle;
use crate::shared::frame::Frame;

use super::gaussian::GaussianBlur;
use super::scratch_buffer::ScratchBuffer;

/// Blurs `rect` in place with a radius proportional to its width.
pub fn blur_region(
    frame: &mut Frame,
    rect: PixelRect,
    style: &MaskStyle,
    scratch: &mut ScratchBuffer,
    blur: &mut GaussianBlur,
) {
    let radius = style.blur_radius_px(rect.width);
    let channels = frame.channels() as usize;
    let region = scratch.extract(frame, rect);
    blur.blur(region, rect.width as usize, rect.height as usize, channels, radius);
    scratch.write_back(frame, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Frame {
        let mut frame = Frame::blank(width, height, 3);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / 2 + y / 2) % 2 == 0 { 255 } else { 0 };
                let off = frame.offset(x, y);
                frame.data_mut()[off..off + 3].fill(v);
            }
        }
        frame
    }

    fn contrast(frame: &Frame, rect: PixelRect) -> u8 {
        let mut lo = 255u8;
        let mut hi = 0u8;
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                lo = lo.min(frame.pixel(x, y)[0]);
                hi = hi.max(frame.pixel(x, y)[0]);
            }
        }
        hi - lo
    }

    #[test]
    fn test_flattens_detail_inside_region_only() {
        let mut frame = checkerboard(80, 80);
        let original = frame.clone();
        let rect = PixelRect {
            x: 20,
            y: 20,
            width: 40,
            height: 40,
        };
        blur_region(&mut frame, rect, &MaskStyle::default(), &mut ScratchBuffer::new(), &mut GaussianBlur::new());

        let inner = PixelRect {
            x: 30,
            y: 30,
            width: 20,
            height: 20,
        };
        assert!(contrast(&frame, inner) < 40, "contrast {}", contrast(&frame, inner));
        assert_eq!(frame.pixel(10, 10), original.pixel(10, 10));
        assert_eq!(frame.pixel(70, 65), original.pixel(70, 65));
    }

    #[test]
    fn test_narrow_region_uses_small_radius() {
        // 10 px wide -> radius ceil(0.8) = 1: blurred but not flat.
        let mut frame = Frame::blank(20, 20, 3);
        for y in 0..20 {
            for x in 0..20 {
                let v = if (x / 2) % 2 == 0 { 255 } else { 0 };
                let off = frame.offset(x, y);
                frame.data_mut()[off..off + 3].fill(v);
            }
        }
        let rect = PixelRect {
            x: 5,
            y: 5,
            width: 10,
            height: 10,
        };
        blur_region(&mut frame, rect, &MaskStyle::default(), &mut ScratchBuffer::new(), &mut GaussianBlur::new());
        let c = contrast(&frame, rect);
        assert!(c > 20 && c < 255, "contrast {c}");
    }
}
