//! Scanline fills for the shapes the mask modes draw. A pixel is covered
//! when its centre lies inside the shape; no anti-aliasing, so repeated
//! draws produce identical output.

use crate::masking::domain::face_geometry::{Ellipse, Point};
use crate::shared::color::Rgba;
use crate::shared::frame::Frame;

/// Pixel range `[start, end)` whose centres can fall within `[lo, hi]`,
/// clipped to `[0, limit)`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = ((hi - 0.5).floor() + 1.0).min(limit as f64);
    if !(end > start) {
        return (0, 0);
    }
    (start as u32, end as u32)
}

/// Fills a convex polygon given in either winding order.
pub fn fill_convex_polygon(frame: &mut Frame, points: &[Point], color: Rgba) {
    if points.len() < 3 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return;
    }
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let (x0, x1) = pixel_span(min_x, max_x, frame.width());
    let (y0, y1) = pixel_span(min_y, max_y, frame.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let c = Point::new(px as f64 + 0.5, py as f64 + 0.5);
            if inside_convex(points, c) {
                frame.put_pixel(px as i64, py as i64, color);
            }
        }
    }
}

fn inside_convex(points: &[Point], p: Point) -> bool {
    let mut sign = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

pub fn fill_ellipse(frame: &mut Frame, ellipse: &Ellipse, color: Rgba) {
    fill_ellipse_ring(frame, ellipse, 0.0, color, false);
}

/// Strokes the ellipse outline with a band `width` pixels wide, centred on
/// the outline.
pub fn stroke_ellipse(frame: &mut Frame, ellipse: &Ellipse, width: f64, color: Rgba) {
    if width <= 0.0 {
        return;
    }
    fill_ellipse_ring(frame, ellipse, width / 2.0, color, true);
}

fn fill_ellipse_ring(frame: &mut Frame, ellipse: &Ellipse, half_width: f64, color: Rgba, ring: bool) {
    let outer_x = ellipse.radius_x + half_width;
    let outer_y = ellipse.radius_y + half_width;
    if !(outer_x > 0.0 && outer_y > 0.0) || !ellipse.center.x.is_finite() || !ellipse.center.y.is_finite() {
        return;
    }
    let inner_x = ellipse.radius_x - half_width;
    let inner_y = ellipse.radius_y - half_width;

    let outer = Ellipse {
        radius_x: outer_x,
        radius_y: outer_y,
        ..*ellipse
    };
    let (ex, ey) = outer.half_extents();
    let (x0, x1) = pixel_span(ellipse.center.x - ex, ellipse.center.x + ex, frame.width());
    let (y0, y1) = pixel_span(ellipse.center.y - ey, ellipse.center.y + ey, frame.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let local = ellipse.to_local(Point::new(px as f64 + 0.5, py as f64 + 0.5));
            if !within(local, outer_x, outer_y) {
                continue;
            }
            if ring && inner_x > 0.0 && inner_y > 0.0 && within(local, inner_x, inner_y) {
                continue;
            }
            frame.put_pixel(px as i64, py as i64, color);
        }
    }
}

fn within(local: Point, rx: f64, ry: f64) -> bool {
    let nx = local.x / rx;
    let ny = local.y / ry;
    nx * nx + ny * ny <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(frame: &Frame, color: Rgba) -> usize {
        let c = frame.channels() as usize;
        frame.data().chunks(c).filter(|px| **px == color.0[..c]).count()
    }

    #[test]
    fn test_axis_aligned_square_fills_exact_pixels() {
        let mut frame = Frame::blank(10, 10, 3);
        let square = [
            Point::new(2.0, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.0, 5.0),
            Point::new(2.0, 5.0),
        ];
        fill_convex_polygon(&mut frame, &square, Rgba::WHITE);
        assert_eq!(count(&frame, Rgba::WHITE), 4 * 3);
        assert_eq!(frame.pixel(2, 2), &[255, 255, 255]);
        assert_eq!(frame.pixel(5, 4), &[255, 255, 255]);
        assert_eq!(frame.pixel(6, 4), &[0, 0, 0]);
    }

    #[test]
    fn test_polygon_winding_does_not_matter() {
        let mut a = Frame::blank(12, 12, 3);
        let mut b = Frame::blank(12, 12, 3);
        let quad = [
            Point::new(1.0, 4.0),
            Point::new(6.0, 1.0),
            Point::new(11.0, 6.0),
            Point::new(5.0, 10.0),
        ];
        let mut reversed = quad;
        reversed.reverse();
        fill_convex_polygon(&mut a, &quad, Rgba::WHITE);
        fill_convex_polygon(&mut b, &reversed, Rgba::WHITE);
        assert_eq!(a.data(), b.data());
        assert!(count(&a, Rgba::WHITE) > 0);
    }

    #[test]
    fn test_polygon_is_clipped_to_frame() {
        let mut frame = Frame::blank(4, 4, 3);
        let big = [
            Point::new(-10.0, -10.0),
            Point::new(20.0, -10.0),
            Point::new(20.0, 20.0),
            Point::new(-10.0, 20.0),
        ];
        fill_convex_polygon(&mut frame, &big, Rgba::RED);
        assert_eq!(count(&frame, Rgba::RED), 16);
    }

    #[test]
    fn test_non_finite_polygon_is_ignored() {
        let mut frame = Frame::blank(4, 4, 3);
        let bad = [Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0), Point::new(2.0, 2.0)];
        fill_convex_polygon(&mut frame, &bad, Rgba::RED);
        assert_eq!(count(&frame, Rgba::RED), 0);
    }

    #[test]
    fn test_circle_area_close_to_pi_r_squared() {
        let mut frame = Frame::blank(100, 100, 3);
        let circle = Ellipse {
            center: Point::new(50.0, 50.0),
            radius_x: 20.0,
            radius_y: 20.0,
            rotation: 0.3,
        };
        fill_ellipse(&mut frame, &circle, Rgba::WHITE);
        let area = count(&frame, Rgba::WHITE) as f64;
        let expected = std::f64::consts::PI * 400.0;
        assert!((area - expected).abs() / expected < 0.03, "area {area}");
    }

    #[test]
    fn test_stroke_leaves_interior_untouched() {
        let mut frame = Frame::blank(60, 60, 3);
        let e = Ellipse {
            center: Point::new(30.0, 30.0),
            radius_x: 20.0,
            radius_y: 10.0,
            rotation: 0.0,
        };
        stroke_ellipse(&mut frame, &e, 2.0, Rgba::RED);
        assert_eq!(frame.pixel(30, 30), &[0, 0, 0]);
        assert_eq!(frame.pixel(49, 29), &[255, 0, 0]);
        assert_eq!(frame.pixel(5, 30), &[0, 0, 0]);
    }

    #[test]
    fn test_rotated_ellipse_spans_rotated_axis() {
        let mut frame = Frame::blank(60, 60, 3);
        let e = Ellipse {
            center: Point::new(30.0, 30.0),
            radius_x: 20.0,
            radius_y: 4.0,
            rotation: std::f64::consts::FRAC_PI_2,
        };
        fill_ellipse(&mut frame, &e, Rgba::WHITE);
        assert_eq!(frame.pixel(29, 46), &[255, 255, 255]);
        assert_eq!(frame.pixel(46, 29), &[0, 0, 0]);
    }
}
