use crate::detection::domain::face_record::FaceRecord;
use crate::detection::domain::landmark::NormalizedLandmark;

/// A point in destination-buffer pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn from_landmark(lm: NormalizedLandmark, width: u32, height: u32) -> Self {
        let (x, y) = lm.to_pixel(width, height);
        Self { x, y }
    }
}

/// Axis-aligned face box in pixels, already padded and clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Whole-pixel region with non-zero area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Smallest whole-pixel rectangle covering the box, or `None` when the
    /// box covers no pixel.
    pub fn pixel_rect(&self) -> Option<PixelRect> {
        let x0 = self.min_x.floor().max(0.0);
        let y0 = self.min_y.floor().max(0.0);
        let x1 = self.max_x.ceil();
        let y1 = self.max_y.ceil();
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Bounding box of the face's landmarks in a `width` x `height` buffer,
/// grown by `padding * box_width` on every side and clamped to the buffer.
///
/// Returns `None` for degenerate input: no points, non-finite coordinates
/// or a box with no area left after clamping.
pub fn padded_face_box(face: &FaceRecord, width: u32, height: u32, padding: f64) -> Option<FaceBox> {
    let points = face.bounding_points();
    if points.is_empty() {
        return None;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for lm in points {
        let p = Point::from_landmark(lm, width, height);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let pad = (max_x - min_x) * padding;
    let b = FaceBox {
        min_x: (min_x - pad).max(0.0),
        min_y: (min_y - pad).max(0.0),
        max_x: (max_x + pad).min(width as f64),
        max_y: (max_y + pad).min(height as f64),
    };
    let valid = [b.min_x, b.min_y, b.max_x, b.max_y].iter().all(|v| v.is_finite())
        && b.width() > 0.0
        && b.height() > 0.0;
    valid.then_some(b)
}

/// Thick segment between the eye corners, extended past both corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeBar {
    pub start: Point,
    pub end: Point,
    pub thickness: f64,
}

impl EyeBar {
    /// Outline of the bar with square caps: the segment grown by half the
    /// thickness in every direction. Corners wind consistently.
    pub fn quad(&self) -> [Point; 4] {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len = (dx * dx + dy * dy).sqrt();
        let half = self.thickness / 2.0;
        // Unit direction scaled to half thickness, and its normal.
        let (ux, uy) = (dx / len * half, dy / len * half);
        let (nx, ny) = (-uy, ux);
        [
            Point::new(self.start.x - ux + nx, self.start.y - uy + ny),
            Point::new(self.end.x + ux + nx, self.end.y + uy + ny),
            Point::new(self.end.x + ux - nx, self.end.y + uy - ny),
            Point::new(self.start.x - ux - nx, self.start.y - uy - ny),
        ]
    }
}

/// Eye bar for `face`, or `None` when both eye corners coincide.
pub fn eye_bar(face: &FaceRecord, width: u32, height: u32, extension: f64, thickness: f64) -> Option<EyeBar> {
    let left = Point::from_landmark(face.left_eye(), width, height);
    let right = Point::from_landmark(face.right_eye(), width, height);
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if !(distance > 0.0 && distance.is_finite()) {
        return None;
    }
    Some(EyeBar {
        start: Point::new(left.x - dx * extension, left.y - dy * extension),
        end: Point::new(right.x + dx * extension, right.y + dy * extension),
        thickness: distance * thickness,
    })
}

/// Ellipse inscribed in the face box, rotated to follow the eye line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Radians, clockwise in buffer coordinates (y down).
    pub rotation: f64,
}

impl Ellipse {
    /// Half extents of the axis-aligned box around the rotated ellipse.
    pub fn half_extents(&self) -> (f64, f64) {
        let (sin, cos) = self.rotation.sin_cos();
        let ex = ((self.radius_x * cos).powi(2) + (self.radius_y * sin).powi(2)).sqrt();
        let ey = ((self.radius_x * sin).powi(2) + (self.radius_y * cos).powi(2)).sqrt();
        (ex, ey)
    }

    /// `p` expressed in the ellipse's own axes, relative to its centre.
    pub fn to_local(&self, p: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        Point::new(dx * cos + dy * sin, -dx * sin + dy * cos)
    }
}

pub fn blackout_ellipse(face: &FaceRecord, width: u32, height: u32, padding: f64) -> Option<Ellipse> {
    let b = padded_face_box(face, width, height, padding)?;
    let left = Point::from_landmark(face.left_eye(), width, height);
    let right = Point::from_landmark(face.right_eye(), width, height);
    Some(Ellipse {
        center: b.center(),
        radius_x: b.width() / 2.0,
        radius_y: b.height() / 2.0,
        rotation: (right.y - left.y).atan2(right.x - left.x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_record::LandmarkLayout;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn outline_face(points: &[(f64, f64)], width: f64, height: f64) -> FaceRecord {
        let mut landmarks = vec![NormalizedLandmark::new(points[0].0 / width, points[0].1 / height); 264];
        for (i, &(x, y)) in points.iter().enumerate() {
            landmarks[i] = NormalizedLandmark::new(x / width, y / height);
        }
        FaceRecord::from_raw(landmarks, &LandmarkLayout::default()).unwrap()
    }

    fn eyes_face(left: (f64, f64), right: (f64, f64), size: f64) -> FaceRecord {
        FaceRecord::from_eye_corners(
            NormalizedLandmark::new(left.0 / size, left.1 / size),
            NormalizedLandmark::new(right.0 / size, right.1 / size),
        )
    }

    #[test]
    fn test_padded_box_grows_by_width_fraction() {
        let face = outline_face(&[(10.0, 10.0), (90.0, 90.0)], 200.0, 200.0);
        let b = padded_face_box(&face, 200, 200, 0.2).unwrap();
        // padding = (90 - 10) * 0.2 = 16
        assert_relative_eq!(b.min_x, 0.0);
        assert_relative_eq!(b.min_y, 0.0);
        assert_relative_eq!(b.max_x, 106.0, epsilon = 1e-9);
        assert_relative_eq!(b.max_y, 106.0, epsilon = 1e-9);
        assert_eq!(
            b.pixel_rect(),
            Some(PixelRect {
                x: 0,
                y: 0,
                width: 106,
                height: 106
            })
        );
    }

    #[test]
    fn test_padded_box_unclamped_in_interior() {
        let face = outline_face(&[(50.0, 60.0), (100.0, 120.0)], 200.0, 200.0);
        let b = padded_face_box(&face, 200, 200, 0.2).unwrap();
        assert_relative_eq!(b.min_x, 40.0, epsilon = 1e-9);
        assert_relative_eq!(b.min_y, 50.0, epsilon = 1e-9);
        assert_relative_eq!(b.max_x, 110.0, epsilon = 1e-9);
        assert_relative_eq!(b.max_y, 130.0, epsilon = 1e-9);
    }

    #[test]
    fn test_padded_box_clamps_to_far_edge() {
        let face = outline_face(&[(150.0, 150.0), (195.0, 199.0)], 200.0, 200.0);
        let b = padded_face_box(&face, 200, 200, 0.2).unwrap();
        assert_relative_eq!(b.max_x, 200.0);
        assert_relative_eq!(b.max_y, 200.0);
    }

    #[test]
    fn test_box_outside_buffer_is_degenerate() {
        let face = outline_face(&[(250.0, 250.0), (260.0, 260.0)], 200.0, 200.0);
        assert!(padded_face_box(&face, 200, 200, 0.2).is_none());
    }

    #[test]
    fn test_single_point_face_is_degenerate() {
        let face = outline_face(&[(50.0, 50.0)], 200.0, 200.0);
        assert!(padded_face_box(&face, 200, 200, 0.2).is_none());
    }

    #[test]
    fn test_eye_bar_extends_both_ends() {
        let face = eyes_face((40.0, 50.0), (60.0, 50.0), 100.0);
        let bar = eye_bar(&face, 100, 100, 0.4, 0.8).unwrap();
        assert_relative_eq!(bar.start.x, 32.0, epsilon = 1e-9);
        assert_relative_eq!(bar.end.x, 68.0, epsilon = 1e-9);
        assert_relative_eq!(bar.thickness, 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_eye_bar_quad_has_square_caps() {
        let bar = EyeBar {
            start: Point::new(10.0, 20.0),
            end: Point::new(30.0, 20.0),
            thickness: 4.0,
        };
        let q = bar.quad();
        let xs: Vec<f64> = q.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = q.iter().map(|p| p.y).collect();
        assert_relative_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 8.0);
        assert_relative_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 32.0);
        assert_relative_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 18.0);
        assert_relative_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 22.0);
    }

    #[test]
    fn test_coincident_eyes_have_no_bar() {
        let face = eyes_face((50.0, 50.0), (50.0, 50.0), 100.0);
        assert!(eye_bar(&face, 100, 100, 0.4, 0.8).is_none());
    }

    #[test]
    fn test_blackout_ellipse_follows_eye_line() {
        let mut points = vec![(60.0, 60.0), (140.0, 140.0)];
        points.resize(264, (100.0, 100.0));
        points[33] = (80.0, 80.0);
        points[263] = (120.0, 120.0);
        let face = outline_face(&points, 200.0, 200.0);
        let e = blackout_ellipse(&face, 200, 200, 0.2).unwrap();
        assert_relative_eq!(e.center.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(e.center.y, 100.0, epsilon = 1e-9);
        // (140 - 60) * 1.4 / 2
        assert_relative_eq!(e.radius_x, 56.0, epsilon = 1e-9);
        assert_relative_eq!(e.rotation, FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_ellipse_local_coordinates_undo_rotation() {
        let e = Ellipse {
            center: Point::new(10.0, 10.0),
            radius_x: 5.0,
            radius_y: 2.0,
            rotation: std::f64::consts::FRAC_PI_2,
        };
        // Rotated a quarter turn, the major axis points down.
        let local = e.to_local(Point::new(10.0, 15.0));
        assert_relative_eq!(local.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-12);
        let (ex, ey) = e.half_extents();
        assert_relative_eq!(ex, 2.0, epsilon = 1e-12);
        assert_relative_eq!(ey, 5.0, epsilon = 1e-12);
    }
}
