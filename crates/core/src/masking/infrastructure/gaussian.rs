use ndarray::{ArrayViewMut1, ArrayViewMut3, Axis};

/// Box passes per axis. Three successive box blurs are within a few
/// percent of a true Gaussian, at a cost independent of the radius.
const PASSES: usize = 3;

/// Odd box widths whose combined variance approximates `sigma`².
///
/// The first `narrow` passes use the smaller width and the rest the larger one,
/// with `narrow` picked to land the total variance as close to `sigma`² as two
/// neighbouring odd widths allow.
pub fn box_sizes(sigma: f64) -> [usize; PASSES] {
    let n = PASSES as f64;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor().max(1.0) as usize;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let upper = lower + 2;
    let l = lower as f64;
    let narrow = ((12.0 * sigma * sigma - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0))
        .round()
        .clamp(0.0, n) as usize;
    std::array::from_fn(|i| if i < narrow { lower } else { upper })
}

/// Gaussian-like blur for face regions.
///
/// The region is lifted into a reused `f32` plane and smoothed with
/// running-sum box passes along rows and then columns, edges clamped to the
/// region. Box widths are recomputed only when the radius changes.
pub struct GaussianBlur {
    radius: u32,
    boxes: [usize; PASSES],
    plane: Vec<f32>,
    line: Vec<f32>,
}

impl GaussianBlur {
    pub fn new() -> Self {
        Self {
            radius: 0,
            boxes: [1; PASSES],
            plane: Vec::new(),
            line: Vec::new(),
        }
    }

    fn prepare(&mut self, radius: u32) {
        if radius != self.radius {
            self.boxes = box_sizes(radius as f64);
            self.radius = radius;
        }
    }

    /// Blurs a tightly packed `width` x `height` region in place with a
    /// standard deviation of about `radius` pixels.
    pub fn blur(&mut self, region: &mut [u8], width: usize, height: usize, channels: usize, radius: u32) {
        if radius == 0 || width == 0 || height == 0 || channels == 0 {
            return;
        }
        self.prepare(radius);

        let len = width * height * channels;
        self.plane.clear();
        self.plane.extend(region[..len].iter().map(|&v| v as f32));
        let Ok(mut plane) = ArrayViewMut3::from_shape((height, width, channels), &mut self.plane[..]) else {
            return;
        };

        for &size in &self.boxes {
            for lane in plane.lanes_mut(Axis(1)) {
                box_pass(lane, size, &mut self.line);
            }
            for lane in plane.lanes_mut(Axis(0)) {
                box_pass(lane, size, &mut self.line);
            }
        }

        for (dst, &v) in region[..len].iter_mut().zip(&self.plane) {
            *dst = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean over a `size`-wide window centred on each sample; samples past
/// either end repeat the end value.
fn box_pass(mut lane: ArrayViewMut1<'_, f32>, size: usize, line: &mut Vec<f32>) {
    let n = lane.len();
    if size <= 1 || n == 0 {
        return;
    }
    line.clear();
    line.extend(lane.iter().copied());

    let reach = (size / 2) as isize;
    let last = n as isize - 1;
    let at = |i: isize| line[i.clamp(0, last) as usize];
    let mut sum: f32 = (-reach..=reach).map(at).sum();
    let scale = 1.0 / size as f32;
    for (i, out) in lane.iter_mut().enumerate() {
        *out = sum * scale;
        let i = i as isize;
        sum += at(i + reach + 1) - at(i - reach);
    }
}
