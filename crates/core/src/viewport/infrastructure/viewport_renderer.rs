use ndarray::ArrayView3;

use crate::shared::color::Rgba;
use crate::shared::frame::Frame;
use crate::viewport::domain::viewport_mapping::ViewportMapping;

/// Interpolation used when the sampled region is stretched over the
/// destination rectangle. Both variants are pixel-centre aligned, so an
/// unscaled mapping reproduces the source exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resampling {
    Nearest,
    #[default]
    Bilinear,
}

/// What fills the margins a zoomed-out or panned view leaves uncovered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundFill {
    Solid(Rgba),
    /// Zero bytes: transparent for RGBA buffers, black for RGB.
    #[default]
    Clear,
}

impl BackgroundFill {
    fn color(&self) -> Rgba {
        match self {
            BackgroundFill::Solid(c) => *c,
            BackgroundFill::Clear => Rgba::TRANSPARENT,
        }
    }
}

/// Writes a source frame into the destination buffer through a
/// [`ViewportMapping`].
pub struct ViewportRenderer {
    resampling: Resampling,
    background: BackgroundFill,
}

impl ViewportRenderer {
    pub fn new(resampling: Resampling, background: BackgroundFill) -> Self {
        Self {
            resampling,
            background,
        }
    }

    pub fn render(&self, source: &Frame, mapping: &ViewportMapping, dest: &mut Frame) {
        let rect = mapping.dest;
        if rect.is_empty() || source.width() == 0 || source.height() == 0 {
            return;
        }

        let src = source.as_ndarray();
        let src_w = source.width() as f64;
        let src_h = source.height() as f64;
        let dest_w = dest.width();
        let dest_h = dest.height();
        let background = self.background.color();
        let fill_margins = mapping.needs_background();

        let mut pixel = [0u8; 4];
        for row in 0..rect.height {
            let py = rect.y + row;
            if py >= dest_h {
                break;
            }
            for col in 0..rect.width {
                let px = rect.x + col;
                if px >= dest_w {
                    break;
                }
                let (sx, sy) = mapping.source_point(col, row);
                let outside = sx < -0.5 || sy < -0.5 || sx > src_w - 0.5 || sy > src_h - 0.5;

                let color = if fill_margins && outside {
                    background
                } else {
                    match self.resampling {
                        Resampling::Nearest => sample_nearest(&src, sx, sy, &mut pixel),
                        Resampling::Bilinear => sample_bilinear(&src, sx, sy, &mut pixel),
                    }
                    Rgba(pixel)
                };
                dest.put_pixel(px as i64, py as i64, color);
            }
        }
    }
}

impl Default for ViewportRenderer {
    fn default() -> Self {
        Self::new(Resampling::default(), BackgroundFill::default())
    }
}

/// Fills `out` as RGBA; a missing source alpha channel reads as opaque.
fn sample_nearest(src: &ArrayView3<'_, u8>, sx: f64, sy: f64, out: &mut [u8; 4]) {
    let (h, w, channels) = src.dim();
    let x = (sx.round().max(0.0) as usize).min(w - 1);
    let y = (sy.round().max(0.0) as usize).min(h - 1);
    for (c, value) in out.iter_mut().enumerate() {
        *value = if c < channels { src[[y, x, c]] } else { 255 };
    }
}

fn sample_bilinear(src: &ArrayView3<'_, u8>, sx: f64, sy: f64, out: &mut [u8; 4]) {
    let (h, w, channels) = src.dim();
    let fx0 = sx.floor().clamp(0.0, (w - 1) as f64);
    let fy0 = sy.floor().clamp(0.0, (h - 1) as f64);
    let x0 = fx0 as usize;
    let y0 = fy0 as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = (sx - fx0).clamp(0.0, 1.0);
    let fy = (sy - fy0).clamp(0.0, 1.0);

    for (c, value) in out.iter_mut().enumerate() {
        if c >= channels {
            *value = 255;
            continue;
        }
        let v00 = src[[y0, x0, c]] as f64;
        let v10 = src[[y0, x1, c]] as f64;
        let v01 = src[[y1, x0, c]] as f64;
        let v11 = src[[y1, x1, c]] as f64;
        let v = v00 * (1.0 - fx) * (1.0 - fy)
            + v10 * fx * (1.0 - fy)
            + v01 * (1.0 - fx) * fy
            + v11 * fx * fy;
        *value = v.round().clamp(0.0, 255.0) as u8;
    }
}
