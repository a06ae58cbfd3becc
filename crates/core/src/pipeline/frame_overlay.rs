use crate::masking::domain::face_geometry::Point;
use crate::masking::infrastructure::glyphs::{draw_text, text_width, TextPlacement};
use crate::shared::color::Rgba;
use crate::shared::frame::Frame;

/// Drawn on top of the masked frame, in destination coordinates. Overlays
/// are never mirrored.
pub trait FrameOverlay: Send {
    fn draw(&mut self, frame: &mut Frame, timestamp_ms: f64);
}

/// Stream clock in the bottom-right corner: green text with a black
/// outline, sized from the shorter frame side.
pub struct TimestampOverlay {
    /// Glyph height relative to the shorter side.
    pub size: f64,
    /// Distance from the right and bottom edges relative to the shorter side.
    pub margin: f64,
    /// Outline width relative to the shorter side.
    pub outline: f64,
    pub fill: Rgba,
    pub stroke: Rgba,
}

impl Default for TimestampOverlay {
    fn default() -> Self {
        Self {
            size: 0.05,
            margin: 0.015,
            outline: 0.01,
            fill: Rgba::GREEN,
            stroke: Rgba::BLACK,
        }
    }
}

/// `HH:MM:SS.mmm`; negative or non-finite input reads as zero.
pub fn format_clock(timestamp_ms: f64) -> String {
    let total = if timestamp_ms.is_finite() && timestamp_ms > 0.0 {
        timestamp_ms.round() as u64
    } else {
        0
    };
    let ms = total % 1000;
    let secs = total / 1000;
    format!(
        "{:02}:{:02}:{:02}.{ms:03}",
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    )
}

impl FrameOverlay for TimestampOverlay {
    fn draw(&mut self, frame: &mut Frame, timestamp_ms: f64) {
        let short = frame.width().min(frame.height()) as f64;
        let height = short * self.size;
        if height < 1.0 {
            return;
        }
        let text = format_clock(timestamp_ms);
        let width = text_width(&text, height);
        let margin = short * self.margin;
        let center = Point::new(
            frame.width() as f64 - margin - width / 2.0,
            frame.height() as f64 - margin - height / 2.0,
        );

        let reach = (short * self.outline / 2.0).round().max(1.0);
        for dy in [-reach, 0.0, reach] {
            for dx in [-reach, 0.0, reach] {
                if dx == 0.0 && dy == 0.0 {
                    continue;
                }
                let placement = TextPlacement {
                    center: Point::new(center.x + dx, center.y + dy),
                    height,
                    rotation: 0.0,
                };
                draw_text(frame, &text, &placement, self.stroke);
            }
        }
        let placement = TextPlacement {
            center,
            height,
            rotation: 0.0,
        };
        draw_text(frame, &text, &placement, self.fill);
    }
}
