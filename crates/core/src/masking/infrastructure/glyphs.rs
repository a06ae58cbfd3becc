use crate::masking::domain::face_geometry::Point;
use crate::shared::color::Rgba;
use crate::shared::frame::Frame;

/// Glyph cell in font units.
pub const GLYPH_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;
/// Horizontal advance per character (glyph plus one unit of spacing).
const ADVANCE: usize = GLYPH_WIDTH + 1;

/// 3x5 bitmap rows, most significant of the low three bits is the left
/// column. Characters without a glyph render as blank cells.
fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c.to_ascii_uppercase() {
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x3, 0x4, 0x4, 0x4, 0x3],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x3, 0x4, 0x5, 0x5, 0x3],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x2],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x2, 0x5, 0x5, 0x5, 0x2],
        'P' => [0x6, 0x5, 0x6, 0x4, 0x4],
        'Q' => [0x2, 0x5, 0x5, 0x6, 0x3],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '/' => [0x1, 0x1, 0x2, 0x4, 0x4],
        _ => [0x0; GLYPH_HEIGHT],
    }
}

fn glyph_bit(c: char, col: usize, row: usize) -> bool {
    (glyph(c)[row] >> (GLYPH_WIDTH - 1 - col)) & 1 == 1
}

/// Text block size in font units.
fn block_units(text: &str) -> (usize, usize) {
    let n = text.chars().count();
    if n == 0 {
        return (0, 0);
    }
    (n * ADVANCE - 1, GLYPH_HEIGHT)
}

/// Width in pixels of `text` drawn with the given glyph height.
pub fn text_width(text: &str, glyph_height: f64) -> f64 {
    let (w, _) = block_units(text);
    w as f64 * glyph_height / GLYPH_HEIGHT as f64
}

/// Placement of a text block: centred on `center`, rotated by `rotation`
/// radians, glyphs `height` pixels tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPlacement {
    pub center: Point,
    pub height: f64,
    pub rotation: f64,
}

/// Draws `text` by mapping each covered destination pixel back into glyph
/// space, so any rotation and scale renders without gaps.
pub fn draw_text(frame: &mut Frame, text: &str, placement: &TextPlacement, color: Rgba) {
    let (units_w, units_h) = block_units(text);
    if units_w == 0 || !(placement.height > 0.0) {
        return;
    }
    let chars: Vec<char> = text.chars().collect();
    let unit = placement.height / GLYPH_HEIGHT as f64;
    let half_w = units_w as f64 * unit / 2.0;
    let half_h = units_h as f64 * unit / 2.0;

    let (sin, cos) = placement.rotation.sin_cos();
    let reach_x = half_w * cos.abs() + half_h * sin.abs();
    let reach_y = half_w * sin.abs() + half_h * cos.abs();
    let cx = placement.center.x;
    let cy = placement.center.y;

    let x0 = (cx - reach_x).floor().max(0.0) as i64;
    let y0 = (cy - reach_y).floor().max(0.0) as i64;
    let x1 = ((cx + reach_x).ceil() as i64).min(frame.width() as i64);
    let y1 = ((cy + reach_y).ceil() as i64).min(frame.height() as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            // Undo the rotation to land in the text block's own frame.
            let u = (dx * cos + dy * sin + half_w) / unit;
            let v = (-dx * sin + dy * cos + half_h) / unit;
            if u < 0.0 || v < 0.0 {
                continue;
            }
            let (gu, gv) = (u as usize, v as usize);
            if gu >= units_w || gv >= units_h {
                continue;
            }
            let (index, col) = (gu / ADVANCE, gu % ADVANCE);
            if col < GLYPH_WIDTH && glyph_bit(chars[index], col, gv) {
                frame.put_pixel(px, py, color);
            }
        }
    }
}
