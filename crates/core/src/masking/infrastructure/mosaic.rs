use crate::masking::domain::face_geometry::PixelRect;
use crate::masking::domain::mask_style::MaskStyle;
use crate::shared::frame::Frame;

use super::scratch_buffer::ScratchBuffer;

/// Pixelates `rect`: the region is reduced to one sample per block with
/// nearest-neighbour sampling and scaled back up the same way.
///
/// With block size `B`, a region `W` pixels wide ends up with `max(1, W / B)`
/// blocks across (integer division), likewise vertically.
pub fn pixelate_region(frame: &mut Frame, rect: PixelRect, style: &MaskStyle, scratch: &mut ScratchBuffer) {
    let block = style.mosaic_block_px(rect.width);
    let cells_x = (rect.width / block).max(1) as usize;
    let cells_y = (rect.height / block).max(1) as usize;
    let (w, h) = (rect.width as usize, rect.height as usize);
    let channels = frame.channels() as usize;

    scratch.extract(frame, rect);
    let region = scratch.region(rect, frame.channels());

    // Sample at each cell's centre.
    let sample_x: Vec<usize> = (0..cells_x).map(|i| ((2 * i + 1) * w) / (2 * cells_x)).collect();
    let sample_y: Vec<usize> = (0..cells_y).map(|j| ((2 * j + 1) * h) / (2 * cells_y)).collect();

    for y in 0..h {
        let sy = sample_y[y * cells_y / h];
        let dst_row = frame.offset(rect.x, rect.y + y as u32);
        for x in 0..w {
            let sx = sample_x[x * cells_x / w];
            let src = (sy * w + sx) * channels;
            let dst = dst_row + x * channels;
            frame.data_mut()[dst..dst + channels].copy_from_slice(&region[src..src + channels]);
        }
    }
}
