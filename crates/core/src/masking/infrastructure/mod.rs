pub mod blackout;
pub mod eye_mask;
pub mod face_blur;
pub mod gaussian;
pub mod glyphs;
pub mod mask_renderer;
pub mod mosaic;
pub mod raster;
pub mod scratch_buffer;
