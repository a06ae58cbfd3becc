pub mod face_geometry;
pub mod mask_style;
pub mod privacy_mode;
