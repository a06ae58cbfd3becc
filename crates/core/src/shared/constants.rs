/// Landmarks a full face mesh must carry before it is trusted for masking
/// (the highest eye-corner index used is 263).
pub const MIN_FACE_LANDMARKS: usize = 264;

/// Face-mesh index of the outer corner of the subject's left eye.
pub const LEFT_EYE_OUTER_CORNER: usize = 33;

/// Face-mesh index of the outer corner of the subject's right eye.
pub const RIGHT_EYE_OUTER_CORNER: usize = 263;

/// Default time a changed face count must wait before it replaces the
/// trusted set.
pub const DEFAULT_HOLD_WINDOW_MS: f64 = 500.0;

/// Accepted hold-window range.
pub const HOLD_WINDOW_RANGE_MS: (f64, f64) = (500.0, 800.0);

/// Frame budget at 30 fps.
pub const DEFAULT_FRAME_BUDGET_MS: f64 = 1000.0 / 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
