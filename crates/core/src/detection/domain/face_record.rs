use thiserror::Error;

use crate::shared::constants::{LEFT_EYE_OUTER_CORNER, MIN_FACE_LANDMARKS, RIGHT_EYE_OUTER_CORNER};

use super::landmark::NormalizedLandmark;

/// How a detector orders the landmarks of one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkLayout {
    /// Dense face mesh. Faces with fewer than `min_landmarks` points are
    /// rejected; the eye corners are read at the given indices.
    FullMesh {
        min_landmarks: usize,
        left_eye: usize,
        right_eye: usize,
    },
    /// Detector reports only `[left_eye_corner, right_eye_corner]`.
    EyeCorners,
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        LandmarkLayout::FullMesh {
            min_landmarks: MIN_FACE_LANDMARKS,
            left_eye: LEFT_EYE_OUTER_CORNER,
            right_eye: RIGHT_EYE_OUTER_CORNER,
        }
    }
}

impl LandmarkLayout {
    pub fn min_landmarks(&self) -> usize {
        match self {
            LandmarkLayout::FullMesh {
                min_landmarks,
                left_eye,
                right_eye,
            } => (*min_landmarks).max(left_eye.max(right_eye) + 1),
            LandmarkLayout::EyeCorners => 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("face has {found} landmarks, at least {required} required")]
pub struct LandmarkError {
    pub found: usize,
    pub required: usize,
}

/// One detected face, normalised from raw detector output.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRecord {
    left_eye: NormalizedLandmark,
    right_eye: NormalizedLandmark,
    /// Full outline; empty for eye-corner-only detectors.
    landmarks: Vec<NormalizedLandmark>,
}

impl FaceRecord {
    pub fn from_raw(
        landmarks: Vec<NormalizedLandmark>,
        layout: &LandmarkLayout,
    ) -> Result<Self, LandmarkError> {
        let required = layout.min_landmarks();
        if landmarks.len() < required {
            return Err(LandmarkError {
                found: landmarks.len(),
                required,
            });
        }
        match *layout {
            LandmarkLayout::FullMesh {
                left_eye,
                right_eye,
                ..
            } => Ok(Self {
                left_eye: landmarks[left_eye],
                right_eye: landmarks[right_eye],
                landmarks,
            }),
            LandmarkLayout::EyeCorners => Ok(Self::from_eye_corners(landmarks[0], landmarks[1])),
        }
    }

    pub fn from_eye_corners(left_eye: NormalizedLandmark, right_eye: NormalizedLandmark) -> Self {
        Self {
            left_eye,
            right_eye,
            landmarks: Vec::new(),
        }
    }

    pub fn left_eye(&self) -> NormalizedLandmark {
        self.left_eye
    }

    pub fn right_eye(&self) -> NormalizedLandmark {
        self.right_eye
    }

    pub fn landmarks(&self) -> &[NormalizedLandmark] {
        &self.landmarks
    }

    pub fn has_outline(&self) -> bool {
        !self.landmarks.is_empty()
    }

    /// Points that bound the face: the full outline when known, otherwise
    /// just the eye corners.
    pub fn bounding_points(&self) -> Vec<NormalizedLandmark> {
        if self.has_outline() {
            self.landmarks.clone()
        } else {
            vec![self.left_eye, self.right_eye]
        }
    }
}
