use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a detected face is obscured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyMode {
    /// Opaque bar across both eyes.
    #[default]
    EyeMask,
    FaceBlur,
    /// Filled ellipse with an outline and a label.
    Blackout,
    Mosaic,
}

impl PrivacyMode {
    pub const ALL: [PrivacyMode; 4] = [
        PrivacyMode::EyeMask,
        PrivacyMode::FaceBlur,
        PrivacyMode::Blackout,
        PrivacyMode::Mosaic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyMode::EyeMask => "eyeMask",
            PrivacyMode::FaceBlur => "faceBlur",
            PrivacyMode::Blackout => "blackout",
            PrivacyMode::Mosaic => "mosaic",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            PrivacyMode::EyeMask => 0,
            PrivacyMode::FaceBlur => 1,
            PrivacyMode::Blackout => 2,
            PrivacyMode::Mosaic => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => PrivacyMode::FaceBlur,
            2 => PrivacyMode::Blackout,
            3 => PrivacyMode::Mosaic,
            _ => PrivacyMode::EyeMask,
        }
    }
}

impl fmt::Display for PrivacyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown privacy mode '{0}' (expected eyeMask, faceBlur, blackout or mosaic)")]
pub struct UnknownPrivacyMode(pub String);

impl FromStr for PrivacyMode {
    type Err = UnknownPrivacyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivacyMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownPrivacyMode(s.to_string()))
    }
}

/// Shared, externally settable privacy mode.
///
/// Clones share the same value. The frame loop reads it once per frame, so a
/// change from another thread applies from the next frame on.
#[derive(Clone, Debug, Default)]
pub struct PrivacyModeHandle {
    mode: Arc<AtomicU8>,
}

impl PrivacyModeHandle {
    pub fn new(mode: PrivacyMode) -> Self {
        Self {
            mode: Arc::new(AtomicU8::new(mode.to_u8())),
        }
    }

    pub fn get(&self) -> PrivacyMode {
        PrivacyMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    pub fn set(&self, mode: PrivacyMode) {
        self.mode.store(mode.to_u8(), Ordering::Relaxed);
    }
}
