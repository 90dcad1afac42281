use serde::{Deserialize, Serialize};

use crate::landmarks::FaceLandmarks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Center,
    LeftTilt,
    RightTilt,
}

/// One frame's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    pub direction: Direction,
    pub head_bowed: bool,
    /// Carried over from the previous frame when no face is present.
    pub mouth_open: bool,
    pub face_present: bool,
}

/// Pixel thresholds depend on camera resolution; the defaults were tuned for
/// a 640x480 webcam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub tilt_degrees: f64,
    pub bow_pixels: i32,
    pub mouth_pixels: i32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            tilt_degrees: 10.0,
            bow_pixels: 50,
            mouth_pixels: 15,
        }
    }
}

/// Roll of the eye line in degrees. Positive when the right eye sits lower
/// in the image than the left one.
pub fn tilt_angle(left_eye: (i32, i32), right_eye: (i32, i32)) -> f64 {
    let dx = f64::from(right_eye.0 - left_eye.0);
    let dy = f64::from(right_eye.1 - left_eye.1);
    dy.atan2(dx).to_degrees()
}

pub fn direction_for_angle(angle: f64, threshold: f64) -> Direction {
    if angle > threshold {
        Direction::LeftTilt
    } else if angle < -threshold {
        Direction::RightTilt
    } else {
        Direction::Center
    }
}

/// Classify a frame. `previous_mouth_open` is threaded through by the caller
/// so a frame without a face keeps the last known mouth state.
pub fn classify(
    face: Option<&FaceLandmarks>,
    frame_size: (i32, i32),
    previous_mouth_open: bool,
    thresholds: &GestureThresholds,
) -> GestureState {
    let Some(face) = face else {
        return GestureState {
            mouth_open: previous_mouth_open,
            ..GestureState::default()
        };
    };

    let (width, height) = frame_size;
    let left_eye = face.left_eye.to_pixels(width, height);
    let right_eye = face.right_eye.to_pixels(width, height);
    let (_, nose_y) = face.nose_tip.to_pixels(width, height);
    let (_, upper_lip_y) = face.upper_lip.to_pixels(width, height);
    let (_, lower_lip_y) = face.lower_lip.to_pixels(width, height);

    let eye_level = (left_eye.1 + right_eye.1).div_euclid(2);
    let mouth_distance = (upper_lip_y - lower_lip_y).abs();

    GestureState {
        direction: direction_for_angle(tilt_angle(left_eye, right_eye), thresholds.tilt_degrees),
        head_bowed: nose_y > eye_level + thresholds.bow_pixels,
        mouth_open: mouth_distance > thresholds.mouth_pixels,
        face_present: true,
    }
}
