//! Facial landmarks as consumed by the gesture classifier.
//!
//! Coordinates are normalized to `[0, 1]` relative to the frame, with `y`
//! growing downwards, the way face-mesh models report them.

/// Face-mesh (468 point) indices of the landmarks the classifier needs.
pub mod mesh {
    pub const LEFT_EYE: usize = 33;
    pub const RIGHT_EYE: usize = 263;
    pub const NOSE_TIP: usize = 1;
    pub const CHIN: usize = 152;
    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;

    pub const POINT_COUNT: usize = 468;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position, truncated towards zero.
    pub fn to_pixels(self, width: i32, height: i32) -> (i32, i32) {
        (
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }
}

/// The six landmarks of one detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    pub left_eye: Point,
    pub right_eye: Point,
    pub nose_tip: Point,
    pub chin: Point,
    pub upper_lip: Point,
    pub lower_lip: Point,
}

impl FaceLandmarks {
    /// Pick the named landmarks out of a full face mesh. Returns `None` when
    /// the mesh is too short to contain them.
    pub fn from_mesh(points: &[Point]) -> Option<Self> {
        Some(Self {
            left_eye: *points.get(mesh::LEFT_EYE)?,
            right_eye: *points.get(mesh::RIGHT_EYE)?,
            nose_tip: *points.get(mesh::NOSE_TIP)?,
            chin: *points.get(mesh::CHIN)?,
            upper_lip: *points.get(mesh::UPPER_LIP)?,
            lower_lip: *points.get(mesh::LOWER_LIP)?,
        })
    }
}

/// Anything that can find a face in a frame.
pub trait LandmarkExtractor {
    type Frame;

    /// `Ok(None)` means no face in the frame, which is not an error.
    fn extract(&mut self, frame: &Self::Frame) -> anyhow::Result<Option<FaceLandmarks>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mesh_picks_named_indices() {
        let points: Vec<Point> = (0..mesh::POINT_COUNT)
            .map(|i| Point::new(i as f32 / 1000.0, 0.5))
            .collect();

        let face = FaceLandmarks::from_mesh(&points).unwrap();
        assert_eq!(face.left_eye.x, 0.033);
        assert_eq!(face.right_eye.x, 0.263);
        assert_eq!(face.nose_tip.x, 0.001);
        assert_eq!(face.upper_lip.x, 0.013);
    }

    #[test]
    fn from_mesh_rejects_short_mesh() {
        let points = vec![Point::default(); 100];
        assert!(FaceLandmarks::from_mesh(&points).is_none());
    }

    #[test]
    fn to_pixels_truncates() {
        assert_eq!(Point::new(0.5, 0.2599).to_pixels(640, 480), (320, 124));
    }
}
