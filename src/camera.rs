use anyhow::Result;
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{info, warn};

/// Webcam handle. The device is released when this is dropped.
pub struct Camera {
    capture: VideoCapture,
}

impl Camera {
    pub fn new(device_id: i32) -> Result<Self> {
        let capture = VideoCapture::new(device_id, videoio::CAP_ANY)?;

        if !capture.is_opened()? {
            anyhow::bail!("Failed to open camera {device_id}");
        }

        info!(device_id, "camera opened");
        Ok(Self { capture })
    }

    /// Next frame, mirrored so the preview behaves like a mirror. `None`
    /// once the device stops delivering frames.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        let mut mirrored = Mat::default();
        core::flip(&frame, &mut mirrored, 1)?;
        Ok(Some(mirrored))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("failed to release camera: {e}");
        }
    }
}
