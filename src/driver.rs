use anyhow::Result;
use opencv::{core::Mat, prelude::*};
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::camera::Camera;
use crate::gesture::{classify, GestureThresholds};
use crate::landmarks::LandmarkExtractor;
use crate::overlay::Overlay;

/// The capture loop. Runs on the calling thread until the user quits or the
/// camera stops delivering frames.
pub struct Driver<E> {
    camera: Camera,
    extractor: E,
    overlay: Overlay,
    assistant: Assistant,
    thresholds: GestureThresholds,
}

impl<E> Driver<E>
where
    E: LandmarkExtractor<Frame = Mat>,
{
    pub fn new(
        camera: Camera,
        extractor: E,
        overlay: Overlay,
        assistant: Assistant,
        thresholds: GestureThresholds,
    ) -> Self {
        Self {
            camera,
            extractor,
            overlay,
            assistant,
            thresholds,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        info!("entering capture loop");
        let mut frames: u64 = 0;

        while let Some(mut frame) = self.camera.read_frame()? {
            frames += 1;

            let face = match self.extractor.extract(&frame) {
                Ok(face) => face,
                Err(e) => {
                    warn!("landmark extraction failed: {e}");
                    None
                }
            };

            let gesture = classify(
                face.as_ref(),
                (frame.cols(), frame.rows()),
                self.assistant.mouth_open(),
                &self.thresholds,
            );
            self.assistant.observe(&gesture);

            self.overlay.draw(&mut frame, &self.assistant.snapshot())?;
            self.overlay.show(&frame)?;

            if self.overlay.quit_requested()? {
                info!("exit requested by user");
                break;
            }
        }

        info!(frames, "capture loop finished");
        Ok(())
    }
}
