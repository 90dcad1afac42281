use anyhow::Result;
use opencv::{
    core::{Mat, Point, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use tracing::warn;

use crate::session::SessionView;

pub const WINDOW_TITLE: &str = "Head Tilt Word Selection";

const ESC: i32 = 27;

/// Preview window with the sentence and the current words drawn on top.
pub struct Overlay {
    recipient: String,
}

impl Overlay {
    pub fn new(recipient: impl Into<String>) -> Result<Self> {
        highgui::named_window(WINDOW_TITLE, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            recipient: recipient.into(),
        })
    }

    pub fn draw(&self, frame: &mut Mat, view: &SessionView) -> Result<()> {
        let width = frame.cols();
        let height = frame.rows();
        let white = Scalar::new(255.0, 255.0, 255.0, 0.0);
        let green = Scalar::new(0.0, 255.0, 0.0, 0.0);

        put_text(frame, &format!("Sentence: {}", view.context), Point::new(50, 30), 0.7, white)?;

        let [left, middle, right] = view.triple.as_array();
        put_text(frame, left, Point::new(100, height - 100), 1.0, green)?;
        put_text(frame, middle, Point::new(width / 2 - 50, height - 100), 1.0, green)?;
        put_text(frame, right, Point::new(width - 200, height - 100), 1.0, green)?;

        put_text(frame, &self.recipient, Point::new(100, height - 50), 1.0, white)?;
        Ok(())
    }

    pub fn show(&self, frame: &Mat) -> Result<()> {
        highgui::imshow(WINDOW_TITLE, frame)?;
        Ok(())
    }

    /// Poll the keyboard for a millisecond. True when `q` or Esc was pressed.
    pub fn quit_requested(&self) -> Result<bool> {
        let key = highgui::wait_key(1)?;
        Ok(key == ESC || (key & 0xFF) == i32::from(b'q'))
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("failed to close windows: {e}");
        }
    }
}

fn put_text(frame: &mut Mat, text: &str, origin: Point, scale: f64, color: Scalar) -> Result<()> {
    imgproc::put_text(
        frame,
        text,
        origin,
        FONT_HERSHEY_SIMPLEX,
        scale,
        color,
        2,
        LINE_8,
        false,
    )?;
    Ok(())
}
