use anyhow::{anyhow, Result};
use opencv::{
    core::{Mat, Size},
    imgproc,
    prelude::*,
};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};

use crate::landmarks::{mesh, FaceLandmarks, LandmarkExtractor, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `[1, 3, h, w]`
    Nchw,
    /// `[1, h, w, 3]`
    Nhwc,
}

/// Face-mesh landmark model run through ONNX Runtime.
pub struct FaceMeshDetector {
    session: Session,
    layout: Layout,
    input_width: i32,
    input_height: i32,
    presence_threshold: f32,
}

impl FaceMeshDetector {
    pub fn new(model_path: &str, presence_threshold: f32) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        let (layout, input_width, input_height) = Self::get_input_dimensions(&session)?;

        Ok(Self {
            session,
            layout,
            input_width,
            input_height,
            presence_threshold,
        })
    }

    fn get_input_dimensions(session: &Session) -> Result<(Layout, i32, i32)> {
        let input = session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("No model inputs found"))?;

        let dims = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => dimensions.clone(),
            other => anyhow::bail!("Unexpected model input type: {other:?}"),
        };

        // Dynamic dimensions come back as -1.
        let dim = |i: usize| dims.get(i).copied().filter(|d| *d > 0);
        match (dim(1), dim(2), dim(3)) {
            (Some(3), Some(h), Some(w)) => Ok((Layout::Nchw, w as i32, h as i32)),
            (Some(h), Some(w), Some(3)) => Ok((Layout::Nhwc, w as i32, h as i32)),
            _ => Ok((Layout::Nhwc, 192, 192)),
        }
    }

    fn preprocess(&self, frame: &Mat) -> Result<Vec<f32>> {
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

        let mut resized = Mat::default();
        imgproc::resize(
            &rgb,
            &mut resized,
            Size::new(self.input_width, self.input_height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let pixels = resized.data_bytes()?;
        let h = self.input_height as usize;
        let w = self.input_width as usize;
        let mut data = vec![0.0f32; 3 * h * w];

        for (idx, rgb) in pixels.chunks_exact(3).enumerate() {
            for (c, value) in rgb.iter().enumerate() {
                let v = f32::from(*value) / 255.0;
                match self.layout {
                    Layout::Nchw => data[c * h * w + idx] = v,
                    Layout::Nhwc => data[idx * 3 + c] = v,
                }
            }
        }

        Ok(data)
    }

    fn input_shape(&self) -> [usize; 4] {
        let h = self.input_height as usize;
        let w = self.input_width as usize;
        match self.layout {
            Layout::Nchw => [1, 3, h, w],
            Layout::Nhwc => [1, h, w, 3],
        }
    }

    fn postprocess(&self, landmarks: &[f32], presence: Option<f32>) -> Option<FaceLandmarks> {
        if let Some(logit) = presence {
            let score = 1.0 / (1.0 + (-logit).exp());
            if score < self.presence_threshold {
                return None;
            }
        }

        let w = self.input_width as f32;
        let h = self.input_height as f32;
        let points: Vec<Point> = landmarks
            .chunks_exact(3)
            .take(mesh::POINT_COUNT)
            .map(|xyz| Point::new(xyz[0] / w, xyz[1] / h))
            .collect();

        FaceLandmarks::from_mesh(&points)
    }
}

impl LandmarkExtractor for FaceMeshDetector {
    type Frame = Mat;

    fn extract(&mut self, frame: &Mat) -> Result<Option<FaceLandmarks>> {
        let data = self.preprocess(frame)?;
        let tensor = Tensor::from_array((self.input_shape(), data))?;

        let outputs = self.session.run(ort::inputs![tensor]?)?;
        if outputs.len() == 0 {
            anyhow::bail!("No output found");
        }

        let (_, landmarks) = outputs[0].try_extract_raw_tensor::<f32>()?;
        let presence = if outputs.len() > 1 {
            let (_, score) = outputs[1].try_extract_raw_tensor::<f32>()?;
            score.first().copied()
        } else {
            None
        };

        Ok(self.postprocess(landmarks, presence))
    }
}
