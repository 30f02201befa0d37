use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::decode::decode_landmarks;
use super::landmark::PoseLandmarks;
use crate::config::ModelConfig;

/// 33点ランドマークモデルを使用した姿勢検出器
pub struct LandmarkDetector {
    session: Session,
    input_name: String,
    output_name: String,
    presence_name: String,
    input_size: u32,
    presence_threshold: f32,
}

impl LandmarkDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, config: &ModelConfig) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .with_context(|| format!("Failed to load ONNX model {}", model_path.as_ref().display()))?;

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            presence_name: config.presence_name.clone(),
            input_size: config.input_size,
            presence_threshold: config.presence_threshold,
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::new(&config.path, config)
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// 前処理済みテンソルから姿勢を検出
    ///
    /// 入力: [1, S, S, 3] の f32 テンソル (0.0-1.0)
    /// 出力: 人物が見つからなければNone。座標は正方形入力内の正規化座標。
    pub fn detect(&mut self, input: Array4<f32>) -> Result<Option<PoseLandmarks>> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .context("Inference failed")?;

        let landmarks: ndarray::ArrayViewD<f32> = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("Missing model output {}", self.output_name))?
            .try_extract_array()
            .context("Failed to extract landmark tensor")?;
        let raw: Vec<f32> = landmarks.iter().copied().collect();

        let presence = match outputs.get(self.presence_name.as_str()) {
            Some(value) => {
                let flag: ndarray::ArrayViewD<f32> = value
                    .try_extract_array()
                    .context("Failed to extract presence tensor")?;
                flag.iter().next().copied()
            }
            None => None,
        };

        Ok(decode_landmarks(
            &raw,
            self.input_size as f32,
            presence,
            self.presence_threshold,
        ))
    }
}
