//! Live biomechanical feedback computed per frame while the camera runs.

pub mod steps;
pub mod trunk;

pub use steps::{AnkleMinimumDetector, StepCounter};
pub use trunk::{shoulder_asymmetry, trunk_tilt_deg};

use crate::config::MetricsConfig;
use crate::pose::PoseLandmarks;

/// 1フレーム分のライブ指標
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveMetrics {
    /// 体幹の傾き（度）
    pub trunk_tilt_deg: Option<f32>,
    /// 肩の高さの左右差（正規化座標）
    pub shoulder_asymmetry: Option<f32>,
    /// リセット以降の累計歩数
    pub step_count: u32,
}

pub struct MetricsTracker {
    visibility_threshold: f32,
    steps: StepCounter,
    last: LiveMetrics,
}

impl MetricsTracker {
    pub fn new(visibility_threshold: f32, step_min_drop: f32) -> Self {
        Self {
            visibility_threshold,
            steps: StepCounter::new(visibility_threshold, step_min_drop),
            last: LiveMetrics::default(),
        }
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(config.visibility_threshold, config.step_min_drop)
    }

    pub fn update(&mut self, pose: &PoseLandmarks) -> LiveMetrics {
        self.last = LiveMetrics {
            trunk_tilt_deg: trunk_tilt_deg(pose, self.visibility_threshold),
            shoulder_asymmetry: shoulder_asymmetry(pose, self.visibility_threshold),
            step_count: self.steps.update(pose),
        };
        self.last
    }

    /// 人物未検出フレーム。角度は消し、歩数は保持する。
    pub fn miss(&mut self) -> LiveMetrics {
        self.steps.miss();
        self.last = LiveMetrics {
            step_count: self.steps.count(),
            ..LiveMetrics::default()
        };
        self.last
    }

    pub fn last(&self) -> LiveMetrics {
        self.last
    }

    pub fn reset(&mut self) {
        self.steps.reset();
        self.last = LiveMetrics::default();
    }
}
