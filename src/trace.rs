//! Buffered landmark trace and the score submission payload.

use serde::Serialize;
use std::time::Duration;

use crate::pose::PoseLandmarks;

/// 1フレーム分の検出結果。検出人数分のランドマーク列（0人または1人）。
pub type TraceFrame = Vec<PoseLandmarks>;

/// 採点時間中に記録したフレーム列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkTrace {
    frames: Vec<TraceFrame>,
    /// 採点開始からの経過時間（フレームごと）
    offsets: Vec<Duration>,
}

impl LandmarkTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: TraceFrame, offset: Duration) {
        self.frames.push(frame);
        self.offsets.push(offset);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    /// 人物が写っていたフレーム数
    pub fn detected_frames(&self) -> usize {
        self.frames.iter().filter(|f| !f.is_empty()).count()
    }

    /// 最初と最後のフレームの間隔
    pub fn span(&self) -> Duration {
        match (self.offsets.first(), self.offsets.last()) {
            (Some(first), Some(last)) => last.saturating_sub(*first),
            _ => Duration::ZERO,
        }
    }

    pub fn into_frames(self) -> Vec<TraceFrame> {
        self.frames
    }
}

/// `POST score/` のリクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSubmission {
    pub user: u64,
    pub challenge: u64,
    pub raw_landmarks: Vec<TraceFrame>,
}

impl ScoreSubmission {
    pub fn new(user: u64, challenge: u64, trace: LandmarkTrace) -> Self {
        Self {
            user,
            challenge,
            raw_landmarks: trace.into_frames(),
        }
    }
}
