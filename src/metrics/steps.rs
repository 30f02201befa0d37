use crate::pose::{LandmarkIndex, PoseLandmarks};

/// 足首1本分の3サンプル極小検出器
///
/// 高さ (1 - y) の直近3サンプルを保持し、中央が両隣より低ければ接地1回。
#[derive(Debug, Clone, Default)]
pub struct AnkleMinimumDetector {
    window: [f32; 3],
    len: usize,
}

impl AnkleMinimumDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい高さサンプルを追加。中央サンプルが極小なら true。
    pub fn push(&mut self, height: f32, min_drop: f32) -> bool {
        if self.len < 3 {
            self.window[self.len] = height;
            self.len += 1;
        } else {
            self.window = [self.window[1], self.window[2], height];
        }
        if self.len < 3 {
            return false;
        }

        let [before, mid, after] = self.window;
        mid < before && mid < after && before.max(after) - mid >= min_drop
    }

    /// 欠損フレームで窓を切る
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

/// 左右の足首の極小を合算して歩数を数える
#[derive(Debug, Clone)]
pub struct StepCounter {
    left: AnkleMinimumDetector,
    right: AnkleMinimumDetector,
    visibility_threshold: f32,
    min_drop: f32,
    count: u32,
}

impl StepCounter {
    pub fn new(visibility_threshold: f32, min_drop: f32) -> Self {
        Self {
            left: AnkleMinimumDetector::new(),
            right: AnkleMinimumDetector::new(),
            visibility_threshold,
            min_drop,
            count: 0,
        }
    }

    pub fn update(&mut self, pose: &PoseLandmarks) -> u32 {
        let threshold = self.visibility_threshold;
        let min_drop = self.min_drop;
        for (index, detector) in [
            (LandmarkIndex::LeftAnkle, &mut self.left),
            (LandmarkIndex::RightAnkle, &mut self.right),
        ] {
            let ankle = pose.get(index);
            if !ankle.is_visible(threshold) {
                detector.reset();
                continue;
            }
            if detector.push(1.0 - ankle.y, min_drop) {
                self.count += 1;
            }
        }
        self.count
    }

    /// 人物が検出されなかったフレーム
    pub fn miss(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        self.miss();
        self.count = 0;
    }
}
