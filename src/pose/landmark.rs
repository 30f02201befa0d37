use serde::{Deserialize, Serialize};

/// 33点ボディランドマークのインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0, 下向きが正)
    pub y: f32,
    /// 腰中心を原点とした相対深度（Xと同じスケール）
    pub z: f32,
    /// 可視性スコア (0.0〜1.0)
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 可視性が閾値を超えているか
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// 一人分の33ランドマーク
///
/// JSONでは `[{x, y, z, visibility}, ...]` の配列になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct PoseLandmarks {
    landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl PoseLandmarks {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    pub fn set(&mut self, index: LandmarkIndex, landmark: Landmark) {
        self.landmarks[index as usize] = landmark;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    /// 2点の中点。どちらかが閾値以下ならNone。
    pub fn midpoint(&self, a: LandmarkIndex, b: LandmarkIndex, threshold: f32) -> Option<(f32, f32)> {
        let la = self.get(a);
        let lb = self.get(b);
        if !la.is_visible(threshold) || !lb.is_visible(threshold) {
            return None;
        }
        Some(((la.x + lb.x) / 2.0, (la.y + lb.y) / 2.0))
    }

    /// 全ランドマークの平均visibility
    pub fn average_visibility(&self) -> f32 {
        let sum: f32 = self.landmarks.iter().map(|l| l.visibility).sum();
        sum / LandmarkIndex::COUNT as f32
    }
}

impl Default for PoseLandmarks {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}

impl TryFrom<Vec<Landmark>> for PoseLandmarks {
    type Error = String;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        let len = value.len();
        let landmarks: [Landmark; LandmarkIndex::COUNT] = value
            .try_into()
            .map_err(|_| format!("expected {} landmarks, got {}", LandmarkIndex::COUNT, len))?;
        Ok(Self { landmarks })
    }
}

impl From<PoseLandmarks> for Vec<Landmark> {
    fn from(pose: PoseLandmarks) -> Self {
        pose.landmarks.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(LandmarkIndex::from_index(11), Some(LandmarkIndex::LeftShoulder));
        assert_eq!(LandmarkIndex::from_index(24), Some(LandmarkIndex::RightHip));
        assert_eq!(LandmarkIndex::from_index(28), Some(LandmarkIndex::RightAnkle));
        assert_eq!(LandmarkIndex::from_index(32), Some(LandmarkIndex::RightFootIndex));
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn test_from_index_matches_discriminant() {
        for i in 0..LandmarkIndex::COUNT {
            assert_eq!(LandmarkIndex::from_index(i).map(|l| l as usize), Some(i));
        }
    }

    #[test]
    fn test_is_visible_is_strict() {
        let lm = Landmark::new(0.5, 0.5, 0.0, 0.5);
        assert!(!lm.is_visible(0.5));
        assert!(lm.is_visible(0.49));
    }

    #[test]
    fn test_midpoint_requires_both() {
        let mut pose = PoseLandmarks::default();
        pose.set(LandmarkIndex::LeftHip, Landmark::new(0.4, 0.6, 0.0, 0.9));
        pose.set(LandmarkIndex::RightHip, Landmark::new(0.6, 0.8, 0.0, 0.9));
        let (x, y) = pose
            .midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip, 0.5)
            .unwrap();
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - 0.7).abs() < 1e-6);

        pose.set(LandmarkIndex::RightHip, Landmark::new(0.6, 0.8, 0.0, 0.1));
        assert!(pose.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip, 0.5).is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut pose = PoseLandmarks::default();
        pose.set(LandmarkIndex::Nose, Landmark::new(0.5, 0.25, -0.1, 0.75));
        let value = serde_json::to_value(&pose).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 33);
        assert_eq!(array[0]["x"], 0.5);
        assert_eq!(array[0]["visibility"], 0.75);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let json = serde_json::json!([{ "x": 0.0, "y": 0.0, "z": 0.0, "visibility": 1.0 }]);
        let err = serde_json::from_value::<PoseLandmarks>(json).unwrap_err();
        assert!(err.to_string().contains("expected 33 landmarks"));
    }
}
