use super::landmark::{Landmark, LandmarkIndex, PoseLandmarks};

/// ランドマーク1点あたりの出力値数 (x, y, z, visibility, presence)
pub const VALUES_PER_LANDMARK: usize = 5;

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// モデル出力（入力画素単位の座標 + logit）をPoseLandmarksに変換
///
/// `raw` は先頭33点分以上の値を持つ必要がある（補助点は無視）。
/// `presence` はlogit。sigmoid後に閾値未満なら人物なしとしてNone。
pub fn decode_landmarks(
    raw: &[f32],
    input_size: f32,
    presence: Option<f32>,
    presence_threshold: f32,
) -> Option<PoseLandmarks> {
    if raw.len() < LandmarkIndex::COUNT * VALUES_PER_LANDMARK {
        return None;
    }
    if let Some(p) = presence {
        if sigmoid(p) < presence_threshold {
            return None;
        }
    }

    let mut pose = PoseLandmarks::default();
    for i in 0..LandmarkIndex::COUNT {
        let v = &raw[i * VALUES_PER_LANDMARK..(i + 1) * VALUES_PER_LANDMARK];
        let Some(index) = LandmarkIndex::from_index(i) else {
            continue;
        };
        pose.set(
            index,
            Landmark::new(
                v[0] / input_size,
                v[1] / input_size,
                v[2] / input_size,
                sigmoid(v[3]),
            ),
        );
    }
    Some(pose)
}

/// 正方形へのレターボックス（上下または左右の黒帯）情報
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub frame_w: u32,
    pub frame_h: u32,
}

impl Letterbox {
    pub fn new(frame_w: u32, frame_h: u32) -> Self {
        Self { frame_w, frame_h }
    }

    /// パディング後の正方形の辺長
    pub fn side(&self) -> u32 {
        self.frame_w.max(self.frame_h)
    }

    /// (左, 上) のパディング量（ピクセル）
    pub fn padding(&self) -> (u32, u32) {
        let side = self.side();
        ((side - self.frame_w) / 2, (side - self.frame_h) / 2)
    }

    /// 正方形内の正規化座標をフレームの正規化座標に戻す
    pub fn unletterbox(&self, pose: &PoseLandmarks) -> PoseLandmarks {
        let side = self.side() as f32;
        let (pad_x, pad_y) = self.padding();
        let fw = self.frame_w.max(1) as f32;
        let fh = self.frame_h.max(1) as f32;

        let mut out = PoseLandmarks::default();
        for (i, lm) in pose.iter().enumerate() {
            let Some(index) = LandmarkIndex::from_index(i) else {
                continue;
            };
            out.set(
                index,
                Landmark::new(
                    (lm.x * side - pad_x as f32) / fw,
                    (lm.y * side - pad_y as f32) / fh,
                    lm.z * side / fw,
                    lm.visibility,
                ),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(index: usize, values: [f32; 5]) -> Vec<f32> {
        let mut raw = vec![0.0; 39 * VALUES_PER_LANDMARK];
        raw[index * 5..index * 5 + 5].copy_from_slice(&values);
        raw
    }

    #[test]
    fn test_decode_normalizes_and_sigmoids() {
        let raw = raw_with(LandmarkIndex::LeftAnkle as usize, [128.0, 192.0, 64.0, 0.0, 5.0]);
        let pose = decode_landmarks(&raw, 256.0, None, 0.5).unwrap();
        let ankle = pose.get(LandmarkIndex::LeftAnkle);
        assert!((ankle.x - 0.5).abs() < 1e-6);
        assert!((ankle.y - 0.75).abs() < 1e-6);
        assert!((ankle.z - 0.25).abs() < 1e-6);
        assert!((ankle.visibility - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_short_output() {
        let raw = vec![0.0; 10];
        assert!(decode_landmarks(&raw, 256.0, None, 0.5).is_none());
    }

    #[test]
    fn test_decode_low_presence() {
        let raw = vec![0.0; 33 * VALUES_PER_LANDMARK];
        assert!(decode_landmarks(&raw, 256.0, Some(-2.0), 0.5).is_none());
        // logit 0.2 → 確率0.55
        assert!(decode_landmarks(&raw, 256.0, Some(0.2), 0.5).is_some());
        assert!(decode_landmarks(&raw, 256.0, Some(0.2), 0.6).is_none());
    }

    #[test]
    fn test_letterbox_landscape() {
        let lb = Letterbox::new(640, 480);
        assert_eq!(lb.side(), 640);
        assert_eq!(lb.padding(), (0, 80));
    }

    #[test]
    fn test_unletterbox() {
        let lb = Letterbox::new(640, 480);
        let mut pose = PoseLandmarks::default();
        // 正方形の中心 → フレームの中心
        pose.set(LandmarkIndex::Nose, Landmark::new(0.5, 0.5, 0.0, 0.9));
        // 上の黒帯の下端 → フレーム上端
        pose.set(LandmarkIndex::LeftHip, Landmark::new(0.25, 80.0 / 640.0, 0.0, 0.9));

        let out = lb.unletterbox(&pose);
        let nose = out.get(LandmarkIndex::Nose);
        assert!((nose.x - 0.5).abs() < 1e-6);
        assert!((nose.y - 0.5).abs() < 1e-6);
        assert_eq!(nose.visibility, 0.9);

        let hip = out.get(LandmarkIndex::LeftHip);
        assert!((hip.x - 0.25).abs() < 1e-6);
        assert!(hip.y.abs() < 1e-6);
    }
}
