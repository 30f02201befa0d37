use crate::pose::{LandmarkIndex, PoseLandmarks};

/// 鉛直上向き（画像座標ではyが下向きなので -90°）
const VERTICAL_ANGLE_DEG: f32 = -90.0;

/// 体幹の傾き角（度）
///
/// 腰中点 → 肩中点 ベクトルの向きと鉛直上向きとの差。直立で0。
/// 両肩・両腰のいずれかが閾値以下ならNone。
pub fn trunk_tilt_deg(pose: &PoseLandmarks, visibility_threshold: f32) -> Option<f32> {
    let (shoulder_x, shoulder_y) = pose.midpoint(
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
        visibility_threshold,
    )?;
    let (hip_x, hip_y) =
        pose.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip, visibility_threshold)?;

    let dx = shoulder_x - hip_x;
    let dy = shoulder_y - hip_y;
    Some(tilt_from_vector(dx, dy))
}

/// 胴体ベクトル (dx, dy) から傾き角を計算（0〜180°）
pub fn tilt_from_vector(dx: f32, dy: f32) -> f32 {
    let angle_deg = dy.atan2(dx).to_degrees();
    let tilt = (angle_deg - VERTICAL_ANGLE_DEG).abs();
    if tilt > 180.0 {
        360.0 - tilt
    } else {
        tilt
    }
}

/// 左右の肩の高さの差（正規化座標）
pub fn shoulder_asymmetry(pose: &PoseLandmarks, visibility_threshold: f32) -> Option<f32> {
    let left = pose.get(LandmarkIndex::LeftShoulder);
    let right = pose.get(LandmarkIndex::RightShoulder);
    if !left.is_visible(visibility_threshold) || !right.is_visible(visibility_threshold) {
        return None;
    }
    Some((left.y - right.y).abs())
}
