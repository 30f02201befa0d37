//! 0RGBのピクセルバッファへの描画。ウィンドウやカメラに依存しない。

use crate::pose::{LandmarkIndex, PoseLandmarks, POSE_CONNECTIONS};

/// ランドマークの色 (RGB)
pub const LANDMARK_COLOR: u32 = 0xFF0000;

/// 指標の計算に使うランドマーク（肩・腰・足首）の色
pub const METRIC_LANDMARK_COLOR: u32 = 0x00E676;

/// 骨格線の色 (RGB)
pub const CONNECTION_COLOR: u32 = 0xFFFFFF;

pub const PROGRESS_COLOR: u32 = 0x1976D2;
const PROGRESS_TRACK_COLOR: u32 = 0x303030;
const PROGRESS_HEIGHT: usize = 6;

pub const OVERLAY_TEXT_COLOR: u32 = 0xFFFFFF;

const LANDMARK_RADIUS: i32 = 5;

const METRIC_LANDMARKS: [LandmarkIndex; 6] = [
    LandmarkIndex::LeftShoulder,
    LandmarkIndex::RightShoulder,
    LandmarkIndex::LeftHip,
    LandmarkIndex::RightHip,
    LandmarkIndex::LeftAnkle,
    LandmarkIndex::RightAnkle,
];

/// 7セグメント (a, b, c, d, e, f, g)
const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

pub struct Canvas {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    /// 左右反転して表示する（自撮り向き）
    mirror: bool,
}

impl Canvas {
    pub fn new(width: usize, height: usize, mirror: bool) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
            mirror,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// 画像の行を書き込む。鏡像設定なら左右反転。
    pub fn put_row(&mut self, y: usize, row: impl ExactSizeIterator<Item = u32>) {
        if y >= self.height {
            return;
        }
        let w = row.len().min(self.width);
        let line = &mut self.pixels[y * self.width..(y + 1) * self.width];
        for (x, color) in row.take(w).enumerate() {
            let dst = if self.mirror { w - 1 - x } else { x };
            line[dst] = color;
        }
    }

    /// 正規化座標 → 画面座標（鏡像を考慮）
    pub fn project(&self, x: f32, y: f32) -> (i32, i32) {
        let x = if self.mirror { 1.0 - x } else { x };
        ((x * self.width as f32) as i32, (y * self.height as f32) as i32)
    }

    /// 骨格と関節点。閾値以下の点とそれに繋がる線は描かない。
    pub fn draw_pose(&mut self, pose: &PoseLandmarks, threshold: f32) {
        for (a, b) in POSE_CONNECTIONS {
            let (start, end) = (pose.get(a), pose.get(b));
            if start.is_visible(threshold) && end.is_visible(threshold) {
                let from = self.project(start.x, start.y);
                let to = self.project(end.x, end.y);
                self.draw_line(from, to, CONNECTION_COLOR);
            }
        }

        for index in LandmarkIndex::ALL {
            let lm = pose.get(index);
            if !lm.is_visible(threshold) {
                continue;
            }
            let color = if METRIC_LANDMARKS.contains(&index) {
                METRIC_LANDMARK_COLOR
            } else {
                LANDMARK_COLOR
            };
            let (cx, cy) = self.project(lm.x, lm.y);
            self.fill_circle(cx, cy, LANDMARK_RADIUS, color);
        }
    }

    /// 画面上端のプログレスバー (0.0〜1.0)
    pub fn draw_progress(&mut self, fraction: f32) {
        let filled = (self.width as f32 * fraction.clamp(0.0, 1.0)) as usize;
        for y in 0..PROGRESS_HEIGHT.min(self.height) {
            let line = &mut self.pixels[y * self.width..(y + 1) * self.width];
            line[..filled].fill(PROGRESS_COLOR);
            line[filled..].fill(PROGRESS_TRACK_COLOR);
        }
    }

    /// 全体を半分の明るさに
    pub fn dim(&mut self) {
        for px in self.pixels.iter_mut() {
            *px = (*px >> 1) & 0x7F7F7F;
        }
    }

    /// 先頭が数字のメッセージなら中央に大きく描く。それ以外は何もしない。
    pub fn draw_countdown(&mut self, message: &str) {
        let Some(digit) = message.chars().next().and_then(|c| c.to_digit(10)) else {
            return;
        };
        let h = self.height as i32 / 2;
        let w = h / 2;
        let x0 = (self.width as i32 - w) / 2;
        let y0 = (self.height as i32 - h) / 2;
        let t = (h / 10).max(2);
        let half = h / 2;

        let segments = [
            (x0, y0, w, t),
            (x0 + w - t, y0, t, half),
            (x0 + w - t, y0 + half, t, half),
            (x0, y0 + h - t, w, t),
            (x0, y0 + half, t, half),
            (x0, y0, t, half),
            (x0, y0 + half - t / 2, w, t),
        ];
        for (on, (x, y, rw, rh)) in DIGIT_SEGMENTS[digit as usize].iter().zip(segments) {
            if *on {
                self.fill_rect(x, y, rw, rh, OVERLAY_TEXT_COLOR);
            }
        }
    }

    fn draw_line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs());
        if steps == 0 {
            self.plot(x0, y0, color);
            return;
        }
        let sx = (x1 - x0) as f32 / steps as f32;
        let sy = (y1 - y0) as f32 / steps as f32;
        for i in 0..=steps {
            let x = x0 as f32 + sx * i as f32;
            let y = y0 as f32 + sy * i as f32;
            self.plot(x.round() as i32, y.round() as i32, color);
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        let r2 = radius * radius;
        for y in -radius..=radius {
            let span = ((r2 - y * y) as f32).sqrt() as i32;
            for x in -span..=span {
                self.plot(cx + x, cy + y, color);
            }
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        for py in y..y + h {
            for px in x..x + w {
                self.plot(px, py, color);
            }
        }
    }

    /// 範囲外は無視
    fn plot(&mut self, x: i32, y: i32, color: u32) {
        if (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y) {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn count(canvas: &Canvas, color: u32) -> usize {
        canvas.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_put_row_mirrored() {
        let mut canvas = Canvas::new(3, 1, true);
        canvas.put_row(0, [1u32, 2, 3].into_iter());
        assert_eq!(canvas.pixels(), &[3, 2, 1]);

        let mut canvas = Canvas::new(3, 1, false);
        canvas.put_row(0, [1u32, 2, 3].into_iter());
        assert_eq!(canvas.pixels(), &[1, 2, 3]);
    }

    #[test]
    fn test_project_mirror() {
        let canvas = Canvas::new(100, 50, true);
        assert_eq!(canvas.project(0.25, 0.5), (75, 25));
        let canvas = Canvas::new(100, 50, false);
        assert_eq!(canvas.project(0.25, 0.5), (25, 25));
    }

    #[test]
    fn test_progress_bar() {
        let mut canvas = Canvas::new(10, 10, false);
        canvas.draw_progress(0.3);
        assert_eq!(canvas.get(2, 0), Some(PROGRESS_COLOR));
        assert_eq!(canvas.get(3, 0), Some(PROGRESS_TRACK_COLOR));
        assert_eq!(canvas.get(0, PROGRESS_HEIGHT), Some(0));
    }

    #[test]
    fn test_dim_halves_channels() {
        let mut canvas = Canvas::new(1, 1, false);
        canvas.put_row(0, [0xFF8040u32].into_iter());
        canvas.dim();
        assert_eq!(canvas.get(0, 0), Some(0x7F4020));
    }

    #[test]
    fn test_countdown_only_for_digits() {
        let mut canvas = Canvas::new(80, 80, false);
        canvas.draw_countdown("START!");
        assert_eq!(count(&canvas, OVERLAY_TEXT_COLOR), 0);
        canvas.draw_countdown("3");
        assert!(count(&canvas, OVERLAY_TEXT_COLOR) > 0);
    }

    #[test]
    fn test_draw_pose_skips_invisible() {
        let mut pose = PoseLandmarks::default();
        let mut canvas = Canvas::new(64, 64, false);
        canvas.draw_pose(&pose, 0.5);
        assert_eq!(count(&canvas, 0), 64 * 64);

        let visible = Landmark { x: 0.5, y: 0.5, z: 0.0, visibility: 0.9 };
        pose.set(LandmarkIndex::LeftAnkle, visible);
        pose.set(LandmarkIndex::Nose, Landmark { x: 0.1, y: 0.1, ..visible });
        canvas.draw_pose(&pose, 0.5);
        assert_eq!(canvas.get(32, 32), Some(METRIC_LANDMARK_COLOR));
        assert_eq!(canvas.get(6, 6), Some(LANDMARK_COLOR));
    }

    #[test]
    fn test_line_endpoints() {
        let mut canvas = Canvas::new(10, 10, false);
        canvas.draw_line((1, 1), (8, 4), CONNECTION_COLOR);
        assert_eq!(canvas.get(1, 1), Some(CONNECTION_COLOR));
        assert_eq!(canvas.get(8, 4), Some(CONNECTION_COLOR));
        canvas.draw_line((-5, -5), (-1, -1), CONNECTION_COLOR);
    }
}
