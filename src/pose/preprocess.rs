use anyhow::Result;
use ndarray::Array4;
use opencv::{
    core::{self, AlgorithmHint, Mat, Scalar, Size, CV_32FC3},
    imgproc,
    prelude::*,
};

use super::decode::Letterbox;

/// OpenCV Mat をランドマークモデル用の入力テンソルに変換
///
/// - 正方形にレターボックス（黒帯）
/// - BGR -> RGB
/// - input_size x input_size にリサイズ
/// - [1, S, S, 3] の f32 テンソルに変換 (0.0-1.0)
pub fn preprocess_for_landmarks(frame: &Mat, input_size: u32) -> Result<(Array4<f32>, Letterbox)> {
    let letterbox = Letterbox::new(frame.cols() as u32, frame.rows() as u32);
    let (pad_x, pad_y) = letterbox.padding();
    let side = letterbox.side();

    let mut squared = Mat::default();
    core::copy_make_border(
        frame,
        &mut squared,
        pad_y as i32,
        (side - letterbox.frame_h - pad_y) as i32,
        pad_x as i32,
        (side - letterbox.frame_w - pad_x) as i32,
        core::BORDER_CONSTANT,
        Scalar::all(0.0),
    )?;

    // BGR -> RGB
    let mut rgb = Mat::default();
    imgproc::cvt_color(&squared, &mut rgb, imgproc::COLOR_BGR2RGB, 0, AlgorithmHint::ALGO_HINT_DEFAULT)?;

    let size = input_size as i32;
    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(size, size),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    // f32 に変換しつつ [0, 255] → [0.0, 1.0]
    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0 / 255.0, 0.0)?;

    let s = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, s, s, 3));
    for y in 0..size {
        for x in 0..size {
            let pixel = float_mat.at_2d::<core::Vec3f>(y, x)?;
            tensor[[0, y as usize, x as usize, 0]] = pixel[0];
            tensor[[0, y as usize, x as usize, 1]] = pixel[1];
            tensor[[0, y as usize, x as usize, 2]] = pixel[2];
        }
    }

    Ok((tensor, letterbox))
}
