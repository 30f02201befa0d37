use anyhow::Result;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use opencv::core::{Mat, Vec3b};
use opencv::prelude::*;

use super::canvas::Canvas;

/// minifbウィンドウ。描画は `canvas()` に対して行い、`update()` で表示する。
pub struct MinifbRenderer {
    window: Window,
    canvas: Canvas,
}

impl MinifbRenderer {
    pub fn new(title: &str, width: usize, height: usize, mirror: bool) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        Ok(Self {
            window,
            canvas: Canvas::new(width, height, mirror),
        })
    }

    /// Escで閉じる
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// 押された瞬間だけtrue（キーリピート無し）
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    pub fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// BGRのカメラ画像をキャンバスへ
    pub fn draw_frame(&mut self, frame: &Mat) -> Result<()> {
        let rows = (frame.rows().max(0) as usize).min(self.canvas.height());
        let cols = frame.cols().max(0) as usize;
        let mut row = Vec::with_capacity(cols);
        for y in 0..rows {
            row.clear();
            for x in 0..cols {
                let bgr = frame.at_2d::<Vec3b>(y as i32, x as i32)?;
                row.push(((bgr[2] as u32) << 16) | ((bgr[1] as u32) << 8) | bgr[0] as u32);
            }
            self.canvas.put_row(y, row.iter().copied());
        }
        Ok(())
    }

    pub fn update(&mut self) -> Result<()> {
        self.window.update_with_buffer(
            self.canvas.pixels(),
            self.canvas.width(),
            self.canvas.height(),
        )?;
        Ok(())
    }
}
