use anyhow::{bail, Context, Result};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::CameraConfig;

/// 連続して読み込みに失敗したらキャプチャスレッドを止める回数
const MAX_CONSECUTIVE_FAILURES: u32 = 100;

/// 取り込んだ1フレーム
#[derive(Clone)]
pub struct Frame {
    pub image: Mat,
    /// 1始まりの通し番号
    pub id: u64,
    pub captured_at: Instant,
}

/// OpenCVのカメラデバイス
pub struct OpenCvCamera {
    capture: VideoCapture,
    index: i32,
    width: u32,
    height: u32,
}

impl OpenCvCamera {
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let mut capture = VideoCapture::new(config.index, VideoCaptureAPIs::CAP_ANY as i32)
            .with_context(|| format!("failed to open camera {}", config.index))?;
        if !capture.is_opened()? {
            bail!("camera {} is not available", config.index);
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.height as f64)?;
        // 古いフレームを溜めない
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        // 要求どおりの解像度になるとは限らない
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        tracing::info!(
            "camera {} opened: {}x{} (requested {}x{}) @ {} fps",
            config.index,
            width,
            height,
            config.width,
            config.height,
            capture.get(videoio::CAP_PROP_FPS)?
        );

        Ok(Self {
            capture,
            index: config.index,
            width,
            height,
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// BGRの1フレーム
    pub fn read(&mut self) -> Result<Mat> {
        let mut image = Mat::default();
        if !self.capture.read(&mut image)? || image.empty() {
            bail!("camera {} returned no frame", self.index);
        }
        Ok(image)
    }
}

/// キャプチャスレッドと最新フレームの受け渡し
pub struct ThreadedCamera {
    latest: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    width: u32,
    height: u32,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThreadedCamera {
    pub fn start(config: &CameraConfig) -> Result<Self> {
        let mut camera = OpenCvCamera::open(config)?;
        let (width, height) = camera.resolution();

        let latest: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let latest = latest.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("camera".to_string())
                .spawn(move || {
                    let mut next_id = 1u64;
                    let mut failures = 0u32;
                    while running.load(Ordering::Acquire) {
                        match camera.read() {
                            Ok(image) => {
                                failures = 0;
                                let frame = Frame {
                                    image,
                                    id: next_id,
                                    captured_at: Instant::now(),
                                };
                                next_id += 1;
                                *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame);
                            }
                            Err(e) => {
                                failures += 1;
                                if failures >= MAX_CONSECUTIVE_FAILURES {
                                    tracing::error!("camera stopped: {:#}", e);
                                    break;
                                }
                                tracing::debug!("{:#}", e);
                                thread::sleep(Duration::from_millis(5));
                            }
                        }
                    }
                })?
        };

        Ok(Self {
            latest,
            running,
            width,
            height,
            handle: Some(handle),
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `last_id` より新しいフレームがあれば返す
    pub fn next_frame(&self, last_id: u64) -> Option<Frame> {
        let guard = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().filter(|f| f.id > last_id).cloned()
    }

    /// キャプチャスレッドが動いているか
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ThreadedCamera {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
