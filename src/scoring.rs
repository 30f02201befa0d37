//! Desktop scoring capture: camera → landmarks → live metrics → trace → submit.

use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

use crate::api::{ApiClient, Challenge, Score, User};
use crate::camera::ThreadedCamera;
use crate::config::Config;
use crate::metrics::{LiveMetrics, MetricsTracker};
use crate::pose::{preprocess_for_landmarks, LandmarkDetector, PoseLandmarks};
use crate::render::{Key, MinifbRenderer};
use crate::session::{ScoringSession, ScoringStatus, SessionEvent};
use crate::submit::{abandon_if_empty, finish_session};

const METRICS_LOG_INTERVAL: Duration = Duration::from_secs(1);

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::CountdownMessage(message) => tracing::info!("{}", message),
        SessionEvent::ScoringStarted => tracing::info!("採点中..."),
        SessionEvent::ScoringFinished => tracing::info!("FINISH"),
    }
}

fn log_metrics(metrics: &LiveMetrics) {
    let tilt = metrics
        .trunk_tilt_deg
        .map(|t| format!("{:.1}°", t))
        .unwrap_or_else(|| "-".to_string());
    tracing::info!("体幹の傾き: {}  歩数: {}", tilt, metrics.step_count);
}

/// 採点画面のループ。送信に成功したらそのスコアを返す。
///
/// ウィンドウを閉じた場合は `Ok(None)`。データ無しや送信失敗では
/// 警告を出してIdleに戻り、再挑戦を待つ。
/// tokioのマルチスレッドランタイム上で `block_in_place` から呼ぶこと。
pub fn run_scoring(
    config: &Config,
    client: &ApiClient,
    user: &User,
    challenge: &Challenge,
    runtime: &Handle,
) -> Result<Option<Score>> {
    let camera = ThreadedCamera::start(&config.camera)?;
    let (width, height) = camera.resolution();

    let mut detector = LandmarkDetector::from_config(&config.model)?;
    tracing::info!("Model loaded: {}", config.model.path);

    let mut renderer = MinifbRenderer::new(
        &format!("walkform - {}", challenge.name),
        width as usize,
        height as usize,
        config.view.mirror,
    )?;
    let mut session = ScoringSession::from_config(&config.session);
    let mut metrics = MetricsTracker::from_config(&config.metrics);

    tracing::info!("{}: {}", challenge.name, challenge.description);
    tracing::info!("操作: [Space] 採点開始  [S] 採点停止  [Esc] 終了");

    let mut last_frame_id: u64 = 0;
    let mut last_metrics_log = Instant::now();

    while renderer.is_open() {
        let now = Instant::now();

        if session.status() == ScoringStatus::Idle
            && (renderer.is_key_pressed(Key::Space) || renderer.is_key_pressed(Key::Enter))
        {
            metrics.reset();
            if let Some(event) = session.start(now) {
                log_event(&event);
            }
        }
        if renderer.is_key_pressed(Key::S) {
            if let Some(event) = session.stop(now) {
                log_event(&event);
                abandon_if_empty(&mut session);
            }
        }
        if let Some(event) = session.tick(now) {
            log_event(&event);
            match event {
                SessionEvent::ScoringStarted => metrics.reset(),
                SessionEvent::ScoringFinished => {
                    abandon_if_empty(&mut session);
                }
                SessionEvent::CountdownMessage(_) => {}
            }
        }

        if !camera.is_alive() {
            anyhow::bail!("camera capture stopped");
        }

        match camera.next_frame(last_frame_id) {
            Some(frame) => {
                last_frame_id = frame.id;

                let (input, letterbox) = preprocess_for_landmarks(&frame.image, detector.input_size())?;
                let pose: Option<PoseLandmarks> = match detector.detect(input) {
                    Ok(pose) => pose.map(|p| letterbox.unletterbox(&p)),
                    Err(e) => {
                        tracing::warn!("inference failed: {:#}", e);
                        None
                    }
                };

                let live = match &pose {
                    Some(p) => metrics.update(p),
                    None => metrics.miss(),
                };
                session.record(pose.iter().cloned().collect(), frame.captured_at);

                if session.status() == ScoringStatus::Scoring
                    && last_metrics_log.elapsed() >= METRICS_LOG_INTERVAL
                {
                    log_metrics(&live);
                    last_metrics_log = Instant::now();
                }

                renderer.draw_frame(&frame.image)?;
                if let Some(p) = &pose {
                    renderer.canvas().draw_pose(p, config.view.confidence_threshold);
                }
                if session.status() == ScoringStatus::Scoring {
                    renderer.canvas().draw_progress(session.progress(now));
                }
                if session.shows_overlay() {
                    renderer.canvas().dim();
                    renderer.canvas().draw_countdown(session.message());
                }
            }
            None => std::thread::sleep(Duration::from_millis(1)),
        }

        renderer.update()?;

        if session.ready_to_submit(now) {
            let submitted = runtime.block_on(finish_session(
                &mut session,
                client,
                user.id,
                challenge.id,
                now,
            ));
            if submitted.is_some() {
                return Ok(submitted);
            }
        }
    }

    Ok(None)
}
