use anyhow::Result;
use std::time::{Duration, Instant};

use walkform::camera::ThreadedCamera;
use walkform::config::Config;
use walkform::logging;
use walkform::metrics::MetricsTracker;
use walkform::pose::{preprocess_for_landmarks, LandmarkDetector};
use walkform::render::MinifbRenderer;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    logging::init();
    let config = Config::load_or_default(CONFIG_PATH)?;

    tracing::info!("Pose Viewer ({})", env!("GIT_VERSION"));
    tracing::info!("Press ESC to exit");

    let camera = ThreadedCamera::start(&config.camera)?;
    let (width, height) = camera.resolution();
    tracing::info!("Camera resolution: {}x{}", width, height);

    let mut detector = LandmarkDetector::from_config(&config.model)?;
    tracing::info!("Model loaded: {}", config.model.path);

    let mut renderer = MinifbRenderer::new(
        "Pose Viewer",
        width as usize,
        height as usize,
        config.view.mirror,
    )?;
    let mut metrics = MetricsTracker::from_config(&config.metrics);

    // FPS計測用
    let mut frame_count = 0u32;
    let mut detected_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut last_frame_id = 0u64;

    while renderer.is_open() {
        let Some(frame) = camera.next_frame(last_frame_id) else {
            if !camera.is_alive() {
                anyhow::bail!("camera capture stopped");
            }
            std::thread::sleep(Duration::from_millis(1));
            renderer.update()?;
            continue;
        };
        last_frame_id = frame.id;

        let (input, letterbox) = preprocess_for_landmarks(&frame.image, detector.input_size())?;
        let pose = detector.detect(input)?.map(|p| letterbox.unletterbox(&p));

        let live = match &pose {
            Some(p) => {
                detected_count += 1;
                metrics.update(p)
            }
            None => metrics.miss(),
        };

        renderer.draw_frame(&frame.image)?;
        if let Some(p) = &pose {
            renderer.canvas().draw_pose(p, config.view.confidence_threshold);
        }
        renderer.update()?;

        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let tilt = live
                .trunk_tilt_deg
                .map(|t| format!("{:.1}°", t))
                .unwrap_or_else(|| "-".to_string());
            tracing::info!(
                "FPS: {:.1}, detected: {}/{}, tilt: {}, steps: {}, avg visibility: {:.2}",
                frame_count as f32 / elapsed,
                detected_count,
                frame_count,
                tilt,
                live.step_count,
                pose.as_ref().map(|p| p.average_visibility()).unwrap_or(0.0)
            );
            frame_count = 0;
            detected_count = 0;
            fps_timer = Instant::now();
        }
    }

    tracing::info!("Shutting down...");
    Ok(())
}
