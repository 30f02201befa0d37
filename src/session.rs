//! Scoring capture state machine: idle → countdown → scoring → finished.
//!
//! All transitions take the current `Instant` from the caller so the frame
//! loop and the tests share one clock.

use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::trace::{LandmarkTrace, TraceFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringStatus {
    Idle,
    Countdown,
    Scoring,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 画面中央に出すメッセージ（"3", "2", "1", "START!"）
    CountdownMessage(String),
    ScoringStarted,
    ScoringFinished,
}

pub struct ScoringSession {
    countdown_secs: u32,
    start_hold: Duration,
    duration: Duration,
    finish_hold: Duration,
    status: ScoringStatus,
    /// 現在の状態に入った時刻
    entered_at: Option<Instant>,
    message: String,
    trace: LandmarkTrace,
}

impl ScoringSession {
    pub fn new(countdown_secs: u32, start_hold: Duration, duration: Duration, finish_hold: Duration) -> Self {
        Self {
            countdown_secs,
            start_hold,
            duration,
            finish_hold,
            status: ScoringStatus::Idle,
            entered_at: None,
            message: String::new(),
            trace: LandmarkTrace::new(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.countdown_secs,
            Duration::from_millis(config.start_hold_ms),
            Duration::from_millis(config.duration_ms),
            Duration::from_millis(config.finish_hold_ms),
        )
    }

    pub fn status(&self) -> ScoringStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &LandmarkTrace {
        &self.trace
    }

    /// カウントダウンまたはFINISHのオーバーレイを出すか
    pub fn shows_overlay(&self) -> bool {
        match self.status {
            ScoringStatus::Countdown => true,
            ScoringStatus::Finished => self.message == "FINISH",
            _ => false,
        }
    }

    /// 採点開始。Idle以外では何もしない。
    pub fn start(&mut self, now: Instant) -> Option<SessionEvent> {
        if self.status != ScoringStatus::Idle {
            return None;
        }
        self.status = ScoringStatus::Countdown;
        self.entered_at = Some(now);
        self.trace = LandmarkTrace::new();
        self.message = self.countdown_message(Duration::ZERO);
        Some(SessionEvent::CountdownMessage(self.message.clone()))
    }

    /// 時間経過による遷移を進める
    pub fn tick(&mut self, now: Instant) -> Option<SessionEvent> {
        let entered = self.entered_at?;
        let elapsed = now.saturating_duration_since(entered);

        match self.status {
            ScoringStatus::Countdown => {
                let countdown = Duration::from_secs(self.countdown_secs as u64);
                if elapsed >= countdown + self.start_hold {
                    self.status = ScoringStatus::Scoring;
                    self.entered_at = Some(entered + countdown + self.start_hold);
                    self.message.clear();
                    self.trace = LandmarkTrace::new();
                    return Some(SessionEvent::ScoringStarted);
                }
                let message = self.countdown_message(elapsed);
                if message != self.message {
                    self.message = message;
                    return Some(SessionEvent::CountdownMessage(self.message.clone()));
                }
                None
            }
            ScoringStatus::Scoring => {
                if elapsed >= self.duration {
                    self.finish(entered + self.duration);
                    return Some(SessionEvent::ScoringFinished);
                }
                None
            }
            ScoringStatus::Idle | ScoringStatus::Finished => None,
        }
    }

    /// 手動停止。Scoring中のみ有効。
    pub fn stop(&mut self, now: Instant) -> Option<SessionEvent> {
        if self.status != ScoringStatus::Scoring {
            return None;
        }
        self.finish(now);
        Some(SessionEvent::ScoringFinished)
    }

    fn finish(&mut self, at: Instant) {
        self.status = ScoringStatus::Finished;
        self.entered_at = Some(at);
        self.message = "FINISH".to_string();
    }

    /// Scoring中ならフレームを記録して true
    pub fn record(&mut self, frame: TraceFrame, now: Instant) -> bool {
        if self.status != ScoringStatus::Scoring {
            return false;
        }
        let offset = self
            .entered_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.trace.push(frame, offset);
        true
    }

    /// 採点進捗 (0.0〜1.0)。Scoring以外では Finished=1.0、その他=0.0。
    pub fn progress(&self, now: Instant) -> f32 {
        match (self.status, self.entered_at) {
            (ScoringStatus::Scoring, Some(entered)) => {
                if self.duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(entered);
                (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
            }
            (ScoringStatus::Finished, _) => 1.0,
            _ => 0.0,
        }
    }

    /// FINISH表示の保持時間が過ぎたか
    pub fn ready_to_submit(&self, now: Instant) -> bool {
        match (self.status, self.entered_at) {
            (ScoringStatus::Finished, Some(finished)) => {
                now.saturating_duration_since(finished) >= self.finish_hold
            }
            _ => false,
        }
    }

    /// 記録済みトレースを取り出す（バッファは空になる）
    pub fn take_trace(&mut self) -> LandmarkTrace {
        std::mem::take(&mut self.trace)
    }

    /// Idleに戻す
    pub fn reset(&mut self) {
        self.status = ScoringStatus::Idle;
        self.entered_at = None;
        self.message.clear();
        self.trace = LandmarkTrace::new();
    }

    fn countdown_message(&self, elapsed: Duration) -> String {
        let whole_secs = elapsed.as_secs() as u32;
        if whole_secs < self.countdown_secs {
            (self.countdown_secs - whole_secs).to_string()
        } else {
            "START!".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PoseLandmarks;

    fn session() -> ScoringSession {
        ScoringSession::new(
            3,
            Duration::from_millis(500),
            Duration::from_millis(10_000),
            Duration::from_millis(1_000),
        )
    }

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_countdown_sequence() {
        let t0 = Instant::now();
        let mut s = session();
        assert_eq!(s.start(t0), Some(SessionEvent::CountdownMessage("3".into())));
        assert_eq!(s.status(), ScoringStatus::Countdown);
        assert!(s.shows_overlay());

        assert_eq!(s.tick(ms(t0, 500)), None);
        assert_eq!(s.tick(ms(t0, 1000)), Some(SessionEvent::CountdownMessage("2".into())));
        assert_eq!(s.tick(ms(t0, 2000)), Some(SessionEvent::CountdownMessage("1".into())));
        assert_eq!(s.tick(ms(t0, 3000)), Some(SessionEvent::CountdownMessage("START!".into())));
        assert_eq!(s.tick(ms(t0, 3400)), None);
        assert_eq!(s.tick(ms(t0, 3500)), Some(SessionEvent::ScoringStarted));
        assert_eq!(s.status(), ScoringStatus::Scoring);
        assert_eq!(s.message(), "");
        assert!(!s.shows_overlay());
    }

    #[test]
    fn test_start_only_from_idle() {
        let t0 = Instant::now();
        let mut s = session();
        s.start(t0);
        assert_eq!(s.start(ms(t0, 100)), None);
        assert_eq!(s.status(), ScoringStatus::Countdown);
    }

    #[test]
    fn test_record_only_while_scoring() {
        let t0 = Instant::now();
        let mut s = session();
        assert!(!s.record(vec![PoseLandmarks::default()], t0));
        s.start(t0);
        assert!(!s.record(vec![PoseLandmarks::default()], ms(t0, 1000)));
        s.tick(ms(t0, 3500));
        assert!(s.record(vec![PoseLandmarks::default()], ms(t0, 3600)));
        assert!(s.record(vec![], ms(t0, 3700)));
        assert_eq!(s.trace().len(), 2);
        assert_eq!(s.trace().span(), Duration::from_millis(100));
    }

    #[test]
    fn test_finishes_after_duration() {
        let t0 = Instant::now();
        let mut s = session();
        s.start(t0);
        s.tick(ms(t0, 3500));
        assert!((s.progress(ms(t0, 8500)) - 0.5).abs() < 1e-4);
        assert_eq!(s.tick(ms(t0, 13_400)), None);
        assert_eq!(s.tick(ms(t0, 13_500)), Some(SessionEvent::ScoringFinished));
        assert_eq!(s.status(), ScoringStatus::Finished);
        assert_eq!(s.message(), "FINISH");
        assert!(s.shows_overlay());
        assert_eq!(s.progress(ms(t0, 20_000)), 1.0);
        assert!(!s.record(vec![], ms(t0, 13_600)));
    }

    #[test]
    fn test_finish_hold_before_submit() {
        let t0 = Instant::now();
        let mut s = session();
        s.start(t0);
        s.tick(ms(t0, 3500));
        s.tick(ms(t0, 13_500));
        assert!(!s.ready_to_submit(ms(t0, 14_000)));
        assert!(s.ready_to_submit(ms(t0, 14_500)));
    }

    #[test]
    fn test_late_tick_keeps_schedule() {
        // フレーム処理が遅れても採点終了時刻は開始+採点時間
        let t0 = Instant::now();
        let mut s = session();
        s.start(t0);
        s.tick(ms(t0, 3900));
        assert!((s.progress(ms(t0, 3900)) - 0.04).abs() < 1e-4);
        s.tick(ms(t0, 14_000));
        assert!(s.ready_to_submit(ms(t0, 14_500)));
    }

    #[test]
    fn test_manual_stop() {
        let t0 = Instant::now();
        let mut s = session();
        assert_eq!(s.stop(t0), None);
        s.start(t0);
        assert_eq!(s.stop(ms(t0, 1000)), None);
        s.tick(ms(t0, 3500));
        s.record(vec![PoseLandmarks::default()], ms(t0, 3600));
        assert_eq!(s.stop(ms(t0, 5000)), Some(SessionEvent::ScoringFinished));
        assert_eq!(s.status(), ScoringStatus::Finished);
        assert!(s.ready_to_submit(ms(t0, 6000)));
        assert_eq!(s.take_trace().len(), 1);
        assert!(s.trace().is_empty());
    }

    #[test]
    fn test_reset_to_idle() {
        let t0 = Instant::now();
        let mut s = session();
        s.start(t0);
        s.tick(ms(t0, 3500));
        s.record(vec![], ms(t0, 3600));
        s.reset();
        assert_eq!(s.status(), ScoringStatus::Idle);
        assert!(s.trace().is_empty());
        assert_eq!(s.tick(ms(t0, 20_000)), None);
        assert!(s.start(ms(t0, 20_000)).is_some());
    }
}
