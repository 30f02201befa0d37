//! 採点終了後の処理。カメラやウィンドウに依存しないのでループから切り出してある。

use std::time::Instant;

use crate::api::{ApiClient, Score};
use crate::session::{ScoringSession, ScoringStatus};
use crate::trace::ScoreSubmission;

const EMPTY_TRACE_ALERT: &str = "データが記録されませんでした。もう一度お試しください。";

/// 終了した瞬間に記録が空なら警告してIdleに戻す。戻したら true。
///
/// FINISH表示を待たずに呼ぶ。
pub fn abandon_if_empty(session: &mut ScoringSession) -> bool {
    if session.status() != ScoringStatus::Finished || !session.trace().is_empty() {
        return false;
    }
    tracing::warn!("{}", EMPTY_TRACE_ALERT);
    session.reset();
    true
}

/// FINISH表示の保持時間が過ぎていれば送信する。
///
/// 成功したらスコアを返す。記録が空、または送信に失敗したら警告してIdleに戻し、None。
/// 保持時間中も None（状態はそのまま）。
pub async fn finish_session(
    session: &mut ScoringSession,
    client: &ApiClient,
    user: u64,
    challenge: u64,
    now: Instant,
) -> Option<Score> {
    if !session.ready_to_submit(now) {
        return None;
    }

    let trace = session.take_trace();
    if trace.is_empty() {
        tracing::warn!("{}", EMPTY_TRACE_ALERT);
        session.reset();
        return None;
    }

    tracing::info!(
        "送信中: {} frames ({} with pose, {:.1}s)",
        trace.len(),
        trace.detected_frames(),
        trace.span().as_secs_f32()
    );
    let submission = ScoreSubmission::new(user, challenge, trace);
    match client.submit_score(&submission).await {
        Ok(score) => Some(score),
        Err(e) => {
            tracing::warn!("スコアの送信に失敗しました: {}", e);
            session.reset();
            None
        }
    }
}
