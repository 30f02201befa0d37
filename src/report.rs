//! Display-side computations for the result, ranking and growth views.
//!
//! Everything here is pure: the CLI fetches, these functions summarize.

use crate::api::{AverageComparison, ChartData, HistoryEntry, RankingEntry, Score, ScoreRank};

/// 採点項目1つあたりの満点
pub const ITEM_FULL_MARK: f64 = 20.0;

/// 採点項目の表示名
pub fn item_label(key: &str) -> &str {
    match key {
        "symmetry" => "左右の対称性",
        "trunk_uprightness" => "体幹の直立性",
        "gravity_stability" => "重心の安定性",
        "rhythmic_accuracy" => "リズムの正確性",
        "movement_smoothness" => "動作の滑らかさ",
        "walking_speed" => "歩行速度",
        other => other,
    }
}

/// 結果画面の集計
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    /// 今回を除いた自己ベスト（過去スコアが無ければ0）
    pub personal_best: f64,
    pub is_best: bool,
    pub rank: u32,
    pub total_participants: u32,
}

impl ResultSummary {
    pub fn new(score: &Score, past_scores: &[Score], rank: ScoreRank) -> Self {
        let personal_best = past_scores
            .iter()
            .filter(|s| s.id != score.id)
            .fold(0.0_f64, |best, s| best.max(s.overall_score));
        Self {
            personal_best,
            is_best: score.overall_score > personal_best,
            rank: rank.rank,
            total_participants: rank.total_participants,
        }
    }

    /// 比較データが取れなかったときの表示
    pub fn fallback() -> Self {
        Self {
            personal_best: 0.0,
            is_best: true,
            rank: 1,
            total_participants: 1,
        }
    }
}

/// 項目を (表示名, 得点) の並びに
pub fn chart_rows(chart: &ChartData) -> Vec<(String, f64)> {
    chart
        .iter()
        .map(|(key, value)| (item_label(key).to_string(), *value))
        .collect()
}

/// リーダーボードを表彰台（上位3名）と残りに分ける
pub fn split_podium(leaderboard: &[RankingEntry]) -> (&[RankingEntry], &[RankingEntry]) {
    leaderboard.split_at(leaderboard.len().min(3))
}

/// 成長レポートの集計
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthSummary {
    pub your_average: f64,
    pub overall_average: f64,
    pub best: f64,
    pub attempts: usize,
    /// 直近2回の差
    pub latest_diff: f64,
    /// 初回から最新までの差
    pub total_growth: f64,
    pub best_item: Option<String>,
    pub worst_item: Option<String>,
    /// (項目名, あなた, 全体平均)
    pub items: Vec<(String, f64, f64)>,
}

impl GrowthSummary {
    /// 履歴が空ならNone
    pub fn new(history: &[HistoryEntry], averages: &AverageComparison) -> Option<Self> {
        let first = history.first()?;
        let last = history.last()?;
        let attempts = history.len();

        let best = history
            .iter()
            .map(|h| h.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let latest_diff = if attempts > 1 {
            last.score - history[attempts - 2].score
        } else {
            0.0
        };

        let user_avgs = &averages.user_chart_data_averages;
        // 同点は後に出た項目（キー順）を優先
        let best_item = user_avgs
            .iter()
            .fold(None::<(&String, f64)>, |acc, (k, v)| match acc {
                Some((_, best)) if best > *v => acc,
                _ => Some((k, *v)),
            })
            .map(|(k, _)| item_label(k).to_string());
        let worst_item = user_avgs
            .iter()
            .fold(None::<(&String, f64)>, |acc, (k, v)| match acc {
                Some((_, worst)) if worst < *v => acc,
                _ => Some((k, *v)),
            })
            .map(|(k, _)| item_label(k).to_string());

        let items = user_avgs
            .keys()
            .chain(averages.overall_chart_data_averages.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .map(|key| {
                (
                    item_label(key).to_string(),
                    user_avgs.get(key).copied().unwrap_or(0.0),
                    averages.overall_chart_data_averages.get(key).copied().unwrap_or(0.0),
                )
            })
            .collect();

        Some(Self {
            your_average: averages.user_average.unwrap_or(0.0),
            overall_average: averages.overall_average.unwrap_or(0.0),
            best,
            attempts,
            latest_diff: round1(latest_diff),
            total_growth: round1(last.score - first.score),
            best_item,
            worst_item,
            items,
        })
    }
}

/// 小数第1位に丸める
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(id: u64, overall: f64) -> Score {
        Score {
            id,
            user: 1,
            challenge: 1,
            overall_score: overall,
            feedback_text: None,
            chart_data: ChartData::new(),
            created_at: None,
        }
    }

    fn history(scores: &[f64]) -> Vec<HistoryEntry> {
        scores
            .iter()
            .map(|s| HistoryEntry {
                score: *s,
                created_at: None,
                chart_data: ChartData::new(),
            })
            .collect()
    }

    #[test]
    fn test_result_new_best() {
        let current = score(10, 80.0);
        let past = vec![score(10, 80.0), score(7, 75.0), score(4, 60.0)];
        let summary = ResultSummary::new(&current, &past, ScoreRank { rank: 2, total_participants: 5 });
        assert_eq!(summary.personal_best, 75.0);
        assert!(summary.is_best);
        assert_eq!(summary.rank, 2);
    }

    #[test]
    fn test_result_for_older_score() {
        // 古いスコアを見たときは、それより新しいスコアも比較対象
        let viewed = score(7, 75.0);
        let past = vec![score(12, 90.0), score(10, 80.0), score(7, 75.0)];
        let summary = ResultSummary::new(&viewed, &past, ScoreRank { rank: 4, total_participants: 6 });
        assert_eq!(summary.personal_best, 90.0);
        assert!(!summary.is_best);
    }

    #[test]
    fn test_result_not_best() {
        let current = score(10, 70.0);
        let past = vec![score(10, 70.0), score(7, 75.0)];
        let summary = ResultSummary::new(&current, &past, ScoreRank { rank: 3, total_participants: 3 });
        assert!(!summary.is_best);
    }

    #[test]
    fn test_result_first_attempt() {
        let current = score(1, 42.0);
        let summary = ResultSummary::new(&current, &[score(1, 42.0)], ScoreRank { rank: 1, total_participants: 1 });
        assert_eq!(summary.personal_best, 0.0);
        assert!(summary.is_best);
    }

    #[test]
    fn test_split_podium() {
        let entries: Vec<RankingEntry> = (1..=5)
            .map(|i| RankingEntry {
                rank: i,
                user_id: i as u64,
                user_name: format!("user{}", i),
                score: 100.0 - i as f64,
            })
            .collect();
        let (podium, rest) = split_podium(&entries);
        assert_eq!(podium.len(), 3);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].rank, 4);

        let (podium, rest) = split_podium(&entries[..2]);
        assert_eq!(podium.len(), 2);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_growth_summary() {
        let mut averages = AverageComparison {
            user_average: Some(71.23),
            overall_average: Some(65.0),
            ..AverageComparison::default()
        };
        averages.user_chart_data_averages.insert("symmetry".into(), 18.0);
        averages.user_chart_data_averages.insert("trunk_uprightness".into(), 12.5);
        averages.overall_chart_data_averages.insert("symmetry".into(), 15.0);
        averages.overall_chart_data_averages.insert("walking_speed".into(), 14.0);

        let summary = GrowthSummary::new(&history(&[60.0, 72.3, 70.1]), &averages).unwrap();
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.best, 72.3);
        assert_eq!(summary.latest_diff, -2.2);
        assert_eq!(summary.total_growth, 10.1);
        assert_eq!(summary.best_item.as_deref(), Some("左右の対称性"));
        assert_eq!(summary.worst_item.as_deref(), Some("体幹の直立性"));
        assert_eq!(summary.items.len(), 3);
        assert!(summary
            .items
            .iter()
            .any(|(name, you, all)| name == "歩行速度" && *you == 0.0 && *all == 14.0));
    }

    #[test]
    fn test_growth_item_ties_prefer_later_key() {
        let mut averages = AverageComparison::default();
        for (key, value) in [
            ("gravity_stability", 10.0),
            ("rhythmic_accuracy", 10.0),
            ("symmetry", 15.0),
            ("walking_speed", 15.0),
        ] {
            averages.user_chart_data_averages.insert(key.into(), value);
        }
        let summary = GrowthSummary::new(&history(&[50.0]), &averages).unwrap();
        assert_eq!(summary.best_item.as_deref(), Some("歩行速度"));
        assert_eq!(summary.worst_item.as_deref(), Some("リズムの正確性"));
    }

    #[test]
    fn test_growth_single_attempt() {
        let summary = GrowthSummary::new(&history(&[55.0]), &AverageComparison::default()).unwrap();
        assert_eq!(summary.latest_diff, 0.0);
        assert_eq!(summary.total_growth, 0.0);
        assert!(summary.best_item.is_none());
        assert_eq!(summary.your_average, 0.0);
    }

    #[test]
    fn test_growth_empty_history() {
        assert!(GrowthSummary::new(&[], &AverageComparison::default()).is_none());
    }

    #[test]
    fn test_unknown_label_passthrough() {
        assert_eq!(item_label("cadence"), "cadence");
        assert_eq!(item_label("symmetry"), "左右の対称性");
    }
}
