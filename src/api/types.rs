use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 採点項目名 → 得点
pub type ChartData = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Challenge {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub has_posing: bool,
}

/// 採点結果。送信したランドマーク列（`raw_landmarks`）は読み捨てる。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Score {
    pub id: u64,
    pub user: u64,
    pub challenge: u64,
    pub overall_score: f64,
    #[serde(default)]
    pub feedback_text: Option<String>,
    #[serde(default)]
    pub chart_data: ChartData,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `scores/{id}/ranking/`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreRank {
    pub rank: u32,
    pub total_participants: u32,
}

/// `ranking/`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ranking {
    #[serde(default)]
    pub leaderboard: Vec<RankingEntry>,
    #[serde(default)]
    pub my_rank: Option<MyRank>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub user_id: u64,
    pub user_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MyRank {
    pub rank: u32,
    pub score: f64,
}

/// `scores/history/` の1件（古い順）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub score: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub chart_data: ChartData,
}

/// `scores/average_comparison/`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AverageComparison {
    #[serde(default)]
    pub user_average: Option<f64>,
    #[serde(default)]
    pub overall_average: Option<f64>,
    #[serde(default)]
    pub user_chart_data_averages: ChartData,
    #[serde(default)]
    pub overall_chart_data_averages: ChartData,
}

/// `dashboard/`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user_name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub high_score: f64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub recent_activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub overall_score: f64,
    #[serde(default)]
    pub challenge_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_ignores_raw_landmarks() {
        let json = r#"{
            "id": 12, "user": 3, "challenge": 1,
            "overall_score": 74.5,
            "feedback_text": "総合スコアは 74.5点です！",
            "chart_data": {"symmetry": 18.2, "trunk_uprightness": 15.3},
            "raw_landmarks": [[[]]],
            "created_at": "2026-10-01T09:00:00Z"
        }"#;
        let score: Score = serde_json::from_str(json).unwrap();
        assert_eq!(score.id, 12);
        assert_eq!(score.chart_data.len(), 2);
        assert_eq!(score.chart_data["symmetry"], 18.2);
    }

    #[test]
    fn test_user_extra_fields() {
        let json = r#"{"url": "http://x/api/users/3/", "id": 3, "name": "hanako", "created_at": "2026-01-01"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.name, "hanako");
    }

    #[test]
    fn test_ranking_without_my_rank() {
        let json = r#"{"leaderboard": [{"rank": 1, "user_id": 2, "user_name": "taro", "score": 88.0}], "my_rank": null}"#;
        let ranking: Ranking = serde_json::from_str(json).unwrap();
        assert_eq!(ranking.leaderboard.len(), 1);
        assert!(ranking.my_rank.is_none());
    }

    #[test]
    fn test_dashboard_camel_case() {
        let json = r#"{
            "userName": "hanako", "level": 4, "highScore": 91.5, "streak": 2,
            "recentActivities": [{"id": 9, "overall_score": 80.0}]
        }"#;
        let dashboard: Dashboard = serde_json::from_str(json).unwrap();
        assert_eq!(dashboard.user_name, "hanako");
        assert_eq!(dashboard.high_score, 91.5);
        assert_eq!(dashboard.recent_activities[0].id, 9);
    }
}
