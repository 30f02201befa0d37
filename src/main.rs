use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use walkform::api::{ApiClient, Challenge, Score, User};
use walkform::config::Config;
use walkform::logging;
use walkform::profile::ProfileStore;
use walkform::report::{
    chart_rows, round1, split_podium, GrowthSummary, ResultSummary, ITEM_FULL_MARK,
};

const CONFIG_PATH: &str = "config.toml";

/// 棒グラフの幅（満点時の文字数）
const BAR_WIDTH: usize = 20;

#[derive(Parser)]
#[command(name = "walkform", version = env!("GIT_VERSION"), about = "歩行フォーム採点クライアント")]
struct Cli {
    /// 設定ファイル
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// ユーザー一覧
    Users {
        /// 名前の部分一致（大文字小文字を区別しない）
        #[arg(long)]
        search: Option<String>,
    },
    /// ユーザーを作成して選択
    UserCreate { name: String },
    /// ユーザーを選択
    Select { id: u64 },
    /// 選択中のユーザー
    Whoami,
    /// 選択を解除
    Logout,
    /// ダッシュボード
    Dashboard,
    /// チャレンジ一覧
    Challenges,
    /// カメラで採点して送信
    #[cfg(feature = "desktop")]
    Score { challenge_id: u64 },
    /// 採点結果
    Result { score_id: u64 },
    /// ランキング（省略時は最初のチャレンジ）
    Ranking { challenge_id: Option<u64> },
    /// 成長レポート（省略時は最初のチャレンジ）
    Report { challenge_id: Option<u64> },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let client = ApiClient::from_config(&config.api)?;
    let mut profile = ProfileStore::open(&config.profile.path)?;

    match cli.command {
        Command::Users { search } => show_users(&client, search.as_deref()).await,
        Command::UserCreate { name } => {
            let user = client.create_user(&name).await?;
            println!("ユーザーを作成しました: {} (ID: {})", user.name, user.id);
            profile.set(user)
        }
        Command::Select { id } => {
            let user = client.get_user(id).await.map_err(|e| {
                if e.is_not_found() {
                    anyhow::anyhow!("user {} not found", id)
                } else {
                    e.into()
                }
            })?;
            println!("{} さんを選択しました", user.name);
            profile.set(user)
        }
        Command::Whoami => {
            match profile.current() {
                Some(user) => println!("{} (ID: {})", user.name, user.id),
                None => println!("ユーザーが選択されていません"),
            }
            Ok(())
        }
        Command::Logout => {
            profile.clear()?;
            println!("ユーザーの選択を解除しました");
            Ok(())
        }
        Command::Dashboard => show_dashboard(&client, profile.require()?).await,
        Command::Challenges => show_challenges(&client).await,
        #[cfg(feature = "desktop")]
        Command::Score { challenge_id } => {
            let user = profile.require()?.clone();
            run_score(&config, &client, &user, challenge_id).await
        }
        Command::Result { score_id } => {
            let score = client.get_score(score_id).await?;
            show_result(&client, &score).await;
            Ok(())
        }
        Command::Ranking { challenge_id } => {
            let user = profile.require()?;
            let challenge = resolve_challenge(&client, challenge_id).await?;
            show_ranking(&client, user, &challenge).await
        }
        Command::Report { challenge_id } => {
            let user = profile.require()?;
            let challenge = resolve_challenge(&client, challenge_id).await?;
            show_report(&client, user, &challenge).await
        }
    }
}

/// 指定が無ければ一覧の先頭
async fn resolve_challenge(client: &ApiClient, id: Option<u64>) -> Result<Challenge> {
    match id {
        Some(id) => Ok(client.get_challenge(id).await?),
        None => {
            let challenges = client.list_challenges().await?;
            match challenges.into_iter().next() {
                Some(c) => Ok(c),
                None => bail!("no challenges available"),
            }
        }
    }
}

fn filter_users<'a>(users: &'a [User], search: Option<&str>) -> Vec<&'a User> {
    let term = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    users
        .iter()
        .filter(|u| term.is_empty() || u.name.to_lowercase().contains(&term))
        .collect()
}

fn bar(value: f64, full: f64) -> String {
    let ratio = if full > 0.0 { (value / full).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

async fn show_users(client: &ApiClient, search: Option<&str>) -> Result<()> {
    let users = client.list_users().await?;
    let matched = filter_users(&users, search);
    if matched.is_empty() {
        println!("該当するユーザーがいません");
        return Ok(());
    }
    println!("=== ユーザー一覧 ===");
    for user in matched {
        println!("  [{}] {}", user.id, user.name);
    }
    println!();
    println!("`walkform select <ID>` で選択、`walkform user-create <NAME>` で新規作成");
    Ok(())
}

async fn show_dashboard(client: &ApiClient, user: &User) -> Result<()> {
    let dashboard = client.dashboard(user.id).await?;
    println!("こんにちは、{} さん", dashboard.user_name);
    println!("  レベル:       {}", dashboard.level);
    println!("  ハイスコア:   {:.1}", dashboard.high_score);
    println!("  連続日数:     {} 日", dashboard.streak);
    println!();
    println!("=== 最近のアクティビティ ===");
    if dashboard.recent_activities.is_empty() {
        println!("  まだ記録がありません");
    }
    for activity in &dashboard.recent_activities {
        println!(
            "  #{:<5} {:<20} {:>6.1}  {}",
            activity.id,
            activity.challenge_name.as_deref().unwrap_or("-"),
            activity.overall_score,
            activity.created_at.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn show_challenges(client: &ApiClient) -> Result<()> {
    let challenges = client.list_challenges().await?;
    println!("=== チャレンジ一覧 ===");
    for c in &challenges {
        println!("  [{}] {}", c.id, c.name);
        if !c.description.is_empty() {
            println!("      {}", c.description);
        }
    }
    Ok(())
}

/// 結果画面。比較データの取得に失敗しても採点結果は表示する。
async fn show_result(client: &ApiClient, score: &Score) {
    let summary = match tokio::try_join!(
        client.list_scores(score.user, score.challenge),
        client.score_rank(score.id)
    ) {
        Ok((past, rank)) => ResultSummary::new(score, &past, rank),
        Err(e) => {
            tracing::warn!("failed to fetch comparison data: {}", e);
            ResultSummary::fallback()
        }
    };

    println!("=== 採点結果 ===");
    println!("  総合スコア: {:.1}", score.overall_score);
    if summary.is_best {
        println!("  自己ベスト更新！（これまで: {:.1}）", summary.personal_best);
    } else {
        println!("  自己ベスト: {:.1}", summary.personal_best);
    }
    println!("  順位: {} 位 / {} 人中", summary.rank, summary.total_participants);
    println!();
    for (label, value) in chart_rows(&score.chart_data) {
        println!("  {:<14} {} {:>5.1}", label, bar(value, ITEM_FULL_MARK), value);
    }
    if let Some(feedback) = score.feedback_text.as_deref().filter(|f| !f.is_empty()) {
        println!();
        println!("{}", feedback);
    }
}

async fn show_ranking(client: &ApiClient, user: &User, challenge: &Challenge) -> Result<()> {
    let ranking = client.ranking(challenge.id, user.id).await?;
    println!("=== ランキング: {} ===", challenge.name);
    if ranking.leaderboard.is_empty() {
        println!("  まだ記録がありません");
    }
    let (podium, rest) = split_podium(&ranking.leaderboard);
    for entry in podium {
        let medal = match entry.rank {
            1 => "🥇",
            2 => "🥈",
            _ => "🥉",
        };
        println!("  {} {:<16} {:>6.1}", medal, entry.user_name, entry.score);
    }
    for entry in rest {
        println!("  {:>2}. {:<16} {:>6.1}", entry.rank, entry.user_name, entry.score);
    }
    println!();
    match ranking.my_rank {
        Some(mine) => println!("  あなたの順位: {} 位 ({:.1})", mine.rank, mine.score),
        None => println!("  あなたの記録はまだありません"),
    }
    Ok(())
}

async fn show_report(client: &ApiClient, user: &User, challenge: &Challenge) -> Result<()> {
    let (history, averages) = tokio::try_join!(
        client.score_history(user.id, challenge.id),
        client.average_comparison(user.id, challenge.id)
    )?;

    println!("=== 成長レポート: {} ===", challenge.name);
    let Some(growth) = GrowthSummary::new(&history, &averages) else {
        println!("  まだ記録がありません");
        return Ok(());
    };

    println!("  あなたの平均: {:.1}", round1(growth.your_average));
    println!("  全体の平均:   {:.1}", round1(growth.overall_average));
    println!("  ベスト:       {:.1}", growth.best);
    println!("  挑戦回数:     {}", growth.attempts);
    println!("  前回との差:   {:+.1}", growth.latest_diff);
    println!("  初回からの伸び: {:+.1}", growth.total_growth);
    if let Some(item) = &growth.best_item {
        println!("  得意な項目:   {}", item);
    }
    if let Some(item) = &growth.worst_item {
        println!("  苦手な項目:   {}", item);
    }
    println!();
    println!("  {:<14} {:>6} {:>6}", "項目", "あなた", "全体");
    for (label, yours, overall) in &growth.items {
        println!("  {:<14} {:>6.1} {:>6.1}", label, yours, overall);
    }
    println!();
    println!("=== スコア推移 ===");
    for (i, entry) in history.iter().enumerate() {
        println!(
            "  {:>3}. {} {:>5.1}  {}",
            i + 1,
            bar(entry.score, 100.0),
            entry.score,
            entry.created_at.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

#[cfg(feature = "desktop")]
async fn run_score(config: &Config, client: &ApiClient, user: &User, challenge_id: u64) -> Result<()> {
    let challenge = client.get_challenge(challenge_id).await?;
    let handle = tokio::runtime::Handle::current();

    let score = tokio::task::block_in_place(|| {
        walkform::scoring::run_scoring(config, client, user, &challenge, &handle)
    })?;

    match score {
        Some(score) => show_result(client, &score).await,
        None => println!("採点を中断しました"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_filter_users_case_insensitive() {
        let users = vec![user(1, "Taro"), user(2, "hanako"), user(3, "TARO2")];
        let matched: Vec<u64> = filter_users(&users, Some("taro")).iter().map(|u| u.id).collect();
        assert_eq!(matched, vec![1, 3]);
    }

    #[test]
    fn test_filter_users_empty_term() {
        let users = vec![user(1, "Taro"), user(2, "hanako")];
        assert_eq!(filter_users(&users, None).len(), 2);
        assert_eq!(filter_users(&users, Some("  ")).len(), 2);
    }

    #[test]
    fn test_bar_clamped() {
        assert_eq!(bar(10.0, 20.0).chars().filter(|c| *c == '█').count(), 10);
        assert_eq!(bar(30.0, 20.0).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(bar(-1.0, 20.0).chars().filter(|c| *c == '█').count(), 0);
    }

    #[test]
    fn test_cli_parses_optional_challenge() {
        let cli = Cli::try_parse_from(["walkform", "ranking"]).unwrap();
        assert!(matches!(cli.command, Command::Ranking { challenge_id: None }));
        let cli = Cli::try_parse_from(["walkform", "report", "2"]).unwrap();
        assert!(matches!(cli.command, Command::Report { challenge_id: Some(2) }));
    }
}
