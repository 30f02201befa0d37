use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::{extract_detail, ApiError};
use super::types::{
    AverageComparison, Challenge, Dashboard, HistoryEntry, Ranking, Score, ScoreRank, User,
};
use crate::config::ApiConfig;
use crate::trace::ScoreSubmission;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// 採点バックエンドのRESTクライアント
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

#[derive(Serialize)]
struct NewUser<'a> {
    name: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// ベースURLにパス（末尾 `/` 付き）を連結
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get("users/", &[]).await
    }

    pub async fn get_user(&self, id: u64) -> ApiResult<User> {
        self.get(&format!("users/{}/", id), &[]).await
    }

    /// 名前は前後の空白を除去。空なら送信せずにエラー。
    pub async fn create_user(&self, name: &str) -> ApiResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidRequest("name must not be empty".to_string()));
        }
        self.post("users/", &NewUser { name }).await
    }

    pub async fn list_challenges(&self) -> ApiResult<Vec<Challenge>> {
        self.get("challenges/", &[]).await
    }

    pub async fn get_challenge(&self, id: u64) -> ApiResult<Challenge> {
        self.get(&format!("challenges/{}/", id), &[]).await
    }

    pub async fn submit_score(&self, submission: &ScoreSubmission) -> ApiResult<Score> {
        self.post("score/", submission).await
    }

    pub async fn get_score(&self, id: u64) -> ApiResult<Score> {
        self.get(&format!("scores/{}/", id), &[]).await
    }

    /// ユーザー×チャレンジの過去スコア（新しい順）
    pub async fn list_scores(&self, user: u64, challenge: u64) -> ApiResult<Vec<Score>> {
        self.get("scores/", &[("user", user), ("challenge", challenge)]).await
    }

    pub async fn score_rank(&self, score_id: u64) -> ApiResult<ScoreRank> {
        self.get(&format!("scores/{}/ranking/", score_id), &[]).await
    }

    pub async fn ranking(&self, challenge: u64, user: u64) -> ApiResult<Ranking> {
        self.get("ranking/", &[("challenge", challenge), ("user", user)]).await
    }

    pub async fn score_history(&self, user: u64, challenge: u64) -> ApiResult<Vec<HistoryEntry>> {
        self.get("scores/history/", &[("user", user), ("challenge", challenge)]).await
    }

    pub async fn average_comparison(&self, user: u64, challenge: u64) -> ApiResult<AverageComparison> {
        self.get("scores/average_comparison/", &[("user", user), ("challenge", challenge)])
            .await
    }

    pub async fn dashboard(&self, user: u64) -> ApiResult<Dashboard> {
        self.get("dashboard/", &[("user", user)]).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, u64)]) -> ApiResult<T> {
        let url = self.endpoint(path);
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.http.get(&url).query(query).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(&text),
        });
    }
    Ok(serde_json::from_str(&text)?)
}
