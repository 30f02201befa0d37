use thiserror::Error;

/// Errors returned by the backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL could not be parsed.
    #[error("invalid base url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, timeout or other transport failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

const MAX_DETAIL_LEN: usize = 200;

/// エラーレスポンス本文から表示用メッセージを取り出す
///
/// `{"detail": "..."}` を優先し、フィールド別のバリデーションエラー
/// (`{"name": ["..."]}`) は `name: ...` の形に平坦化する。
pub fn extract_detail(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return truncate(trimmed);
    };

    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_string();
    }

    if let Some(map) = value.as_object() {
        let parts: Vec<String> = map
            .iter()
            .map(|(field, messages)| {
                let text = match messages {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                        .collect::<Vec<_>>()
                        .join(" "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}: {}", field, text)
            })
            .collect();
        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    truncate(trimmed)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_DETAIL_LEN).collect();
    out.push('…');
    out
}
