use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// バックエンドAPIのベースURL（末尾の `/` は任意）
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: i32,
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// ランドマークモデル（ONNX）のパス
    #[serde(default = "default_model_path")]
    pub path: String,
    /// 入力解像度（正方形）
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    /// 人物存在スコアの出力名（モデルに無ければ判定しない）
    #[serde(default = "default_presence_name")]
    pub presence_name: String,
    /// 人物存在スコアの閾値
    #[serde(default = "default_presence_threshold")]
    pub presence_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// カウントダウン秒数（"3", "2", "1"）
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    /// "START!" 表示時間（ミリ秒）
    #[serde(default = "default_start_hold_ms")]
    pub start_hold_ms: u64,
    /// 採点時間（ミリ秒）
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// "FINISH" 表示から送信までの待ち時間（ミリ秒）
    #[serde(default = "default_finish_hold_ms")]
    pub finish_hold_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// ランドマークを有効とみなすvisibility閾値
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// 歩数判定に必要な足首高さの最小落ち込み量（正規化座標）
    #[serde(default = "default_step_min_drop")]
    pub step_min_drop: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    /// 選択中プロフィールの保存先
    #[serde(default = "default_profile_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    /// 鏡像表示
    #[serde(default = "default_mirror")]
    pub mirror: bool,
    /// 描画時の信頼度閾値
    #[serde(default = "default_visibility_threshold")]
    pub confidence_threshold: f32,
}

fn default_base_url() -> String { "http://127.0.0.1:8000/api".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_camera_width() -> u32 { 640 }
fn default_camera_height() -> u32 { 480 }
fn default_model_path() -> String { "models/pose_landmark_lite.onnx".to_string() }
fn default_input_size() -> u32 { 256 }
fn default_input_name() -> String { "input_1".to_string() }
fn default_output_name() -> String { "Identity".to_string() }
fn default_presence_name() -> String { "Identity_1".to_string() }
fn default_presence_threshold() -> f32 { 0.5 }
fn default_countdown_secs() -> u32 { 3 }
fn default_start_hold_ms() -> u64 { 500 }
fn default_duration_ms() -> u64 { 10_000 }
fn default_finish_hold_ms() -> u64 { 1_000 }
fn default_visibility_threshold() -> f32 { 0.5 }
fn default_step_min_drop() -> f32 { 0.005 }
fn default_profile_path() -> String { "profile.json".to_string() }
fn default_mirror() -> bool { true }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_width(),
            height: default_camera_height(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            input_size: default_input_size(),
            input_name: default_input_name(),
            output_name: default_output_name(),
            presence_name: default_presence_name(),
            presence_threshold: default_presence_threshold(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            start_hold_ms: default_start_hold_ms(),
            duration_ms: default_duration_ms(),
            finish_hold_ms: default_finish_hold_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
            step_min_drop: default_step_min_drop(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self { path: default_profile_path() }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mirror: default_mirror(),
            confidence_threshold: default_visibility_threshold(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// ファイルが無ければデフォルト設定。壊れたファイルはエラーにする。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
