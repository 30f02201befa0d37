//! Currently selected user profile, persisted between runs.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::User;

/// 選択中プロフィールのファイル保存
pub struct ProfileStore {
    path: PathBuf,
    current: Option<User>,
}

impl ProfileStore {
    /// 保存ファイルを読み込む。ファイルが無ければ未選択。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let current = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let user: User = serde_json::from_str(&content)
                .with_context(|| format!("corrupt profile file {}", path.display()))?;
            Some(user)
        } else {
            None
        };
        Ok(Self { path, current })
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// 未選択ならエラー
    pub fn require(&self) -> Result<&User> {
        self.current
            .as_ref()
            .context("no profile selected; run `walkform users` and `walkform select <id>` first")
    }

    pub fn set(&mut self, user: User) -> Result<()> {
        let content = serde_json::to_string_pretty(&user)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!("profile selected: {} (id={})", user.name, user.id);
        self.current = Some(user);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        self.current = None;
        Ok(())
    }
}
