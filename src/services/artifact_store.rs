//! 输出目录管理 - 业务能力层
//!
//! 唯一允许删除或重建输出目录和 zip 文件的组件

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::OrderIdentifier;

/// 输出目录
///
/// ```text
/// receipts_dir/{id}.pdf
/// screenshots_dir/{id}.png
/// archive_path
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    receipts_dir: PathBuf,
    screenshots_dir: PathBuf,
    archive_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(
        receipts_dir: impl Into<PathBuf>,
        screenshots_dir: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            receipts_dir: receipts_dir.into(),
            screenshots_dir: screenshots_dir.into(),
            archive_path: archive_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.receipts_dir,
            &config.screenshots_dir,
            &config.archive_path,
        )
    }

    /// 清空上一次运行留下的所有产物
    ///
    /// 重建收据和截图目录，删除已有的 zip 文件。可重复调用。
    pub fn reset(&self) -> AppResult<()> {
        info!("🗑️ 清理上次运行的输出...");

        for dir in [&self.receipts_dir, &self.screenshots_dir] {
            remove_dir_if_exists(dir)?;
            fs::create_dir_all(dir).map_err(|e| AppError::write_failed(dir, e))?;
            debug!("已重建目录: {}", dir.display());
        }

        match fs::remove_file(&self.archive_path) {
            Ok(()) => debug!("已删除旧的压缩包: {}", self.archive_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::write_failed(&self.archive_path, e)),
        }

        if let Some(parent) = self.archive_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AppError::write_failed(parent, e))?;
            }
        }

        Ok(())
    }

    pub fn receipt_path(&self, id: &OrderIdentifier) -> PathBuf {
        self.receipts_dir.join(format!("{}.pdf", id))
    }

    pub fn screenshot_path(&self, id: &OrderIdentifier) -> PathBuf {
        self.screenshots_dir.join(format!("{}.png", id))
    }

    /// 删除某个订单已写出的收据和截图，不存在的文件忽略
    pub fn discard(&self, id: &OrderIdentifier) -> AppResult<()> {
        for path in [self.receipt_path(id), self.screenshot_path(id)] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("已删除未完成的产物: {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::write_failed(&path, e)),
            }
        }
        Ok(())
    }

    pub fn receipts_dir(&self) -> &Path {
        &self.receipts_dir
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }
}

fn remove_dir_if_exists(dir: &Path) -> AppResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::write_failed(dir, e)),
    }
}

/// 把产物写入文件，失败视为致命错误
pub(crate) fn write_artifact(path: &Path, bytes: &[u8]) -> AppResult<()> {
    fs::write(path, bytes).map_err(|e| AppError::write_failed(path, e))
}
