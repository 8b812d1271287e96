//! 警告写入服务 - 业务能力层
//!
//! 只负责"把跳过的订单写入 warn 文件"，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 警告写入服务
///
/// 每条被跳过的订单追加一行，便于事后人工补单
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.warn_file_path
    }

    /// 清空上一次运行的记录
    pub fn truncate(&self) -> AppResult<()> {
        if let Some(parent) = self.warn_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AppError::write_failed(parent, e))?;
            }
        }
        std::fs::write(&self.warn_file_path, b"")
            .map_err(|e| AppError::write_failed(&self.warn_file_path, e))
    }

    /// 写入一条跳过记录
    ///
    /// # 参数
    /// - `row`: CSV 行号
    /// - `label`: 订单标签
    /// - `reason`: 跳过原因
    pub fn write(&self, row: usize, label: &str, reason: &str) -> AppResult<()> {
        debug!("写入警告: 行 {} | {} | {}", row, label, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .map_err(|e| AppError::write_failed(&self.warn_file_path, e))?;

        let warn_msg = format!("行 {} | 订单 {} | 原因: {}\n", row, label, reason);

        file.write_all(warn_msg.as_bytes())
            .map_err(|e| AppError::write_failed(&self.warn_file_path, e))?;

        Ok(())
    }
}
