//! 应用程序错误类型
//!
//! 错误分为两类：
//! - 单条订单内可恢复的错误（跳过该订单，继续处理下一条）
//! - 整次运行致命的错误（停止循环）
//!
//! 分类规则集中在 [`AppError::is_record_local`]。

use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 订单 CSV 无法获取（网络 / HTTP 状态 / 本地文件不可读）
    #[error("订单数据源不可用 ({url}): {reason}")]
    SourceUnavailable { url: String, reason: String },

    /// CSV 中某一行缺少必填字段
    #[error("第 {row} 行订单数据不完整: 缺少字段 {field}")]
    MalformedRecord { row: usize, field: String },

    /// 提交后校验错误提示反复出现，重试次数耗尽
    #[error("订单提交被拒绝，已尝试 {attempts} 次")]
    FormValidationRejected { attempts: u32 },

    /// 页面缺少预期的控件（站点结构发生变化）
    #[error("页面结构不匹配 ({selector}): {detail}")]
    StructuralMismatch { selector: String, detail: String },

    /// 浏览器操作超时
    #[error("浏览器操作超时: {action} ({selector}), 超过 {timeout_ms} ms")]
    ActionTimeout {
        action: String,
        selector: String,
        timeout_ms: u64,
    },

    /// 同一次运行中出现重复的订单号
    #[error("订单号重复: {0}")]
    DuplicateOrderIdentifier(String),

    /// 生成或合并 PDF 失败
    #[error("PDF 处理失败 ({path}): {detail}")]
    PdfComposition { path: PathBuf, detail: String },

    /// 输出路径不可写
    #[error("写入输出文件失败 ({path}): {source}")]
    ArtifactWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 打包 zip 失败
    #[error("打包收据失败 ({path}): {detail}")]
    ArchiveFailure { path: PathBuf, detail: String },

    /// 浏览器会话级错误
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 配置错误
    #[error("配置错误 {key}: {detail}")]
    Config { key: String, detail: String },
}

impl AppError {
    /// 该错误是否只影响当前订单
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            AppError::MalformedRecord { .. }
                | AppError::FormValidationRejected { .. }
                | AppError::StructuralMismatch { .. }
                | AppError::ActionTimeout { .. }
                | AppError::DuplicateOrderIdentifier(_)
                | AppError::PdfComposition { .. }
        )
    }

    /// 创建输出写入错误
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::ArtifactWriteFailure {
            path: path.into(),
            source,
        }
    }

    /// 创建页面结构不匹配错误
    pub fn missing_control(selector: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::StructuralMismatch {
            selector: selector.into(),
            detail: detail.into(),
        }
    }

    /// 创建 PDF 处理错误
    pub fn pdf_failed(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        AppError::PdfComposition {
            path: path.into(),
            detail: detail.to_string(),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(format!("无法解析脚本返回值: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config {
            key: "SELECTORS_FILE".to_string(),
            detail: err.to_string(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
