//! 订单数据源 - 业务能力层
//!
//! 只负责"拿到订单列表"，不关心订单如何提交

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_orders_csv, OrderRecord};

/// 订单数据源
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// 获取原始数据，返回本地副本路径（每次覆盖）
    async fn fetch(&self) -> AppResult<PathBuf>;

    /// 按原始顺序解析订单，每一行单独成功或失败
    fn parse(&self, file: &Path) -> AppResult<Vec<AppResult<OrderRecord>>>;
}

/// 通过 HTTP 下载 CSV 的数据源
pub struct HttpOrderSource {
    client: reqwest::Client,
    csv_url: String,
    local_path: PathBuf,
}

impl HttpOrderSource {
    pub fn new(csv_url: impl Into<String>, local_path: impl Into<PathBuf>, http_timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| AppError::Config {
                key: "HTTP_TIMEOUT_MS".to_string(),
                detail: e.to_string(),
            })?;

        Ok(Self {
            client,
            csv_url: csv_url.into(),
            local_path: local_path.into(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(&config.csv_url, &config.local_csv_path, config.http_timeout())
    }

    fn unavailable(&self, reason: impl ToString) -> AppError {
        AppError::SourceUnavailable {
            url: self.csv_url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch(&self) -> AppResult<PathBuf> {
        info!("📥 正在下载订单数据: {}", self.csv_url);

        let response = self
            .client
            .get(&self.csv_url)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?
            .error_for_status()
            .map_err(|e| self.unavailable(e))?;

        let bytes = response.bytes().await.map_err(|e| self.unavailable(e))?;
        debug!("下载完成，共 {} 字节", bytes.len());

        if let Some(parent) = self.local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::write_failed(parent, e))?;
            }
        }
        tokio::fs::write(&self.local_path, &bytes)
            .await
            .map_err(|e| AppError::write_failed(&self.local_path, e))?;

        info!("✓ 订单数据已保存至: {}", self.local_path.display());
        Ok(self.local_path.clone())
    }

    fn parse(&self, file: &Path) -> AppResult<Vec<AppResult<OrderRecord>>> {
        load_orders_csv(file)
    }
}
