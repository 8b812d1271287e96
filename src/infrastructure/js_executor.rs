//! JS 执行器 - 基础设施层
//!
//! 持有下单页面的 page 资源，只暴露"执行 JS"的能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::timeout;

use crate::error::{AppError, AppResult};

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力，每次调用都受超时约束
/// - 不认识订单 / 收据
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
    action_timeout: Duration,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page, action_timeout: Duration) -> Self {
        Self {
            page,
            action_timeout,
        }
    }

    /// 获取 page 的引用（用于截图、导航等非脚本操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let js_code = js_code.into();
        let result = timeout(self.action_timeout, self.page.evaluate(js_code))
            .await
            .map_err(|_| AppError::ActionTimeout {
                action: "evaluate".to_string(),
                selector: String::new(),
                timeout_ms: self.action_timeout.as_millis() as u64,
            })??;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}
