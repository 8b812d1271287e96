//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一条订单"的完整处理流程
//!
//! 流程顺序：
//! 1. 关闭遮挡弹窗 → 填写并提交表单 → 读取订单号
//! 2. 生成 PDF 收据 → 截图 → 把截图追加到收据
//! 3. 返回下单页 → 再次检查弹窗（`return_to_form`）
//!
//! 第 2 步失败时删除该订单已写出的产物，压缩包里只会出现完整的收据。

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{OrderIdentifier, OrderRecord};
use crate::services::{ArtifactStore, FormSubmitter, ReceiptCapturer};
use crate::workflow::order_ctx::OrderCtx;

/// 单条订单的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOrder {
    pub row: usize,
    pub id: OrderIdentifier,
    pub receipt: PathBuf,
}

/// 订单处理流程
///
/// - 编排一条订单的完整处理流程
/// - 不持有浏览器资源，只依赖业务能力（services）
/// - 错误原样返回，是否跳过由编排层决定
pub struct OrderFlow<'a, F: FormSubmitter, R: ReceiptCapturer> {
    submitter: &'a F,
    capturer: &'a R,
    store: &'a ArtifactStore,
}

impl<'a, F: FormSubmitter, R: ReceiptCapturer> OrderFlow<'a, F, R> {
    pub fn new(submitter: &'a F, capturer: &'a R, store: &'a ArtifactStore) -> Self {
        Self {
            submitter,
            capturer,
            store,
        }
    }

    /// 提交订单并生成完整的收据
    ///
    /// 返回 `Ok` 时收据已包含截图页；页面仍停留在确认页。
    pub async fn run(&self, record: &OrderRecord, ctx: &OrderCtx) -> AppResult<CompletedOrder> {
        self.submitter.dismiss_obstruction().await?;

        info!("{} 📝 填写并提交表单...", ctx);
        let id = self.submitter.submit(record).await?;
        info!("{} ✓ 下单成功，订单号: {}", ctx, id);

        let receipt_path = self.store.receipt_path(&id);
        if receipt_path.exists() {
            return Err(AppError::DuplicateOrderIdentifier(id.to_string()));
        }

        let receipt = match self.capture(&id, &receipt_path).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("{} 收据生成失败，删除已写出的产物", ctx);
                self.store.discard(&id)?;
                return Err(e);
            }
        };
        info!("{} 🧾 收据已生成: {}", ctx, receipt.display());

        Ok(CompletedOrder {
            row: record.row,
            id,
            receipt,
        })
    }

    /// 从确认页返回下单表单，弹窗可能再次出现
    pub async fn return_to_form(&self) -> AppResult<()> {
        self.submitter.order_another().await?;
        self.submitter.dismiss_obstruction().await
    }

    async fn capture(&self, id: &OrderIdentifier, receipt_path: &Path) -> AppResult<PathBuf> {
        let receipt = self.capturer.capture_receipt(id, receipt_path).await?;
        let screenshot = self
            .capturer
            .capture_screenshot(id, &self.store.screenshot_path(id))
            .await?;
        self.capturer.embed(&screenshot, &receipt)?;
        Ok(receipt)
    }
}
