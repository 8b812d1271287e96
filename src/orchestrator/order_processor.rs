//! 订单批处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **清理输出**：运行前重置输出目录
//! 2. **加载订单**：下载并解析 CSV
//! 3. **遍历订单**：逐条委托 `OrderFlow`，单条失败只跳过该订单
//! 4. **打包收据**：循环结束后（包括致命错误中止时）生成 zip
//! 5. **统计输出**：汇总成功 / 跳过数量

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::OrderRecord;
use crate::services::{
    ArchiveFinalizer, ArtifactStore, FormSubmitter, OrderSource, ReceiptCapturer, WarnWriter,
};
use crate::utils::logging::{log_order_start, log_orders_loaded};
use crate::workflow::{CompletedOrder, OrderCtx, OrderFlow};

/// 被跳过的订单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOrder {
    pub row: usize,
    pub reason: String,
}

/// 一次运行的统计
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// CSV 中的订单行数（含无效行）
    pub total: usize,
    pub completed: Vec<CompletedOrder>,
    pub skipped: Vec<SkippedOrder>,
    /// 压缩包中的收据数量
    pub archived: usize,
    pub archive_path: PathBuf,
}

impl RunSummary {
    /// 是否所有订单都已完成并打包
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.completed.len() == self.total && self.archived == self.total
    }
}

/// 订单处理管线
pub struct OrderPipeline<S, F, R, A>
where
    S: OrderSource,
    F: FormSubmitter,
    R: ReceiptCapturer,
    A: ArchiveFinalizer,
{
    source: S,
    submitter: F,
    capturer: R,
    finalizer: A,
    store: ArtifactStore,
    warn_writer: Option<WarnWriter>,
    archive_on_abort: bool,
}

impl<S, F, R, A> OrderPipeline<S, F, R, A>
where
    S: OrderSource,
    F: FormSubmitter,
    R: ReceiptCapturer,
    A: ArchiveFinalizer,
{
    pub fn new(source: S, submitter: F, capturer: R, finalizer: A, store: ArtifactStore) -> Self {
        Self {
            source,
            submitter,
            capturer,
            finalizer,
            store,
            warn_writer: None,
            archive_on_abort: true,
        }
    }

    /// 把跳过的订单记录到文件
    pub fn with_warn_writer(mut self, warn_writer: WarnWriter) -> Self {
        self.warn_writer = Some(warn_writer);
        self
    }

    /// 致命错误中止时是否仍然打包已有收据
    pub fn archive_on_abort(mut self, enabled: bool) -> Self {
        self.archive_on_abort = enabled;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// 执行一次完整运行
    pub async fn run(&self) -> AppResult<RunSummary> {
        self.store.reset()?;
        if let Some(writer) = &self.warn_writer {
            writer.truncate()?;
        }

        let csv_path = self.source.fetch().await?;
        let rows = self.source.parse(&csv_path)?;

        let mut summary = RunSummary {
            total: rows.len(),
            archive_path: self.store.archive_path().to_path_buf(),
            ..Default::default()
        };
        log_orders_loaded(rows.len(), rows.iter().filter(|r| r.is_ok()).count());

        match self.process_rows(rows, &mut summary).await {
            Ok(()) => {
                summary.archived = self.finalize()?;
                Ok(summary)
            }
            Err(fatal) => {
                error!("❌ 运行中止: {}", fatal);
                if self.archive_on_abort {
                    match self.finalize() {
                        Ok(count) => {
                            warn!("⚠️ 已将中止前完成的 {} 份收据打包", count);
                        }
                        Err(e) => error!("打包已有收据失败: {}", e),
                    }
                }
                Err(fatal)
            }
        }
    }

    /// 逐条处理订单，只有致命错误会提前返回
    async fn process_rows(
        &self,
        rows: Vec<AppResult<OrderRecord>>,
        summary: &mut RunSummary,
    ) -> AppResult<()> {
        let total = rows.len();
        let flow = OrderFlow::new(&self.submitter, &self.capturer, &self.store);

        self.submitter.open_form().await?;

        for (index, row) in rows.into_iter().enumerate() {
            let position = index + 1;

            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    let row_number = match &e {
                        AppError::MalformedRecord { row, .. } => *row,
                        _ => position,
                    };
                    warn!("[订单 {}/{}] ⚠️ 跳过无效数据: {}", position, total, e);
                    self.skip(summary, row_number, &format!("第 {} 行", row_number), &e)?;
                    continue;
                }
            };

            let ctx = OrderCtx::new(record.row, position, total, record.label());
            log_order_start(&ctx);

            match flow.run(&record, &ctx).await {
                Ok(done) => summary.completed.push(done),
                Err(e) if e.is_record_local() => {
                    error!("{} ❌ 处理失败，跳过该订单: {}", ctx, e);
                    self.skip(summary, record.row, &ctx.label, &e)?;
                    self.submitter.recover().await?;
                    continue;
                }
                Err(e) => return Err(e),
            }

            // 订单已完成，返回表单失败只需恢复页面
            match flow.return_to_form().await {
                Ok(()) => {}
                Err(e) if e.is_record_local() => {
                    warn!("{} ⚠️ 返回下单表单失败: {}", ctx, e);
                    self.submitter.recover().await?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn skip(&self, summary: &mut RunSummary, row: usize, label: &str, reason: &AppError) -> AppResult<()> {
        if let Some(writer) = &self.warn_writer {
            writer.write(row, label, &reason.to_string())?;
        }
        summary.skipped.push(SkippedOrder {
            row,
            reason: reason.to_string(),
        });
        Ok(())
    }

    fn finalize(&self) -> AppResult<usize> {
        let count = self
            .finalizer
            .archive(self.store.receipts_dir(), self.store.archive_path())?;
        info!("✓ 共打包 {} 份收据", count);
        Ok(count)
    }
}
