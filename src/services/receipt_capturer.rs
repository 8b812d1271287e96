//! 收据生成 - 业务能力层
//!
//! 只负责把确认页转成 PDF 收据和机器人截图，不关心文件放在哪里

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::models::{OrderIdentifier, Selectors};
use crate::services::artifact_store::write_artifact;
use crate::services::pdf_embed::append_image_page;
use crate::utils::logging::truncate_text;

/// 收据生成能力
#[async_trait]
pub trait ReceiptCapturer: Send + Sync {
    /// 把确认页上的收据渲染为 PDF，写入 `path`
    async fn capture_receipt(&self, id: &OrderIdentifier, path: &Path) -> AppResult<PathBuf>;

    /// 按预览图的矩形区域截图，写入 `path`
    async fn capture_screenshot(&self, id: &OrderIdentifier, path: &Path) -> AppResult<PathBuf>;

    /// 把截图作为新的一页追加到收据 PDF
    fn embed(&self, screenshot: &Path, receipt: &Path) -> AppResult<()>;
}

/// 基于浏览器页面的收据生成实现
pub struct BrowserReceiptCapturer<P: PageDriver> {
    page: Arc<P>,
    selectors: Selectors,
}

impl<P: PageDriver> BrowserReceiptCapturer<P> {
    pub fn new(page: Arc<P>, selectors: Selectors) -> Self {
        Self { page, selectors }
    }
}

#[async_trait]
impl<P: PageDriver + 'static> ReceiptCapturer for BrowserReceiptCapturer<P> {
    async fn capture_receipt(&self, id: &OrderIdentifier, path: &Path) -> AppResult<PathBuf> {
        let receipt_html = self.page.inner_html(&self.selectors.receipt).await?;
        debug!("订单 {} 收据内容: {}", id, truncate_text(&receipt_html, 80));
        let pdf = self.page.render_pdf(&receipt_document(id, &receipt_html)).await?;

        write_artifact(path, &pdf)?;
        debug!("收据已保存: {} ({} 字节)", path.display(), pdf.len());
        Ok(path.to_path_buf())
    }

    async fn capture_screenshot(&self, id: &OrderIdentifier, path: &Path) -> AppResult<PathBuf> {
        let image_box = self.page.bounding_box(&self.selectors.preview_image).await?;
        debug!("订单 {} 预览图区域: {:?}", id, image_box);

        let png = self.page.screenshot_clip(image_box).await?;

        write_artifact(path, &png)?;
        debug!("截图已保存: {}", path.display());
        Ok(path.to_path_buf())
    }

    fn embed(&self, screenshot: &Path, receipt: &Path) -> AppResult<()> {
        append_image_page(receipt, screenshot)
    }
}

/// 收据片段包装成完整的 HTML 文档
fn receipt_document(id: &OrderIdentifier, receipt_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{}</title>
<style>body {{ font-family: sans-serif; margin: 2em; }}</style>
</head>
<body>
{}
</body>
</html>"#,
        id, receipt_html
    )
}
