//! 浏览器能力接口
//!
//! 流程层只依赖这里列出的页面操作；真实实现是 [`ChromePage`](super::ChromePage)，
//! 测试中使用脚本化的假页面。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::BoundingBox;

/// 下单流程用到的全部页面操作
///
/// 约定：
/// - 需要元素的操作在元素缺失时返回 `StructuralMismatch`
/// - `is_visible` 不等待，元素不存在时返回 `false`
/// - 超时返回 `ActionTimeout`
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> AppResult<()>;

    async fn select_option(&self, selector: &str, value: &str) -> AppResult<()>;

    async fn check(&self, selector: &str) -> AppResult<()>;

    async fn fill(&self, selector: &str, value: &str) -> AppResult<()>;

    async fn click(&self, selector: &str) -> AppResult<()>;

    async fn is_visible(&self, selector: &str) -> AppResult<bool>;

    async fn text_content(&self, selector: &str) -> AppResult<String>;

    async fn inner_html(&self, selector: &str) -> AppResult<String>;

    async fn bounding_box(&self, selector: &str) -> AppResult<BoundingBox>;

    /// 截取指定区域，返回 PNG 字节
    ///
    /// `clip` 与 `bounding_box` 的结果同为视口坐标，实现负责换算为文档坐标
    async fn screenshot_clip(&self, clip: BoundingBox) -> AppResult<Vec<u8>>;

    /// 把一段 HTML 渲染为 PDF 字节
    async fn render_pdf(&self, html: &str) -> AppResult<Vec<u8>>;
}
