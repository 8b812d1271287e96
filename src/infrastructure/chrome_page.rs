//! 基于 chromiumoxide 的 [`PageDriver`] 实现
//!
//! 表单操作全部通过 [`JsExecutor`] 执行脚本完成；截图、导航、PDF 渲染走 CDP 原生接口。
//! 渲染 PDF 使用一个单独的辅助页面，避免破坏下单页面的状态。

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, PrintToPdfParams, Viewport,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{JsExecutor, PageDriver};
use crate::models::BoundingBox;

/// 脚本在元素上执行后的统一返回结构
#[derive(Debug, Deserialize)]
struct ElementReply {
    found: bool,
    #[serde(default)]
    value: JsonValue,
}

/// Chrome 页面
pub struct ChromePage {
    executor: JsExecutor,
    render_page: Page,
    poll_interval: Duration,
}

impl ChromePage {
    /// # 参数
    /// - `page`: 下单页面
    /// - `render_page`: 仅用于 HTML → PDF 的辅助页面
    pub fn new(page: Page, render_page: Page, action_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            executor: JsExecutor::new(page, action_timeout),
            render_page,
            poll_interval,
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.executor.action_timeout().as_millis() as u64
    }

    /// 给 CDP 原生调用加上超时
    async fn within<T, F>(&self, action: &str, selector: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, chromiumoxide::error::CdpError>>,
    {
        timeout(self.executor.action_timeout(), fut)
            .await
            .map_err(|_| AppError::ActionTimeout {
                action: action.to_string(),
                selector: selector.to_string(),
                timeout_ms: self.timeout_ms(),
            })?
            .map_err(AppError::from)
    }

    /// 等待元素出现在 DOM 中
    ///
    /// 超时仍未出现视为页面结构不匹配
    async fn wait_for_element(&self, selector: &str) -> AppResult<()> {
        let js_code = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let deadline = Instant::now() + self.executor.action_timeout();

        loop {
            if self.executor.eval_as::<bool>(js_code.as_str()).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::missing_control(
                    selector,
                    format!("{} ms 内未找到元素", self.timeout_ms()),
                ));
            }
            sleep(self.poll_interval).await;
        }
    }

    /// 等待元素出现后，以 `el` 为变量执行一段脚本
    ///
    /// `body` 必须返回 `{ found: true, value: ... }`
    async fn on_element(&self, selector: &str, action: &str, body: &str) -> AppResult<JsonValue> {
        self.wait_for_element(selector).await?;

        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) {{
                    return {{ found: false }};
                }}
                {}
            }})()
            "#,
            serde_json::to_string(selector)?,
            body
        );

        debug!("{} {}", action, selector);
        let reply: ElementReply = self.executor.eval_as(js_code).await?;
        if !reply.found {
            return Err(AppError::missing_control(selector, format!("{} 时元素消失", action)));
        }
        Ok(reply.value)
    }

    /// React 受控组件需要通过原生 setter 写值并派发事件
    async fn set_value(&self, selector: &str, action: &str, value: &str) -> AppResult<()> {
        let body = format!(
            r#"
            const value = {};
            if (el.tagName === 'SELECT' && !Array.from(el.options).some(o => o.value === value)) {{
                return {{ found: true, value: false }};
            }}
            const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set;
            setter.call(el, value);
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return {{ found: true, value: true }};
            "#,
            serde_json::to_string(value)?
        );

        let accepted = self.on_element(selector, action, &body).await?;
        if accepted.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(AppError::missing_control(
                selector,
                format!("没有可选的选项: {}", value),
            ))
        }
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        let page = self.executor.page();
        self.within("goto", url, page.goto(url)).await?;
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> AppResult<()> {
        self.set_value(selector, "select_option", value).await
    }

    async fn check(&self, selector: &str) -> AppResult<()> {
        self.on_element(
            selector,
            "check",
            "if (!el.checked) { el.click(); } return { found: true, value: el.checked };",
        )
        .await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> AppResult<()> {
        self.set_value(selector, "fill", value).await
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        self.on_element(selector, "click", "el.click(); return { found: true };")
            .await?;
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> AppResult<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) {{
                    return false;
                }}
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && (rect.width > 0 || rect.height > 0);
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        self.executor.eval_as(js_code).await
    }

    async fn text_content(&self, selector: &str) -> AppResult<String> {
        let value = self
            .on_element(
                selector,
                "text_content",
                "return { found: true, value: el.textContent || '' };",
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn inner_html(&self, selector: &str) -> AppResult<String> {
        let value = self
            .on_element(
                selector,
                "inner_html",
                "return { found: true, value: el.innerHTML };",
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn bounding_box(&self, selector: &str) -> AppResult<BoundingBox> {
        let value = self
            .on_element(
                selector,
                "bounding_box",
                r#"
                const rect = el.getBoundingClientRect();
                return { found: true, value: { x: rect.x, y: rect.y, width: rect.width, height: rect.height } };
                "#,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn screenshot_clip(&self, clip: BoundingBox) -> AppResult<Vec<u8>> {
        let scroll: (f64, f64) = self
            .executor
            .eval_as("[window.scrollX, window.scrollY]")
            .await?;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(document_clip(clip, scroll))
            .build();

        let page = self.executor.page();
        self.within("screenshot", "", page.screenshot(params)).await
    }

    async fn render_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        self.within("set_content", "", self.render_page.set_content(html))
            .await?;
        self.within(
            "print_to_pdf",
            "",
            self.render_page.pdf(PrintToPdfParams::default()),
        )
        .await
    }
}

/// 视口坐标换算为文档坐标（CDP 截图的 clip 以文档为基准）
fn document_clip(clip: BoundingBox, (scroll_x, scroll_y): (f64, f64)) -> Viewport {
    Viewport {
        x: clip.x + scroll_x,
        y: clip.y + scroll_y,
        width: clip.width,
        height: clip.height,
        scale: 1.0,
    }
}
