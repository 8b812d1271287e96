//! 下单表单提交 - 业务能力层
//!
//! 把一条订单推过下单表单，处理遮挡弹窗和校验失败重试，最终拿到订单号。
//!
//! ```text
//! ObstructionPresent ─▶ FormReady ─▶ Filled ─▶ PreviewShown ─▶ Submitted ─▶ Confirmed
//!                                                                  ▲   │
//!                                                                  │   ▼
//!                                                           ValidationRejected
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::PageDriver;
use crate::models::{OrderIdentifier, OrderRecord, Selectors};

/// 表单提交能力
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    /// 打开下单页面
    async fn open_form(&self) -> AppResult<()>;

    /// 如有遮挡弹窗则关闭；弹窗和表单都不存在时报结构错误
    async fn dismiss_obstruction(&self) -> AppResult<()>;

    /// 填写并提交一条订单，返回确认页上的订单号
    async fn submit(&self, record: &OrderRecord) -> AppResult<OrderIdentifier>;

    /// 从确认页返回下单表单
    async fn order_another(&self) -> AppResult<()>;

    /// 单条订单失败后，把页面恢复到可下单的状态
    async fn recover(&self) -> AppResult<()>;
}

/// 表单状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    ObstructionPresent,
    FormReady,
    Filled,
    PreviewShown,
    /// `stale_alert`: 点击前页面上已有校验错误提示
    Submitted { attempt: u32, stale_alert: bool },
    ValidationRejected { attempt: u32 },
    Confirmed(OrderIdentifier),
}

/// 基于浏览器页面的表单提交实现
pub struct BrowserFormSubmitter<P: PageDriver> {
    page: Arc<P>,
    selectors: Selectors,
    order_page_url: String,
    max_submit_retries: u32,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl<P: PageDriver> BrowserFormSubmitter<P> {
    pub fn new(page: Arc<P>, config: &Config) -> Self {
        Self {
            page,
            selectors: config.selectors.clone(),
            order_page_url: config.order_page_url.clone(),
            max_submit_retries: config.max_submit_retries,
            confirm_timeout: config.action_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    /// 当前页面所处的初始状态
    ///
    /// 导航或返回表单后页面可能尚未渲染，轮询到超时为止
    async fn observe(&self) -> AppResult<FormState> {
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            if self.page.is_visible(&self.selectors.modal_dismiss).await? {
                return Ok(FormState::ObstructionPresent);
            }
            if self.page.is_visible(&self.selectors.head_select).await? {
                return Ok(FormState::FormReady);
            }
            if Instant::now() >= deadline {
                return Err(AppError::missing_control(
                    &self.selectors.head_select,
                    "既没有弹窗也没有下单表单",
                ));
            }
            sleep(self.poll_interval).await;
        }
    }

    /// 推进一步状态机
    async fn advance(&self, state: FormState, record: &OrderRecord) -> AppResult<FormState> {
        let s = &self.selectors;
        let next = match state {
            FormState::ObstructionPresent => {
                self.page.click(&s.modal_dismiss).await?;
                FormState::FormReady
            }
            FormState::FormReady => {
                self.page.select_option(&s.head_select, &record.head).await?;
                self.page.check(&s.body_radio(&record.body)).await?;
                self.page.fill(&s.legs_input, &record.legs).await?;
                self.page.fill(&s.address_input, &record.address).await?;
                FormState::Filled
            }
            FormState::Filled => {
                self.page.click(&s.preview_button).await?;
                FormState::PreviewShown
            }
            FormState::PreviewShown => {
                self.page.click(&s.submit_button).await?;
                FormState::Submitted {
                    attempt: 1,
                    stale_alert: false,
                }
            }
            FormState::Submitted {
                attempt,
                stale_alert,
            } => self.await_outcome(attempt, stale_alert).await?,
            FormState::ValidationRejected { attempt } => {
                if attempt >= self.max_submit_retries {
                    return Err(AppError::FormValidationRejected { attempts: attempt });
                }
                warn!(
                    "订单 {} 提交被拒绝 (尝试 {}/{}), 重新提交...",
                    record.label(),
                    attempt,
                    self.max_submit_retries
                );
                self.page.click(&s.submit_button).await?;
                FormState::Submitted {
                    attempt: attempt + 1,
                    stale_alert: true,
                }
            }
            FormState::Confirmed(id) => FormState::Confirmed(id),
        };
        Ok(next)
    }

    /// 提交之后等待确认页或校验错误出现
    ///
    /// 重新提交时，上一次的错误提示要先消失才算本次的结果；
    /// 直到超时仍未消失，视为本次再次被拒绝。
    async fn await_outcome(&self, attempt: u32, stale_alert: bool) -> AppResult<FormState> {
        let s = &self.selectors;
        let deadline = Instant::now() + self.confirm_timeout;
        let mut alert_cleared = !stale_alert;

        loop {
            if self.page.is_visible(&s.receipt).await? {
                let raw = self.page.text_content(&s.order_id).await?;
                let id = OrderIdentifier::parse(&raw, &s.order_id)?;
                return Ok(FormState::Confirmed(id));
            }
            let alert = self.page.is_visible(&s.validation_alert).await?;
            if alert && alert_cleared {
                return Ok(FormState::ValidationRejected { attempt });
            }
            if !alert {
                alert_cleared = true;
            }
            if Instant::now() >= deadline {
                if alert {
                    debug!("错误提示在 {:?} 内没有消失", self.confirm_timeout);
                    return Ok(FormState::ValidationRejected { attempt });
                }
                return Err(AppError::ActionTimeout {
                    action: "等待订单确认".to_string(),
                    selector: s.receipt.clone(),
                    timeout_ms: self.confirm_timeout.as_millis() as u64,
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl<P: PageDriver + 'static> FormSubmitter for BrowserFormSubmitter<P> {
    async fn open_form(&self) -> AppResult<()> {
        info!("🌐 打开下单页面: {}", self.order_page_url);
        self.page.goto(&self.order_page_url).await
    }

    async fn dismiss_obstruction(&self) -> AppResult<()> {
        if self.observe().await? == FormState::ObstructionPresent {
            debug!("检测到遮挡弹窗，点击确认");
            self.page.click(&self.selectors.modal_dismiss).await?;
        }
        Ok(())
    }

    async fn submit(&self, record: &OrderRecord) -> AppResult<OrderIdentifier> {
        let mut state = self.observe().await?;

        loop {
            debug!("订单 {} 状态: {:?}", record.label(), state);
            state = match self.advance(state, record).await? {
                FormState::Confirmed(id) => return Ok(id),
                next => next,
            };
        }
    }

    async fn order_another(&self) -> AppResult<()> {
        self.page.click(&self.selectors.order_another_button).await
    }

    async fn recover(&self) -> AppResult<()> {
        warn!("🔄 重新打开下单页面以继续下一条订单");
        self.page.goto(&self.order_page_url).await
    }
}
