//! 应用入口 - 编排层
//!
//! 负责浏览器生命周期和各组件的组装：
//!
//! 1. **应用初始化**：写日志文件头、启动或连接浏览器、创建 `ChromePage`
//! 2. **组装管线**：数据源、表单提交、收据生成、打包
//! 3. **全局统计**：输出本次运行的结果

use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::ChromePage;
use crate::orchestrator::order_processor::{OrderPipeline, RunSummary};
use crate::services::{
    ArtifactStore, BrowserFormSubmitter, BrowserReceiptCapturer, HttpOrderSource, WarnWriter,
    ZipArchiveFinalizer,
};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    page: Arc<ChromePage>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let (browser, page) = if config.connect_existing_browser {
            browser::connect_to_browser_and_page(config.browser_debug_port, &config.order_page_url)
                .await?
        } else {
            browser::launch_headless_browser(
                &config.order_page_url,
                config.chrome_executable.as_deref(),
            )
            .await?
        };

        // 收据渲染使用单独的页面，不影响下单页
        let render_page = browser.new_page("about:blank").await?;

        let page = Arc::new(ChromePage::new(
            page,
            render_page,
            config.action_timeout(),
            config.poll_interval(),
        ));

        Ok(Self {
            config,
            _browser: browser,
            page,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let pipeline = OrderPipeline::new(
            HttpOrderSource::from_config(&self.config)?,
            BrowserFormSubmitter::new(self.page.clone(), &self.config),
            BrowserReceiptCapturer::new(self.page.clone(), self.config.selectors.clone()),
            ZipArchiveFinalizer::new(),
            ArtifactStore::from_config(&self.config),
        )
        .with_warn_writer(WarnWriter::with_path(&self.config.warn_file))
        .archive_on_abort(self.config.archive_on_abort);

        let summary = pipeline.run().await?;

        print_final_stats(&summary, &self.config.output_log_file);
        if !summary.is_complete() {
            info!("跳过的订单已记录至: {}", self.config.warn_file);
        }

        Ok(summary)
    }
}
