use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::Selectors;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 订单 CSV 地址
    pub csv_url: String,
    /// 下单页面地址
    pub order_page_url: String,
    /// 下载到本地的 CSV 路径（每次运行覆盖）
    pub local_csv_path: PathBuf,
    /// 输出根目录
    pub output_dir: PathBuf,
    pub receipts_dir: PathBuf,
    pub screenshots_dir: PathBuf,
    pub archive_path: PathBuf,
    /// 单条订单最多点击提交的次数
    pub max_submit_retries: u32,
    /// 单个浏览器操作超时（毫秒）
    pub action_timeout_ms: u64,
    /// 等待元素出现时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 下载 CSV 的超时（毫秒）
    pub http_timeout_ms: u64,
    /// 致命错误中止时仍然打包已有收据
    pub archive_on_abort: bool,
    /// 连接已打开的浏览器，而不是启动无头浏览器
    pub connect_existing_browser: bool,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 自定义 Chrome 可执行文件
    pub chrome_executable: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 跳过订单记录文件
    pub warn_file: String,
    /// 页面定位器
    pub selectors: Selectors,
}

impl Default for Config {
    fn default() -> Self {
        let output_dir = PathBuf::from("output");
        Self {
            csv_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            order_page_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            local_csv_path: PathBuf::from("orders.csv"),
            receipts_dir: output_dir.join("receipts"),
            screenshots_dir: output_dir.join("screenshots"),
            archive_path: output_dir.join("receipts.zip"),
            output_dir,
            max_submit_retries: 5,
            action_timeout_ms: 10_000,
            poll_interval_ms: 200,
            http_timeout_ms: 30_000,
            archive_on_abort: true,
            connect_existing_browser: false,
            browser_debug_port: 9222,
            chrome_executable: None,
            verbose_logging: false,
            output_log_file: "output/run_log.txt".to_string(),
            warn_file: "output/warn.txt".to_string(),
            selectors: Selectors::default(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置或无法解析的值使用默认值
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        let output_dir = env_path("OUTPUT_DIR").unwrap_or(default.output_dir);

        let selectors = match std::env::var("SELECTORS_FILE") {
            Ok(path) => crate::models::load_selectors(Path::new(&path))?,
            Err(_) => default.selectors,
        };

        let config = Self {
            csv_url: std::env::var("CSV_URL").unwrap_or(default.csv_url),
            order_page_url: std::env::var("ORDER_PAGE_URL").unwrap_or(default.order_page_url),
            local_csv_path: env_path("LOCAL_CSV_PATH").unwrap_or(default.local_csv_path),
            receipts_dir: env_path("RECEIPTS_DIR").unwrap_or_else(|| output_dir.join("receipts")),
            screenshots_dir: env_path("SCREENSHOTS_DIR")
                .unwrap_or_else(|| output_dir.join("screenshots")),
            archive_path: env_path("ARCHIVE_PATH").unwrap_or_else(|| output_dir.join("receipts.zip")),
            max_submit_retries: env_parse("MAX_SUBMIT_RETRIES").unwrap_or(default.max_submit_retries),
            action_timeout_ms: env_parse("ACTION_TIMEOUT_MS").unwrap_or(default.action_timeout_ms),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS").unwrap_or(default.poll_interval_ms),
            http_timeout_ms: env_parse("HTTP_TIMEOUT_MS").unwrap_or(default.http_timeout_ms),
            archive_on_abort: env_parse("ARCHIVE_ON_ABORT").unwrap_or(default.archive_on_abort),
            connect_existing_browser: env_parse("CONNECT_EXISTING_BROWSER")
                .unwrap_or(default.connect_existing_browser),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").unwrap_or(default.browser_debug_port),
            chrome_executable: env_path("CHROME_EXECUTABLE").or(default.chrome_executable),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            output_dir,
            selectors,
        };

        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.max_submit_retries == 0 {
            return Err(AppError::Config {
                key: "MAX_SUBMIT_RETRIES".to_string(),
                detail: "至少需要提交 1 次".to_string(),
            });
        }
        for (key, value) in [
            ("ACTION_TIMEOUT_MS", self.action_timeout_ms),
            ("POLL_INTERVAL_MS", self.poll_interval_ms),
            ("HTTP_TIMEOUT_MS", self.http_timeout_ms),
        ] {
            if value == 0 {
                return Err(AppError::Config {
                    key: key.to_string(),
                    detail: "不能为 0".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
