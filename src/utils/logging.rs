/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::RunSummary;
use crate::workflow::OrderCtx;

/// 初始化 tracing 输出
///
/// 优先使用 `RUST_LOG`；否则 `VERBOSE_LOGGING=true` 时为 debug，默认 info
pub fn init() {
    let verbose = std::env::var("VERBOSE_LOGGING")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);
    let fallback = if verbose { "debug" } else { "info" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let log_header = format!(
        "{}\n机器人订单处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 机器人订单处理");
    info!("📄 订单数据: {}", config.csv_url);
    info!("🌐 下单页面: {}", config.order_page_url);
    info!("📁 输出目录: {}", config.output_dir.display());
    info!("🔁 单条订单最多提交 {} 次", config.max_submit_retries);
    info!("{}", "=".repeat(60));
}

/// 记录订单加载信息
///
/// # 参数
/// - `total`: CSV 行数
/// - `valid`: 字段完整的订单数
pub fn log_orders_loaded(total: usize, valid: usize) {
    info!("✓ 找到 {} 条订单", total);
    if valid < total {
        info!("⚠️ 其中 {} 条数据不完整，将被跳过", total - valid);
    }
}

/// 记录单条订单开始
pub fn log_order_start(ctx: &OrderCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始处理", ctx);
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 本次运行统计
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.completed.len(), summary.total);
    info!("❌ 跳过: {}", summary.skipped.len());
    info!(
        "📦 压缩包: {} ({} 份收据)",
        summary.archive_path.display(),
        summary.archived
    );
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
