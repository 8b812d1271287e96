use anyhow::Result;
use robot_order_receipts::utils::logging;
use robot_order_receipts::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env()?;

    // 初始化并运行应用
    let summary = App::initialize(config).await?.run().await?;

    if !summary.is_complete() {
        warn!(
            "⚠️ 有 {} 条订单未完成",
            summary.total - summary.completed.len()
        );
    }

    Ok(())
}
