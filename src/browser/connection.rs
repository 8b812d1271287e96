use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已开启远程调试的浏览器，并打开下单页面
pub async fn connect_to_browser_and_page(port: u16, order_page_url: &str) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个已打开的页面", pages.len());

    // 已经停留在下单页的标签页直接复用
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            if url == order_page_url {
                info!("✓ 复用已打开的下单页面");
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("创建新页面并导航到: {}", order_page_url);
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    page.goto(order_page_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", order_page_url, e);
        e
    })?;
    info!("已导航到: {}", order_page_url);

    Ok((browser, page))
}
