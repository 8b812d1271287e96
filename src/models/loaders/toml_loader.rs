use crate::error::{AppError, AppResult};
use crate::models::Selectors;
use std::path::Path;

/// 从 TOML 文件加载页面定位器，未写出的字段保持默认值
pub fn load_selectors(toml_file_path: &Path) -> AppResult<Selectors> {
    let content = std::fs::read_to_string(toml_file_path).map_err(|e| AppError::Config {
        key: "SELECTORS_FILE".to_string(),
        detail: format!("无法读取TOML文件 {}: {}", toml_file_path.display(), e),
    })?;

    let selectors: Selectors = toml::from_str(&content)?;

    tracing::info!("已从 {} 加载页面定位器", toml_file_path.display());
    Ok(selectors)
}
