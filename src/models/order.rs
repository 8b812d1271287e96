use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 一条订单（CSV 中的一行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    /// 在 CSV 中的行号（表头之后从 1 开始）
    pub row: usize,
    /// CSV 中的 "Order number" 列，仅用于日志
    pub order_number: Option<String>,
    pub head: String,
    pub body: String,
    pub legs: String,
    pub address: String,
}

impl OrderRecord {
    /// 日志中展示的订单标签
    pub fn label(&self) -> String {
        match &self.order_number {
            Some(number) => format!("#{} (第 {} 行)", number, self.row),
            None => format!("第 {} 行", self.row),
        }
    }
}

/// 确认页上的订单号
///
/// 同时作为该订单所有产物的文件名，因此只允许 `[A-Za-z0-9._-]`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderIdentifier(String);

impl OrderIdentifier {
    /// 从页面文本解析订单号
    pub fn parse(raw: &str, selector: &str) -> AppResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(AppError::missing_control(selector, "订单号为空"));
        }
        if value == "." || value == ".." || !id_pattern().is_match(value) {
            return Err(AppError::missing_control(
                selector,
                format!("订单号无法作为文件名: {}", value),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("订单号正则无效"))
}

/// 元素在视口中的矩形区域（CSS 像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_identifier_trims_whitespace() {
        let id = OrderIdentifier::parse("  RSB-ROBO-ORDER-7K2M1\n", "#receipt").unwrap();
        assert_eq!(id.as_str(), "RSB-ROBO-ORDER-7K2M1");
        assert_eq!(id.to_string(), "RSB-ROBO-ORDER-7K2M1");
    }

    #[test]
    fn test_order_identifier_rejects_empty() {
        let err = OrderIdentifier::parse("   ", "#receipt").unwrap_err();
        assert!(matches!(err, AppError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_order_identifier_rejects_path_like_values() {
        for raw in ["../etc", "a/b", "a\\b", "..", "order 1"] {
            assert!(
                OrderIdentifier::parse(raw, "#receipt").is_err(),
                "应该拒绝: {}",
                raw
            );
        }
    }

    #[test]
    fn test_record_label() {
        let mut record = OrderRecord {
            row: 3,
            order_number: Some("3".to_string()),
            head: "1".to_string(),
            body: "2".to_string(),
            legs: "3".to_string(),
            address: "Address 123".to_string(),
        };
        assert_eq!(record.label(), "#3 (第 3 行)");
        record.order_number = None;
        assert_eq!(record.label(), "第 3 行");
    }
}
