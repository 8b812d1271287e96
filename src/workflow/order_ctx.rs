//! 订单处理上下文
//!
//! 封装"我正在处理第几条订单"这一信息

use std::fmt::Display;

/// 订单处理上下文
#[derive(Debug, Clone)]
pub struct OrderCtx {
    /// CSV 行号
    pub row: usize,

    /// 在本次运行中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本次运行的订单总数
    pub total: usize,

    /// 订单标签
    pub label: String,
}

impl OrderCtx {
    pub fn new(row: usize, position: usize, total: usize, label: String) -> Self {
        Self {
            row,
            position,
            total,
            label,
        }
    }
}

impl Display for OrderCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[订单 {}/{} {}]", self.position, self.total, self.label)
    }
}
