//! # Robot Order Receipts
//!
//! 从远程 CSV 读取机器人订单，逐条在网页表单中下单，
//! 把每张收据保存为附带机器人截图的 PDF，最后打包成一个 zip。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 流程需要的全部页面操作
//! - `ChromePage` - 基于 chromiumoxide 的实现，内部使用 `JsExecutor`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条订单
//! - `ArtifactStore` - 输出目录与文件命名
//! - `OrderSource` - 下载并解析订单 CSV
//! - `FormSubmitter` - 表单状态机（弹窗 / 填写 / 预览 / 提交 / 重试）
//! - `ReceiptCapturer` - PDF 收据、截图、合并
//! - `ArchiveFinalizer` - 打包 zip
//! - `WarnWriter` - 记录跳过的订单
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条订单"的完整处理流程
//! - `OrderCtx` - 上下文封装（行号 + 序号）
//! - `OrderFlow` - 流程编排（弹窗 → 提交 → 收据 → 截图 → 合并 → 返回）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/order_processor` - 遍历订单，决定跳过还是中止，最后打包
//! - `orchestrator/app` - 浏览器生命周期与组件组装

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromePage, PageDriver};
pub use models::{BoundingBox, OrderIdentifier, OrderRecord, Selectors};
pub use orchestrator::{App, OrderPipeline, RunSummary};
pub use workflow::{CompletedOrder, OrderCtx, OrderFlow};
