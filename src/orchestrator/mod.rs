//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器生命周期（启动 / 连接）
//! - 组装各业务能力并运行管线
//! - 输出全局统计信息
//!
//! ### `order_processor` - 订单处理管线
//! - 重置输出目录、加载订单
//! - 逐条调度 `OrderFlow`，决定跳过还是中止
//! - 打包收据
//!
//! ## 层次关系
//!
//! ```text
//! app (Browser + ChromePage)
//!     ↓
//! order_processor (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单条订单)
//!     ↓
//! services (能力层：提交 / 收据 / 打包 / 输出目录)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod app;
pub mod order_processor;

pub use app::App;
pub use order_processor::{OrderPipeline, RunSummary, SkippedOrder};
