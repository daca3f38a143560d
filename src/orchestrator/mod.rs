//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (加载ID → 获取题目 → 并发解题 → 组装导出)
//!     ↓
//! workflow (assembler / progress)
//!     ↓
//! services (能力层：fetch / solve / export)
//!     ↓
//! clients (传输层：题库接口 / LLM 接口)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → clients
//! 2. **无业务逻辑**：只做调度和统计，不做字段解析和文本处理

pub mod batch_processor;

pub use batch_processor::{App, BatchSolver, RunReport, RunState};
