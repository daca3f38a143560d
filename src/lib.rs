//! # Auto Problem Solver
//!
//! 使用大模型批量解答题库题目的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 传输层（Clients）
//! - `clients/` - 与外部系统的一次 HTTP 往返
//! - `ProblemClient` - 题库批量查询接口
//! - `LlmClient` - 兼容 OpenAI 协议的聊天补全接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单道题或单批数据
//! - `ProblemFetcher` - 分批获取题目并整理成 `QuestionRecord`
//! - `Solver` - 填充提示词、调用大模型解答一道题
//! - `JsonExporter` - 导出结果行
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 一次运行中用到的组装与进度
//! - `assemble` - 合并题目与解答，统一规范化文本
//! - `ProgressReporter` - 单调递增的进度上报
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 加载ID → 获取 → 并发解题 → 组装导出
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnswerResult, ExportRow, QuestionRecord};
pub use orchestrator::{App, BatchSolver, RunReport, RunState};
pub use workflow::ProgressReporter;
