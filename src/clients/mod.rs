//! 外部系统的传输层
//!
//! 每个客户端实现一个小 trait，服务层只依赖 trait，测试时可以换成内存实现。

pub mod llm_client;
pub mod problem_client;

pub use llm_client::LlmClient;
pub use problem_client::ProblemClient;

use serde_json::Value;
use std::future::Future;

use crate::error::AppResult;

/// 题库批量查询
pub trait ProblemSource: Send + Sync {
    /// 查询一批题目，返回接口中 `problems` 数组的原始元素
    fn fetch_batch(&self, ids: &[String]) -> impl Future<Output = AppResult<Vec<Value>>> + Send;
}

/// 聊天补全接口
pub trait ChatBackend: Send + Sync {
    /// 发送一条用户消息，`images` 作为图片内容附在文本之后
    ///
    /// 返回 `choices[0].message.content` 原文。
    fn complete(
        &self,
        prompt: &str,
        images: &[String],
    ) -> impl Future<Output = AppResult<String>> + Send;
}
