//! 解题上下文
//!
//! 封装"我正在解第几题、是哪道题"这一信息，只用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct SolveCtx {
    /// 题目ID
    pub question_id: String,

    /// 在本次运行中的序号（从1开始）
    pub index: usize,

    /// 本次运行的题目总数
    pub total: usize,
}

impl SolveCtx {
    pub fn new(question_id: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            question_id: question_id.into(),
            index,
            total,
        }
    }
}

impl Display for SolveCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 {}/{} ID#{}]", self.index, self.total, self.question_id)
    }
}
