use serde::{Deserialize, Serialize};

/// 获取不到标准答案时使用的占位文本
pub const ANSWER_UNAVAILABLE: &str = "答案不可用";

/// 一道已从题库取回并规范化的题目
///
/// 由题库适配层创建，之后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    /// 规范化后的题干（含所有小题）
    pub stem: String,
    /// 题干中的图片，按出现顺序
    #[serde(default)]
    pub stem_images: Vec<String>,
    /// 规范化后的标准答案
    pub canonical_answer: String,
    /// 标准答案中的图片，按出现顺序
    #[serde(default)]
    pub answer_images: Vec<String>,
    /// 学科名称，未知时为空串
    pub subject: String,
    /// 学段名称，未知时为空串
    pub stage: String,
    /// 题型名称，未知时为空串
    pub question_type: String,
}

impl QuestionRecord {
    /// 题干图片在前，答案图片在后
    pub fn all_images(&self) -> impl Iterator<Item = &String> {
        self.stem_images.iter().chain(self.answer_images.iter())
    }
}

/// 单道题的解答结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// 模型返回的原始回答
    Answered(String),
    /// 可读的失败说明
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub question_id: String,
    pub outcome: AnswerOutcome,
}

impl AnswerResult {
    pub fn answered(question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            outcome: AnswerOutcome::Answered(text.into()),
        }
    }

    pub fn failed(question_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            outcome: AnswerOutcome::Failed(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AnswerOutcome::Answered(_))
    }

    /// 导出时展示的文本：回答或失败说明
    pub fn text(&self) -> &str {
        match &self.outcome {
            AnswerOutcome::Answered(text) | AnswerOutcome::Failed(text) => text,
        }
    }
}

/// 交给导出端的一行数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: String,
    pub question: String,
    pub correct_answer: String,
    pub subject: String,
    pub grade: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub llm_answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_row_field_names() {
        let row = ExportRow {
            id: "q1".to_string(),
            question: "1+1=?".to_string(),
            correct_answer: "2".to_string(),
            subject: "数学".to_string(),
            grade: "小学".to_string(),
            question_type: "填空题".to_string(),
            llm_answer: "2".to_string(),
        };
        let value = serde_json::to_value(&row).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["id", "question", "correctAnswer", "subject", "grade", "type", "llmAnswer"]
        );
    }

    #[test]
    fn test_answer_result_text() {
        assert_eq!(AnswerResult::answered("q1", "答案").text(), "答案");
        let failed = AnswerResult::failed("q2", "解题失败");
        assert!(!failed.is_success());
        assert_eq!(failed.text(), "解题失败");
    }
}
