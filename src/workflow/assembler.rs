//! 结果组装
//!
//! 把题目记录和解答结果按题目ID合并成导出行。题干、标准答案和模型回答在这里
//! 统一做一次文本规范化。

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::{AnswerResult, ExportRow, QuestionRecord, ANSWER_UNAVAILABLE};
use crate::utils::markup::{normalize_text, resolve_image_url};

/// 按记录顺序生成导出行
pub fn assemble(records: &[QuestionRecord], answers: &[AnswerResult]) -> Vec<ExportRow> {
    let by_id: HashMap<&str, &AnswerResult> = answers
        .iter()
        .map(|answer| (answer.question_id.as_str(), answer))
        .collect();

    records
        .iter()
        .map(|record| {
            let llm_answer = match by_id.get(record.id.as_str()) {
                Some(answer) => normalize_text(answer.text()),
                None => {
                    warn!("题目 {} 没有解答结果", record.id);
                    String::new()
                }
            };
            to_row(record, llm_answer)
        })
        .collect()
}

fn to_row(record: &QuestionRecord, llm_answer: String) -> ExportRow {
    ExportRow {
        id: record.id.clone(),
        question: normalize_text(&record.stem),
        correct_answer: export_answer(record),
        subject: record.subject.clone(),
        grade: record.stage.clone(),
        question_type: record.question_type.clone(),
        llm_answer,
    }
}

/// 标准答案文本后追加答案图片链接，为空时使用占位文本
fn export_answer(record: &QuestionRecord) -> String {
    let mut answer = normalize_text(&record.canonical_answer);
    for url in &record.answer_images {
        answer.push_str(&format!(" [图片URL: {}]", resolve_image_url(url)));
    }

    let answer = answer.trim();
    if answer.is_empty() {
        debug!("题目 {} 标准答案为空，使用占位文本", record.id);
        ANSWER_UNAVAILABLE.to_string()
    } else {
        answer.to_string()
    }
}
