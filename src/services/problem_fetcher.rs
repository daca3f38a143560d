//! 题库适配服务
//!
//! 把题目ID解析成 `QuestionRecord`：按固定大小分批请求题库接口，每批独立重试，
//! 再把每道题的原始字段整理成统一的记录。某一批彻底失败只会让这一批没有数据，
//! 不会中止整个流程。

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::ProblemSource;
use crate::config::Config;
use crate::models::catalog;
use crate::models::problem::is_present;
use crate::models::{QuestionRecord, RawProblem, ANSWER_UNAVAILABLE};
use crate::utils::markup;
use crate::utils::retry::RetryPolicy;

pub struct ProblemFetcher<S> {
    source: S,
    batch_size: usize,
    batch_delay: Duration,
    retry: RetryPolicy,
}

impl<S: ProblemSource> ProblemFetcher<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_secs(config.batch_delay_secs),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// 获取全部题目，返回顺序与请求的ID顺序一致（缺失的题目直接跳过）
    pub async fn fetch(&self, ids: &[String]) -> Vec<QuestionRecord> {
        if ids.is_empty() {
            warn!("没有需要获取的题目ID");
            return Vec::new();
        }

        let total_batches = ids.len().div_ceil(self.batch_size);
        let mut records = Vec::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(self.batch_size).enumerate() {
            info!(
                "获取第 {}/{} 批题目，本批 {} 个",
                index + 1,
                total_batches,
                chunk.len()
            );

            let label = format!("第 {} 批题目请求", index + 1);
            match self
                .retry
                .run(&label, move |_| self.source.fetch_batch(chunk))
                .await
            {
                Ok(problems) => {
                    info!("第 {} 批返回 {} 道题", index + 1, problems.len());
                    records.extend(problems.into_iter().filter_map(build_record));
                }
                Err(e) => warn!("第 {} 批题目获取失败，已跳过: {}", index + 1, e),
            }

            if index + 1 < total_batches {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        info!("共获取 {}/{} 道题", records.len(), ids.len());
        records
    }
}

/// 单道题解析失败只跳过这一道
fn build_record(value: Value) -> Option<QuestionRecord> {
    let raw: RawProblem = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("题目数据格式异常，已跳过: {}", e);
            return None;
        }
    };

    let Some(id) = raw.id_string() else {
        warn!("题目缺少ID，已跳过");
        return None;
    };

    let stem = markup::normalize(&escape_body(&compose_body(&raw)));
    let answer = markup::normalize(&resolve_canonical_answer(&raw));
    debug!("题目 {} 解析完成，题干图片 {} 张", id, stem.images.len());

    Some(QuestionRecord {
        subject: catalog::subject_name(raw.subject_id.as_ref()).to_string(),
        stage: catalog::stage_name(raw.stage_id.as_ref()).to_string(),
        question_type: catalog::question_type_name(raw.problem_type.as_deref()).to_string(),
        id,
        stem: stem.text,
        stem_images: stem.images,
        canonical_answer: answer.text,
        answer_images: answer.images,
    })
}

/// 主题干后依次拼接所有小题
fn compose_body(raw: &RawProblem) -> String {
    let mut body = raw.body.clone().unwrap_or_default();
    for sub in &raw.subproblems {
        if let Some(sub_body) = &sub.body {
            body.push_str(sub_body);
        }
    }
    body
}

/// 反斜杠加倍，双引号改为单引号
pub fn escape_body(body: &str) -> String {
    body.replace('\\', "\\\\").replace('"', "'")
}

/// 按优先级确定标准答案
///
/// correctAnswers → correctAnswer → 选项标记 → explains → answer → extendedBlanks → 占位文本
pub fn resolve_canonical_answer(raw: &RawProblem) -> String {
    let present = |field: &Option<Value>| field.as_ref().filter(|v| is_present(v)).cloned();

    if let Some(value) = present(&raw.correct_answers) {
        return answer_text(&value);
    }
    if let Some(value) = present(&raw.correct_answer) {
        return answer_text(&value);
    }
    if let Some(letters) = raw.choices.as_ref().and_then(choice_letters) {
        return letters;
    }
    if let Some(value) = present(&raw.explains) {
        return match value {
            Value::Object(_) => value.to_string(),
            other => answer_text(&other),
        };
    }
    if let Some(value) = present(&raw.answer) {
        return answer_text(&value);
    }
    if let Some(blanks) = raw.extended_blanks.as_ref().and_then(first_blank_answers) {
        return blanks;
    }

    warn!("题目 {:?} 没有找到任何答案字段", raw.id_string());
    ANSWER_UNAVAILABLE.to_string()
}

fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|v| is_present(v))
            .map(answer_text)
            .collect::<Vec<_>>()
            .join("；"),
        other => other.to_string(),
    }
}

/// 第一组选项中标记为正确的位置转成字母
fn choice_letters(choices: &Value) -> Option<String> {
    let group = choices.as_array()?.first()?.as_array()?;
    let letters: Vec<String> = group
        .iter()
        .zip('A'..='Z')
        .filter(|(choice, _)| {
            choice
                .get("correct")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .map(|(_, letter)| letter.to_string())
        .collect();

    (!letters.is_empty()).then(|| letters.join(", "))
}

/// 每个空取第一个可接受答案
fn first_blank_answers(blanks: &Value) -> Option<String> {
    let answers: Vec<String> = blanks
        .as_array()?
        .iter()
        .filter_map(|blank| blank.as_array()?.first())
        .filter(|v| is_present(v))
        .map(answer_text)
        .collect();

    (!answers.is_empty()).then(|| answers.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 按ID返回固定数据的内存题库，可指定前若干次调用失败
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        fail_first: usize,
        fail_when_contains: Option<String>,
        batches: Mutex<Vec<usize>>,
    }

    impl ProblemSource for FakeSource {
        async fn fetch_batch(&self, ids: &[String]) -> AppResult<Vec<Value>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(ids.len());

            if call < self.fail_first
                || self
                    .fail_when_contains
                    .as_ref()
                    .is_some_and(|bad| ids.contains(bad))
            {
                return Err(AppError::api_request_failed(
                    "fake",
                    std::io::Error::other("connection reset"),
                ));
            }

            Ok(ids
                .iter()
                .map(|id| json!({"id": id, "body": format!("题目{id}"), "correctAnswer": "A"}))
                .collect())
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("q{i}")).collect()
    }

    fn raw(value: Value) -> RawProblem {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_splits_into_chunks_of_fifty() {
        let fetcher = ProblemFetcher::new(FakeSource::default(), &Config::default());
        let records = fetcher.fetch(&ids(120)).await;

        assert_eq!(records.len(), 120);
        assert_eq!(records[0].id, "q0");
        assert_eq!(records[119].id, "q119");
        assert_eq!(*fetcher.source.batches.lock().unwrap(), vec![50, 50, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_chunks() {
        let fetcher = ProblemFetcher::new(FakeSource::default(), &Config::default());
        let start = tokio::time::Instant::now();
        fetcher.fetch(&ids(120)).await;

        // 三批之间两次间隔，最后一批之后不再等待
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chunk_yields_no_records() {
        let source = FakeSource {
            fail_when_contains: Some("q60".to_string()),
            ..FakeSource::default()
        };
        let fetcher = ProblemFetcher::new(source, &Config::default());
        let records = fetcher.fetch(&ids(120)).await;

        // 第二批 (q50..q99) 重试 3 次后放弃
        assert_eq!(records.len(), 70);
        assert!(records.iter().all(|r| r.id != "q60"));
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let source = FakeSource {
            fail_first: 2,
            ..FakeSource::default()
        };
        let fetcher = ProblemFetcher::new(source, &Config::default());
        let records = fetcher.fetch(&ids(3)).await;

        assert_eq!(records.len(), 3);
        assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_build_record_skips_bad_entries() {
        assert!(build_record(json!({"body": "没有ID"})).is_none());
        assert!(build_record(json!({"id": "q1", "subproblems": "oops"})).is_none());
        assert!(build_record(json!("not an object")).is_none());
    }

    #[test]
    fn test_build_record_combines_subproblems_and_catalogs() {
        let record = build_record(json!({
            "id": "q1",
            "body": "<p>阅读材料<img src=\"//cdn/a.png\"/></p>",
            "subproblems": [{"body": "<p>(1) 求$\\sqrt{4}$</p>"}, {"body": "<p>(2) 填空____</p>"}],
            "subjectId": 1,
            "stageId": 2,
            "type": "multi_blank",
            "correctAnswers": ["2", "<img src='//cdn/b.png'/>4"]
        }))
        .unwrap();

        assert_eq!(record.stem, "阅读材料(1) 求√4(2) 填空______");
        assert_eq!(record.stem_images, ["//cdn/a.png"]);
        assert_eq!(record.canonical_answer, "2；4");
        assert_eq!(record.answer_images, ["//cdn/b.png"]);
        assert_eq!(record.subject, "数学");
        assert_eq!(record.stage, "初中");
        assert_eq!(record.question_type, "填空题");
    }

    #[test]
    fn test_escape_body() {
        assert_eq!(escape_body(r#"a\b"c"#), r"a\\b'c");
    }

    #[test]
    fn test_answer_precedence() {
        let answer = resolve_canonical_answer(&raw(json!({
            "correctAnswers": ["B"],
            "correctAnswer": "C",
            "answer": "D"
        })));
        assert_eq!(answer, "B");

        let answer = resolve_canonical_answer(&raw(json!({
            "correctAnswers": [],
            "correctAnswer": "C",
        })));
        assert_eq!(answer, "C");

        let answer = resolve_canonical_answer(&raw(json!({
            "type": "multi_choice",
            "choices": [[{"correct": false}, {"correct": true}, {"correct": true}]],
            "explains": "解析",
        })));
        assert_eq!(answer, "B, C");

        let answer = resolve_canonical_answer(&raw(json!({
            "choices": [[{"correct": false}]],
            "explains": {"text": "见解析"},
            "answer": "D"
        })));
        assert_eq!(answer, r#"{"text":"见解析"}"#);

        let answer = resolve_canonical_answer(&raw(json!({"answer": "D"})));
        assert_eq!(answer, "D");

        let answer = resolve_canonical_answer(&raw(json!({
            "extendedBlanks": [["3", "三"], [], ["5"]]
        })));
        assert_eq!(answer, "3, 5");

        let answer = resolve_canonical_answer(&raw(json!({"explains": ""})));
        assert_eq!(answer, ANSWER_UNAVAILABLE);
    }
}
