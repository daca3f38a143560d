//! 解题服务
//!
//! 只负责"一道题 → 一段回答"：填充提示词、附加图片、带超时和重试地调用大模型。
//! 返回模型原文，不做任何规范化；失败时返回固定的失败文本，不向上抛错。

use regex::{Captures, Regex};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::clients::ChatBackend;
use crate::config::Config;
use crate::error::{AppResult, LlmError};
use crate::models::QuestionRecord;
use crate::utils::logging::truncate_text;
use crate::utils::markup::resolve_image_url;
use crate::utils::retry::RetryPolicy;

/// 重试用尽后的回答
pub const SOLVE_FAILED_SENTINEL: &str = "错误：大模型API调用失败";

/// 标准答案为空时填进提示词的文本
pub const NO_REFERENCE_ANSWER: &str = "未提供标准答案";

/// 非多模态模式下追加在提示词后的说明
pub const IMAGE_LINK_NOTE: &str = "[题目或答案包含图片，请结合图片链接作答]";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{(subject|grade|type|question|correctAnswers)\}")
        .unwrap_or_else(|e| panic!("内置正则非法: {e}"))
});

/// 提示词模板
///
/// 支持 `{subject}` `{grade}` `{type}` `{question}` `{correctAnswers}` 五个占位符，
/// `{{` / `}}` 转义为字面花括号，其余内容原样保留。
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 一次性替换，替换进去的内容不会再被当作占位符
    pub fn render(&self, record: &QuestionRecord) -> String {
        let answer = if record.canonical_answer.trim().is_empty() {
            NO_REFERENCE_ANSWER
        } else {
            record.canonical_answer.as_str()
        };

        PLACEHOLDER_RE
            .replace_all(&self.template, |caps: &Captures| {
                match caps.get(1).map(|m| m.as_str()) {
                    Some("subject") => record.subject.clone(),
                    Some("grade") => record.stage.clone(),
                    Some("type") => record.question_type.clone(),
                    Some("question") => record.stem.clone(),
                    Some("correctAnswers") => answer.to_string(),
                    _ => caps[0][..1].to_string(),
                }
            })
            .into_owned()
    }
}

pub struct Solver<B> {
    backend: B,
    template: PromptTemplate,
    multimodal: bool,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl<B: ChatBackend> Solver<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            template: PromptTemplate::new(config.prompt_template.clone()),
            multimodal: config.enable_multimodal,
            retry: RetryPolicy::from_config(config),
            call_timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 解答一道题，失败时返回 [`SOLVE_FAILED_SENTINEL`]
    pub async fn solve(&self, record: &QuestionRecord) -> String {
        match self.try_solve(record).await {
            Ok(answer) => answer,
            Err(_) => SOLVE_FAILED_SENTINEL.to_string(),
        }
    }

    /// 解答一道题，返回最后一次失败的错误
    pub async fn try_solve(&self, record: &QuestionRecord) -> AppResult<String> {
        let (prompt, images) = self.build_request(record);
        info!("🤖 开始解答题目 {}（图片 {} 张）", record.id, images.len());
        debug!("提示词: {}", truncate_text(&prompt, 200));

        let backend = &self.backend;
        let limit = self.call_timeout;
        let prompt = prompt.as_str();
        let images = images.as_slice();
        let label = format!("题目 {} 的LLM请求", record.id);

        let answer = self
            .retry
            .run(&label, move |_| async move {
                match timeout(limit, backend.complete(prompt, images)).await {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout {
                        secs: limit.as_secs(),
                    }
                    .into()),
                }
            })
            .await?;

        info!("✓ 题目 {} 解答完成", record.id);
        Ok(answer)
    }

    /// 返回 (提示词, 随请求发送的图片)
    ///
    /// 多模态模式下图片作为独立内容发送；否则以链接列表追加到提示词末尾。
    pub fn build_request(&self, record: &QuestionRecord) -> (String, Vec<String>) {
        let mut prompt = self.template.render(record);
        let images: Vec<String> = record.all_images().map(|url| resolve_image_url(url)).collect();

        if self.multimodal || images.is_empty() {
            return (prompt, images);
        }

        prompt.push_str("\n\n");
        prompt.push_str(IMAGE_LINK_NOTE);
        for (i, url) in images.iter().enumerate() {
            prompt.push_str(&format!("\n图片{}: {}", i + 1, url));
        }
        (prompt, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// 前 `fail_times` 次调用失败，之后返回固定回答
    #[derive(Default)]
    struct ScriptedBackend {
        fail_times: u32,
        hang: bool,
        reply: String,
        calls: AtomicU32,
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, prompt: &str, images: &[String]) -> AppResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), images.to_vec()));

            if self.hang {
                std::future::pending::<()>().await;
            }
            if call <= self.fail_times {
                return Err(AppError::llm_api_failed(
                    "fake",
                    std::io::Error::other("HTTP 502"),
                ));
            }
            Ok(self.reply.clone())
        }
    }

    fn record() -> QuestionRecord {
        QuestionRecord {
            id: "q1".to_string(),
            stem: "1+1=?".to_string(),
            stem_images: vec!["//cdn/a.png".to_string(), "img/b.png".to_string()],
            canonical_answer: "2".to_string(),
            answer_images: vec!["https://cdn/c.png".to_string()],
            subject: "数学".to_string(),
            stage: "小学".to_string(),
            question_type: "填空题".to_string(),
        }
    }

    fn config(template: &str, multimodal: bool) -> Config {
        Config {
            prompt_template: template.to_string(),
            enable_multimodal: multimodal,
            ..Config::default()
        }
    }

    #[test]
    fn test_template_substitutes_all_placeholders() {
        let template =
            PromptTemplate::new("{grade}{subject}{type}：{question} 答案{correctAnswers} {{x}}");
        assert_eq!(
            template.render(&record()),
            "小学数学填空题：1+1=? 答案2 {x}"
        );
    }

    #[test]
    fn test_template_is_single_pass() {
        let mut record = record();
        record.stem = "求{correctAnswers}".to_string();
        let template = PromptTemplate::new("{question}|{correctAnswers}|{unknown}");
        assert_eq!(template.render(&record), "求{correctAnswers}|2|{unknown}");
    }

    #[test]
    fn test_empty_answer_renders_placeholder_text() {
        let mut record = record();
        record.canonical_answer = String::new();
        record.subject = String::new();
        let template = PromptTemplate::new("[{subject}]{correctAnswers}");
        assert_eq!(template.render(&record), format!("[]{NO_REFERENCE_ANSWER}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let backend = ScriptedBackend {
            fail_times: 2,
            reply: "  答案是2\n".to_string(),
            ..ScriptedBackend::default()
        };
        let solver = Solver::new(backend, &config("{question}", true));

        let answer = solver.solve(&record()).await;
        assert_eq!(answer, "  答案是2\n");
        assert_eq!(solver.backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_attempts_fail_returns_sentinel() {
        let backend = ScriptedBackend {
            fail_times: u32::MAX,
            ..ScriptedBackend::default()
        };
        let solver = Solver::new(backend, &config("{question}", true));

        assert_eq!(solver.solve(&record()).await, SOLVE_FAILED_SENTINEL);
        assert_eq!(solver.backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_call_times_out_and_is_retried() {
        let backend = ScriptedBackend {
            hang: true,
            ..ScriptedBackend::default()
        };
        let solver = Solver::new(backend, &config("{question}", true));

        let err = solver.try_solve(&record()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Timeout { secs: 60 })));
        assert_eq!(solver.backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_multimodal_attaches_resolved_images_in_order() {
        let backend = ScriptedBackend {
            reply: "ok".to_string(),
            ..ScriptedBackend::default()
        };
        let solver = Solver::new(backend, &config("{question}", true));
        solver.solve(&record()).await;

        let seen = solver.backend.seen.lock().unwrap();
        let (prompt, images) = &seen[0];
        assert_eq!(prompt, "1+1=?");
        assert_eq!(
            images,
            &[
                "https://cdn/a.png".to_string(),
                "https://img/b.png".to_string(),
                "https://cdn/c.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_text_mode_appends_image_links() {
        let solver = Solver::new(ScriptedBackend::default(), &config("{question}", false));
        let (prompt, images) = solver.build_request(&record());

        assert!(images.is_empty());
        assert_eq!(
            prompt,
            format!(
                "1+1=?\n\n{IMAGE_LINK_NOTE}\n图片1: https://cdn/a.png\n图片2: https://img/b.png\n图片3: https://cdn/c.png"
            )
        );
    }

    #[test]
    fn test_text_mode_without_images_leaves_prompt_alone() {
        let mut record = record();
        record.stem_images.clear();
        record.answer_images.clear();
        let solver = Solver::new(ScriptedBackend::default(), &config("{question}", false));
        assert_eq!(solver.build_request(&record), ("1+1=?".to_string(), Vec::new()));
    }
}
