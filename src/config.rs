use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 并发数的合法范围
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 10;

/// 默认提示词模板
///
/// 占位符：`{subject}` `{grade}` `{type}` `{question}` `{correctAnswers}`
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"你作为一名专业的<subject>{subject}</subject><grade>{grade}</grade>老师，要解答<type>{type}</type>题目。

题目是：<question>{question}</question>

请按照考试答题标准，给出详细的解题过程，并得出最终答案。在完成解题后，将解得的答案与标准答案<correctAnswers>{correctAnswers}</correctAnswers>进行对比，确保作答正确，如果答案不一致需要重新作答。

【重要】：本题目可能包含图片和选项。如果你看到了图片，请首先详细描述图片中的内容，然后再进行解题。图片可能出现在题目或标准答案中，请仔细观察并利用图片中的信息进行解答。如果你没有看到图片，请明确说明。

如果题目是选择题，请分析每个选项，说明为什么选择或排除该选项。最终答案应该是选项的字母（如A、B、C、D）。

请在<解题>标签内写下详细的解题过程和最终答案，在<对比>标签内说明答案与标准答案对比的情况，是否一致。

<解题>

[在此详细写出解题过程和最终答案]

</解题>

请在<讲解>标签内写下本题考察的{grade}{subject}知识点或考点，以及解题思路。

<讲解>

[在此详细写出本题考察的知识点或考点以及解题思路等等有助于学生理解这道题的信息]

</讲解>

请确保解题过程详细，符合考试答题规范，答案准确。"#;

/// 程序配置
///
/// 优先级从低到高：默认值 → TOML 配置文件 → 环境变量 → 命令行参数。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 题库 API 配置 ---
    pub problem_api_url: String,
    /// 每批请求的题目数量
    pub batch_size: usize,
    /// 两批之间的间隔（秒）
    pub batch_delay_secs: u64,
    pub fetch_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub prompt_template: String,
    /// 是否把图片作为多模态内容发送给模型
    pub enable_multimodal: bool,
    /// 单次 LLM 请求的超时（秒）
    pub llm_timeout_secs: u64,
    // --- 重试与并发 ---
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// 同时解题的数量
    pub max_workers: usize,
    // --- 输出 ---
    pub output_dir: String,
    pub output_filename: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            problem_api_url:
                "https://api-test.yangcong345.com/study-course/problem/getDetailProblems"
                    .to_string(),
            batch_size: 50,
            batch_delay_secs: 1,
            fetch_timeout_secs: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            llm_model_name: "ep-20250208102341-sjk9f".to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            enable_multimodal: true,
            llm_timeout_secs: 60,
            max_retries: 3,
            retry_delay_secs: 2,
            max_workers: 5,
            output_dir: "output".to_string(),
            output_filename: "problem_solutions.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值，再叠加环境变量
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(&display, e))?;
        let config: Config = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: display,
            source: e,
        })?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        let current = self;
        Self {
            problem_api_url: env_or("PROBLEM_API_URL", current.problem_api_url),
            llm_api_key: env_or("ARK_API_KEY", current.llm_api_key),
            llm_api_base_url: env_or("ARK_API_BASE_URL", current.llm_api_base_url),
            llm_model_name: env_or("ARK_API_MODEL", current.llm_model_name),
            enable_multimodal: env_parse("ENABLE_MULTIMODAL", current.enable_multimodal),
            max_workers: env_parse("MAX_WORKERS", current.max_workers),
            output_dir: env_or("OUTPUT_DIR", current.output_dir),
            verbose_logging: env_parse("VERBOSE_LOGGING", current.verbose_logging),
            ..current
        }
    }

    /// 运行前检查，避免在网络请求之后才发现配置问题
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }
        if self.prompt_template.trim().is_empty() {
            return Err(ConfigError::EmptyPromptTemplate.into());
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "batch_size".to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 把并发数限制在 1~10
    pub fn clamp_workers(requested: usize) -> usize {
        let clamped = requested.clamp(MIN_WORKERS, MAX_WORKERS);
        if clamped != requested {
            warn!(
                "并发数 {} 超出范围 [{}, {}]，已调整为 {}",
                requested, MIN_WORKERS, MAX_WORKERS, clamped
            );
        }
        clamped
    }
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key).unwrap_or(fallback)
}

/// 无法解析的值忽略，沿用原配置
fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = Config::default();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_secs, 2);
        assert_eq!(config.llm_timeout_secs, 60);
        assert!(config.enable_multimodal);
        assert!(config.prompt_template.contains("{correctAnswers}"));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(AppError::Config(ConfigError::MissingApiKey))
        ));

        let config = Config {
            llm_api_key: "key".to_string(),
            ..Config::default()
        };
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_clamp_workers() {
        assert_eq!(Config::clamp_workers(0), 1);
        assert_eq!(Config::clamp_workers(4), 4);
        assert_eq!(Config::clamp_workers(32), 10);
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 20\nmax_retries = 5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"many\"").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }
}
