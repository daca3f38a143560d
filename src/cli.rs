//! 命令行参数
//!
//! 命令行参数优先级最高，会覆盖配置文件和环境变量中的同名配置。

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Parser, Debug)]
#[command(
    name = "auto_problem_solver",
    version,
    about = "使用大模型批量解答题库中的题目，并导出解答结果"
)]
pub struct Cli {
    /// 题目ID文件（JSON：学段 → 学科 → ID 列表）
    #[arg(long)]
    pub problem_ids_file: PathBuf,

    /// 大模型 API 密钥（默认读取 ARK_API_KEY）
    #[arg(long)]
    pub api_key: Option<String>,

    /// 模型 ID（默认读取 ARK_API_MODEL）
    #[arg(long)]
    pub model_id: Option<String>,

    /// 提示词模板
    #[arg(long, conflicts_with = "prompt_template_file")]
    pub prompt_template: Option<String>,

    /// 从文件读取提示词模板
    #[arg(long)]
    pub prompt_template_file: Option<PathBuf>,

    /// 最大并发数（1-10）
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// 不以多模态方式发送图片，改为在提示词中附图片链接
    #[arg(long)]
    pub disable_multimodal: bool,

    /// 输出目录
    #[arg(long)]
    pub output_dir: Option<String>,

    /// TOML 配置文件
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 依次叠加 默认值 → 配置文件 → 环境变量 → 命令行参数
    pub fn load_config(&self) -> AppResult<Config> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::from_env(),
        };
        self.apply(config)
    }

    fn apply(&self, mut config: Config) -> AppResult<Config> {
        if let Some(key) = &self.api_key {
            config.llm_api_key = key.clone();
        }
        if let Some(model) = &self.model_id {
            config.llm_model_name = model.clone();
        }
        if let Some(template) = &self.prompt_template {
            config.prompt_template = template.clone();
        }
        if let Some(path) = &self.prompt_template_file {
            let display = path.display().to_string();
            config.prompt_template = std::fs::read_to_string(path)
                .map_err(|e| AppError::file_read_failed(display, e))?;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
        if self.disable_multimodal {
            config.enable_multimodal = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.verbose_logging |= self.verbose;
        Ok(config)
    }
}
