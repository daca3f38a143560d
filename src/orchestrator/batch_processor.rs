//! 批量解题器 - 编排层
//!
//! ## 职责
//!
//! 1. **加载题目ID**：展平题目ID文件
//! 2. **获取题目**：委托 `ProblemFetcher` 分批获取
//! 3. **并发解题**：所有题目一次性提交，Semaphore 限制同时运行的数量
//! 4. **组装导出**：合并结果并交给导出端
//!
//! 单道题失败（包括 panic）只影响这一道题的结果；没有题目ID或没有取到任何题目时
//! 整次运行失败，不会导出任何文件。

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::clients::{ChatBackend, LlmClient, ProblemClient, ProblemSource};
use crate::config::Config;
use crate::error::{AppResult, PipelineError};
use crate::models::{load_question_ids, AnswerResult, ExportRow, QuestionRecord};
use crate::services::{ExportSink, JsonExporter, ProblemFetcher, Solver, SOLVE_FAILED_SENTINEL};
use crate::utils::logging::{log_questions_loaded, log_startup, print_final_stats};
use crate::workflow::{assemble, milestone, ProgressReporter, SolveCtx};

/// 一次运行所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    LoadingIds,
    Fetching,
    Solving,
    Assembling,
    Done,
    Failed,
}

/// 一次成功运行的产物
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows: Vec<ExportRow>,
    pub export_path: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
}

/// 使用真实题库接口、LLM 接口和 JSON 导出的批量解题器
pub type App = BatchSolver<ProblemClient, LlmClient, JsonExporter>;

pub struct BatchSolver<S, B, E> {
    fetcher: ProblemFetcher<S>,
    solver: Arc<Solver<B>>,
    exporter: E,
    max_workers: usize,
    progress: ProgressReporter,
    state: RunState,
}

impl App {
    /// 按配置创建各客户端
    pub fn initialize(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let source = ProblemClient::new(config)?;
        Ok(Self::new(
            config,
            source,
            LlmClient::new(config),
            JsonExporter::new(config),
        ))
    }
}

impl<S, B, E> BatchSolver<S, B, E>
where
    S: ProblemSource,
    B: ChatBackend + 'static,
    E: ExportSink,
{
    pub fn new(config: &Config, source: S, backend: B, exporter: E) -> Self {
        Self {
            fetcher: ProblemFetcher::new(source, config),
            solver: Arc::new(Solver::new(backend, config)),
            exporter,
            max_workers: Config::clamp_workers(config.max_workers),
            progress: ProgressReporter::silent(),
            state: RunState::Idle,
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 运行完整流程，致命错误时进入 `Failed` 并返回错误
    pub async fn run(&mut self, ids_file: &Path) -> AppResult<RunReport> {
        log_startup(self.max_workers);

        match self.run_stages(ids_file).await {
            Ok(report) => {
                self.state = RunState::Done;
                self.progress.report(milestone::DONE, "处理完成！");
                print_final_stats(
                    report.succeeded,
                    report.failed,
                    report.rows.len(),
                    &report.export_path,
                );
                Ok(report)
            }
            Err(e) => {
                error!("❌ 运行失败（阶段 {:?}）: {}", self.state, e);
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self, ids_file: &Path) -> AppResult<RunReport> {
        self.state = RunState::LoadingIds;
        self.progress.report(milestone::LOADING_IDS, "正在加载问题ID...");
        let ids = load_question_ids(ids_file).await?;
        if ids.is_empty() {
            return Err(PipelineError::NoQuestionIds {
                path: ids_file.display().to_string(),
            }
            .into());
        }
        self.progress
            .report(milestone::IDS_LOADED, &format!("已加载 {} 个问题ID", ids.len()));

        self.state = RunState::Fetching;
        self.progress.report(milestone::FETCHING, "正在获取问题数据...");
        let records = self.fetcher.fetch(&ids).await;
        if records.is_empty() {
            return Err(PipelineError::NoQuestionsFetched {
                requested: ids.len(),
            }
            .into());
        }
        if records.len() < ids.len() {
            warn!("⚠️ {} 个题目ID没有取到数据", ids.len() - records.len());
        }
        self.progress.report(
            milestone::FETCHED,
            &format!("已获取 {} 个问题数据", records.len()),
        );

        self.state = RunState::Solving;
        log_questions_loaded(records.len(), self.max_workers);
        self.progress
            .report(milestone::SOLVING, "开始使用大模型解题...");
        let answers = self.solve_all(&records).await;
        let succeeded = answers.iter().filter(|a| a.is_success()).count();

        self.state = RunState::Assembling;
        self.progress.report(milestone::SOLVED, "正在格式化数据...");
        let rows = assemble(&records, &answers);

        self.progress.report(milestone::EXPORTING, "正在导出结果...");
        let export_path = self.exporter.export(&rows)?;

        Ok(RunReport {
            failed: rows.len() - succeeded,
            succeeded,
            rows,
            export_path,
        })
    }

    /// 并发解答所有题目，返回顺序与 `records` 一致，且每道题恰好一个结果
    pub async fn solve_all(&self, records: &[QuestionRecord]) -> Vec<AnswerResult> {
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        info!("开始解题: 共 {} 题，并发数 {}", total, self.max_workers);

        for (index, record) in records.iter().cloned().enumerate() {
            let solver = Arc::clone(&self.solver);
            let semaphore = Arc::clone(&semaphore);
            let ctx = SolveCtx::new(&record.id, index + 1, total);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = AssertUnwindSafe(solver.try_solve(&record))
                    .catch_unwind()
                    .await;

                let result = match outcome {
                    Ok(Ok(answer)) => AnswerResult::answered(&record.id, answer),
                    Ok(Err(e)) => {
                        error!("{} ❌ 解题失败: {}", ctx, e);
                        AnswerResult::failed(&record.id, SOLVE_FAILED_SENTINEL)
                    }
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        error!("{} ❌ 解题任务异常: {}", ctx, reason);
                        AnswerResult::failed(&record.id, format!("解题失败: {}", reason))
                    }
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<AnswerResult>> = vec![None; total];
        let mut done = 0;

        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok((index, result)) => {
                    info!(
                        "进度: {}/{} - 题目 {} {}",
                        done,
                        total,
                        result.question_id,
                        if result.is_success() { "✓" } else { "✗" }
                    );
                    slots[index] = Some(result);
                }
                Err(e) => error!("解题任务执行失败: {}", e),
            }
            self.progress.report_solved(done, total);
        }

        slots
            .into_iter()
            .zip(records)
            .map(|(slot, record)| {
                slot.unwrap_or_else(|| AnswerResult::failed(&record.id, "解题失败: 任务未完成"))
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知错误".to_string()
    }
}
