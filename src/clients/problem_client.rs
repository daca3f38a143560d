/// 题库 API 客户端
///
/// 只负责一次 HTTP 往返，分批、重试和字段解析都在 `ProblemFetcher` 中完成。
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::ProblemSource;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{ProblemQuery, ProblemsResponse};

pub struct ProblemClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProblemClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.problem_api_url, e))?;

        Ok(Self {
            http,
            endpoint: config.problem_api_url.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ProblemSource for ProblemClient {
    async fn fetch_batch(&self, ids: &[String]) -> AppResult<Vec<Value>> {
        let body = serde_json::to_string(&ProblemQuery { ids })?;
        debug!("请求题库接口 {}，ID 数量: {}", self.endpoint, ids.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json;charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let payload: ProblemsResponse = response.json().await.map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                source: Box::new(e),
            })
        })?;

        debug!("题库接口返回 {} 道题", payload.problems.len());
        Ok(payload.problems)
    }
}
