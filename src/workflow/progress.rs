//! 进度上报
//!
//! 百分比只增不减；仅用于展示，不影响流程。

use std::sync::{Arc, Mutex};
use tracing::info;

/// 各阶段的固定进度
pub mod milestone {
    pub const LOADING_IDS: u8 = 0;
    pub const IDS_LOADED: u8 = 5;
    pub const FETCHING: u8 = 10;
    pub const FETCHED: u8 = 20;
    pub const SOLVING: u8 = 25;
    pub const SOLVED: u8 = 90;
    pub const EXPORTING: u8 = 95;
    pub const DONE: u8 = 100;
}

pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    current: Arc<Mutex<u8>>,
}

impl ProgressReporter {
    pub fn new(callback: impl Fn(u8, &str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
            current: Arc::default(),
        }
    }

    /// 只写日志
    pub fn silent() -> Self {
        Self::default()
    }

    /// 上报进度，小于当前值时保持当前值
    pub fn report(&self, percent: u8, message: &str) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = (*current).max(percent.min(milestone::DONE));

        info!("[{:>3}%] {}", *current, message);
        if let Some(callback) = &self.callback {
            callback(*current, message);
        }
    }

    /// 解题阶段按完成比例在 25%~90% 之间线性插值
    pub fn report_solved(&self, done: usize, total: usize) {
        let span = usize::from(milestone::SOLVED - milestone::SOLVING);
        let step = if total == 0 { span } else { span * done.min(total) / total };
        let percent = milestone::SOLVING + step as u8;
        self.report(percent, &format!("已处理 {}/{} 个问题", done, total));
    }

    pub fn current(&self) -> u8 {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
