//! 导出服务 - 业务能力层
//!
//! 只负责"把结果行写到文件"，不关心流程

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ExportRow;

/// 导出端
pub trait ExportSink {
    /// 写出全部结果行，返回产物位置
    fn export(&self, rows: &[ExportRow]) -> AppResult<PathBuf>;
}

/// 以 JSON 数组格式导出
///
/// 文件名为 `<文件名主干>_<YYYYmmdd_HHMMSS>.json`，每次运行生成新文件。
pub struct JsonExporter {
    output_dir: PathBuf,
    file_stem: String,
}

impl JsonExporter {
    pub fn new(config: &Config) -> Self {
        Self::with_path(&config.output_dir, &config.output_filename)
    }

    pub fn with_path(output_dir: impl AsRef<Path>, filename: &str) -> Self {
        let file_stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("problem_solutions")
            .to_string();

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            file_stem,
        }
    }

    fn target_path(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir
            .join(format!("{}_{}.json", self.file_stem, timestamp))
    }
}

impl ExportSink for JsonExporter {
    fn export(&self, rows: &[ExportRow]) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let path = self.target_path();
        let content = serde_json::to_string_pretty(rows)
            .map_err(|e| AppError::file_serialize_failed(path.display().to_string(), e))?;
        debug!("导出 {} 行，{} 字节", rows.len(), content.len());

        fs::write(&path, content)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!("📁 结果已导出至: {}", path.display());
        Ok(path)
    }
}
