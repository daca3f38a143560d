/// 日志工具模块
///
/// 提供运行横幅和日志格式化的辅助函数
use std::path::Path;
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `max_workers`: 最大并发数
pub fn log_startup(max_workers: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 大模型批量解题模式");
    info!(
        "🕐 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 最大并发数: {}", max_workers);
    info!("{}", "=".repeat(60));
}

/// 记录题目加载信息
pub fn log_questions_loaded(total: usize, max_workers: usize) {
    info!("✓ 共 {} 道题待解答", total);
    info!("📋 最多同时解答 {} 道题\n", max_workers);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `export_path`: 导出文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, export_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", export_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
        assert_eq!(truncate_text("一二三", 3), "一二三");
        assert_eq!(truncate_text("", 0), "");
    }
}
