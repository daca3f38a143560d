use crate::error::{AppError, AppResult, FileError};
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载题目ID
///
/// 文件结构为两层映射：`{学段: {学科: [题目ID, ...]}}`。
/// 只做展平，按文件中出现的顺序返回；不合规的节点跳过并记录警告。
pub async fn load_question_ids(path: &Path) -> AppResult<Vec<String>> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let tree: Map<String, Value> =
        serde_json::from_str(&content).map_err(|e| FileError::JsonParseFailed {
            path: path_str.clone(),
            source: e,
        })?;

    let ids = flatten_id_tree(&tree);
    tracing::info!("从 {} 加载了 {} 个题目ID", path_str, ids.len());
    Ok(ids)
}

/// 展平 `学段 → 学科 → [ID]` 结构
pub fn flatten_id_tree(tree: &Map<String, Value>) -> Vec<String> {
    let mut ids = Vec::new();

    for (stage, subjects) in tree {
        let Some(subjects) = subjects.as_object() else {
            tracing::warn!("学段 {} 的内容不是对象，已跳过", stage);
            continue;
        };
        for (subject, list) in subjects {
            let Some(list) = list.as_array() else {
                tracing::warn!("{}/{} 的内容不是数组，已跳过", stage, subject);
                continue;
            };
            for id in list {
                match id {
                    Value::String(s) if !s.trim().is_empty() => ids.push(s.trim().to_string()),
                    Value::Number(n) => ids.push(n.to_string()),
                    other => tracing::warn!("{}/{} 中存在无效ID: {}", stage, subject, other),
                }
            }
        }
    }

    ids
}
