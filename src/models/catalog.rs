//! 学科 / 学段 / 题型 ID 到名称的静态映射
//!
//! 未知 ID 一律返回空串。

use phf::phf_map;
use serde_json::Value;

static SUBJECTS: phf::Map<u32, &'static str> = phf_map! {
    1u32 => "数学",
    2u32 => "物理",
    3u32 => "语文",
    4u32 => "化学",
    5u32 => "英语",
    6u32 => "生物",
    7u32 => "地理",
    8u32 => "自然",
    9u32 => "地球",
    10u32 => "实验",
    11u32 => "道德与法治",
    12u32 => "历史",
    13u32 => "信息技术",
    14u32 => "理化生实验",
    15u32 => "体育与健康",
    16u32 => "素养",
};

static STAGES: phf::Map<u32, &'static str> = phf_map! {
    1u32 => "小学",
    2u32 => "初中",
    3u32 => "高中",
    4u32 => "中职",
};

static QUESTION_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "single_choice" => "单选题",
    "multi_choice" => "多选题",
    "hybrid" => "下拉菜单+填空题",
    "multi_blank" => "填空题",
    "exam" => "主观题",
    "combination" => "组合题",
};

/// 学科名称
pub fn subject_name(id: Option<&Value>) -> &'static str {
    numeric_id(id)
        .and_then(|id| SUBJECTS.get(&id).copied())
        .unwrap_or_default()
}

/// 学段名称
pub fn stage_name(id: Option<&Value>) -> &'static str {
    numeric_id(id)
        .and_then(|id| STAGES.get(&id).copied())
        .unwrap_or_default()
}

/// 题型名称
pub fn question_type_name(id: Option<&str>) -> &'static str {
    id.and_then(|id| QUESTION_TYPES.get(id).copied())
        .unwrap_or_default()
}

/// 接口里的 ID 可能是数字也可能是数字字符串
fn numeric_id(id: Option<&Value>) -> Option<u32> {
    match id? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
