//! 题库接口的原始数据结构
//!
//! 字段形状在不同题型之间并不统一（答案可能是字符串、数组或对象），
//! 这些字段保留为 `serde_json::Value`，由题库适配层统一解析。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 批量查询请求体
#[derive(Debug, Clone, Serialize)]
pub struct ProblemQuery<'a> {
    pub ids: &'a [String],
}

/// 批量查询响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemsResponse {
    /// 每道题单独解析，单题格式异常不影响同批其它题目
    #[serde(default)]
    pub problems: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProblem {
    pub id: Option<Value>,
    pub body: Option<String>,
    pub subproblems: Vec<RawSubproblem>,
    pub subject_id: Option<Value>,
    pub stage_id: Option<Value>,
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
    pub correct_answers: Option<Value>,
    pub correct_answer: Option<Value>,
    /// 选项组，通常只有一组：`[[{"correct": true, ...}, ...]]`
    pub choices: Option<Value>,
    pub explains: Option<Value>,
    pub answer: Option<Value>,
    /// 每个空的可接受答案列表：`[["3", "三"], ["5"]]`
    pub extended_blanks: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSubproblem {
    pub body: Option<String>,
}

impl RawProblem {
    /// 题目ID，数字ID转为字符串；缺失或为空时返回 None
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// 与 Python 的真值判断一致：null、空串、空数组、空对象、false 视为"没有值"
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_problem_with_mixed_fields() {
        let raw: RawProblem = serde_json::from_value(json!({
            "id": "p1",
            "body": "<p>题干</p>",
            "subproblems": [{"body": "(1)"}, {"body": null}],
            "subjectId": 1,
            "stageId": "2",
            "type": "single_choice",
            "correctAnswers": ["A"],
            "unknownField": {"ignored": true}
        }))
        .unwrap();

        assert_eq!(raw.id_string().as_deref(), Some("p1"));
        assert_eq!(raw.subproblems.len(), 2);
        assert_eq!(raw.problem_type.as_deref(), Some("single_choice"));
        assert!(raw.correct_answer.is_none());
    }

    #[test]
    fn test_numeric_id() {
        let raw: RawProblem = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(raw.id_string().as_deref(), Some("42"));
        let raw: RawProblem = serde_json::from_value(json!({"id": "  "})).unwrap();
        assert_eq!(raw.id_string(), None);
    }

    #[test]
    fn test_is_present() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!({})));
        assert!(is_present(&json!("A")));
        assert!(is_present(&json!(0)));
    }
}
