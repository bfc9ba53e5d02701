//! 响应规范化 - 业务能力层
//!
//! 把模型返回的原始文本变成 JSON 对象：
//! 去掉 Markdown 代码块、去掉结尾多余逗号，再解析。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ContentError;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[a-zA-Z]*\n?").expect("valid regex"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```$").expect("valid regex"));

/// 规范化并解析模型响应
pub fn normalize(raw: &str) -> Result<Map<String, Value>, ContentError> {
    let text = strip_fences(raw);
    let text = strip_trailing_commas(&text);

    let value: Value =
        serde_json::from_str(&text).map_err(|source| ContentError::InvalidJson { source })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ContentError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// 去掉首尾的 ``` 代码块标记（可带语言标签）
pub fn strip_fences(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    let text = OPENING_FENCE.replace(text, "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.trim().to_string()
}

/// 删除紧跟在 `]` 或 `}` 之前的逗号（字符串内部的逗号保持不变）
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_response_with_trailing_comma() {
        let map = normalize("```json\n{\"a\":1,}\n```").unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let map = normalize("  ```\n{\"a\": \"b\"}\n```  ").unwrap();
        assert_eq!(map["a"], "b");
    }

    #[test]
    fn test_trailing_comma_in_array() {
        let map = normalize(r#"{"a": [1,2,]}"#).unwrap();
        assert_eq!(Value::Object(map), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_trailing_comma_before_whitespace() {
        let map = normalize("{\n  \"a\": [\"x\",\n  ],\n  \"b\": 2,\n}").unwrap();
        assert_eq!(Value::Object(map), json!({"a": ["x"], "b": 2}));
    }

    #[test]
    fn test_comma_inside_string_is_kept() {
        let map = normalize(r#"{"a": "x,]", "b": "y, }", "c": "q\",]"}"#).unwrap();
        assert_eq!(map["a"], "x,]");
        assert_eq!(map["b"], "y, }");
        assert_eq!(map["c"], "q\",]");
    }

    #[test]
    fn test_plain_json_unchanged() {
        let raw = r#"{"items": ["a, b", "c"], "n": 3}"#;
        assert_eq!(strip_trailing_commas(raw), raw);
        assert_eq!(strip_fences(raw), raw);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            normalize("Hier ist dein JSON: {"),
            Err(ContentError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_non_object_is_error() {
        match normalize("[1, 2, 3]") {
            Err(ContentError::NotAnObject { found }) => assert_eq!(found, "array"),
            other => panic!("应该拒绝非对象, 实际: {:?}", other),
        }
    }
}
