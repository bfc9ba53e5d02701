//! 响应 schema
//!
//! 每种内容类型的字段集合以声明式的 [`Schema`] 描述，与提示词正文分开：
//! - 提示词中嵌入 [`Schema::skeleton`] 生成的 JSON 骨架
//! - 解析后的响应用 [`Schema::validate`] 检查字段
//! - 模板填充按字段形状渲染（标量 / 列表 / 表格行）

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ContentError;
use crate::models::content::ContentKind;
use crate::models::subject::Level;

/// 练习 A–F
const TASK_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];
/// 小复习 A–E
const SECTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
/// 每个练习的题目数
const TASK_ITEMS: usize = 15;
/// 单元总分，与 6 × 15 对应
const UNIT_MARKS: u32 = 90;
const REVIEW_ITEMS: usize = 10;
const REVIEW_MARKS: u32 = 50;
const FINAL_ITEMS: usize = 50;
const FINAL_MARKS: u32 = 150;

/// 字段形状
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    /// 标量；骨架中的值为预填值或空字符串
    Scalar(Value),
    /// 字符串列表，渲染为 `<li>`
    Items(usize),
    /// 表格行，渲染为 `<tr>`
    Rows { rows: usize, cols: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub shape: FieldShape,
}

/// 一种内容类型的完整字段集合（有序）
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: ContentKind,
    fields: Vec<FieldSpec>,
}

/// 单元元信息
#[derive(Debug, Clone, Copy)]
pub struct UnitMeta<'a> {
    pub level: &'a Level,
    pub unit_number: usize,
    pub unit_title: &'a str,
}

impl Schema {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    fn push(mut self, name: impl Into<String>, shape: FieldShape) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            shape,
        });
        self
    }

    pub fn scalar(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, FieldShape::Scalar(value.into()))
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.scalar(name, "")
    }

    pub fn items(self, name: impl Into<String>, count: usize) -> Self {
        self.push(name, FieldShape::Items(count))
    }

    pub fn rows(self, name: impl Into<String>, rows: usize, cols: usize) -> Self {
        self.push(name, FieldShape::Rows { rows, cols })
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// 生成嵌入提示词的 JSON 骨架（叶子为空字符串或预填值）
    pub fn skeleton(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            let value = match &field.shape {
                FieldShape::Scalar(v) => v.clone(),
                FieldShape::Items(n) => Value::Array(vec![Value::from(""); *n]),
                FieldShape::Rows { rows, cols } => {
                    let row = Value::Array(vec![Value::from(""); *cols]);
                    Value::Array(vec![row; *rows])
                }
            };
            map.insert(field.name.clone(), value);
        }
        Value::Object(map)
    }

    /// 检查响应是否提供了所有字段且形状正确
    ///
    /// 数量不符（列表长度、列数）只记录警告：内容数量由模型负责。
    pub fn validate(&self, payload: &Map<String, Value>) -> Result<(), ContentError> {
        let kind = self.kind.name();
        for field in &self.fields {
            let value = payload.get(&field.name).ok_or_else(|| ContentError::MissingField {
                kind: kind.to_string(),
                field: field.name.clone(),
            })?;

            let wrong_shape = |expected: &'static str| ContentError::WrongShape {
                kind: kind.to_string(),
                field: field.name.clone(),
                expected,
            };

            match &field.shape {
                FieldShape::Scalar(_) => {
                    if !is_text(value) {
                        return Err(wrong_shape("字符串或数字"));
                    }
                }
                FieldShape::Items(n) => {
                    let items = value
                        .as_array()
                        .filter(|a| a.iter().all(is_text))
                        .ok_or_else(|| wrong_shape("字符串数组"))?;
                    if items.len() != *n {
                        warn!("{} 字段 {} 有 {} 项，schema 要求 {}", kind, field.name, items.len(), n);
                    }
                }
                FieldShape::Rows { rows, cols } => {
                    let table = value
                        .as_array()
                        .filter(|a| {
                            a.iter()
                                .all(|r| r.as_array().is_some_and(|cells| cells.iter().all(is_text)))
                        })
                        .ok_or_else(|| wrong_shape("二维字符串数组"))?;
                    if table.len() != *rows {
                        warn!("{} 字段 {} 有 {} 行，schema 要求 {}", kind, field.name, table.len(), rows);
                    }
                    if table.iter().any(|r| r.as_array().map(Vec::len) != Some(*cols)) {
                        warn!("{} 字段 {} 存在列数不是 {} 的行", kind, field.name, cols);
                    }
                }
            }
        }
        Ok(())
    }
}

/// 可以直接写进模板的值
pub fn is_text(value: &Value) -> bool {
    value.is_string() || value.is_number()
}

/// 标量转为文本（字符串原样，数字取十进制形式）
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn unit_header(kind: ContentKind, meta: &UnitMeta<'_>) -> Schema {
    Schema::new(kind)
        .scalar("level", meta.level.as_str())
        .scalar("unit_number", meta.unit_number)
        .scalar("unit_title", meta.unit_title)
}

/// 练习 A–F，每个 15 题；`wordbox` 只出现在 A 和 B（词汇单元）
fn unit_tasks(mut schema: Schema, with_wordbox: bool, mark_note: &str) -> Schema {
    for letter in TASK_LETTERS {
        schema = schema.text(format!("task{}_title", letter));
        if with_wordbox && matches!(letter, 'A' | 'B') {
            schema = schema.text(format!("task{}_wordbox", letter));
        }
        schema = schema
            .items(format!("task{}_items", letter), TASK_ITEMS)
            .scalar(format!("task{}_mark_note", letter), mark_note);
    }
    schema
        .scalar("total_mark", UNIT_MARKS)
        .scalar("max_mark", UNIT_MARKS)
}

/// 词汇单元
pub fn vocabulary(
    meta: &UnitMeta<'_>,
    topic1: &str,
    topic2: &str,
    verbs_heading: &str,
    mark_note: &str,
) -> Schema {
    let schema = unit_header(ContentKind::Vocabulary, meta)
        .scalar("topic1_title", topic1)
        .rows("topic1_rows", 8, 3)
        .scalar("topic2_title", topic2)
        .rows("topic2_rows", 8, 3)
        .scalar("verbs_heading", verbs_heading)
        .rows("verbs_rows", 6, 2)
        .text("vocab_box");
    unit_tasks(schema, true, mark_note)
}

/// 语法单元
pub fn grammar(meta: &UnitMeta<'_>, mark_note: &str) -> Schema {
    let mut schema = unit_header(ContentKind::Grammar, meta);
    // 两个讲解块：标题 + 表格 + 注释，标题 + 段落 + 列表 + 提示框
    for (block, (first, second)) in [(1, 2), (3, 4)].into_iter().enumerate() {
        schema = schema
            .text(format!("heading{}", first))
            .text(format!("table{}_header_1", block + 1))
            .text(format!("table{}_header_2", block + 1))
            .rows(format!("table{}_rows", block + 1), 3, 2)
            .text(format!("note{}", block + 1))
            .text(format!("heading{}", second))
            .text(format!("para{}", second))
            .items(format!("list{}_items", second), 3)
            .text(format!("box{}", block + 1));
    }
    unit_tasks(schema, false, mark_note)
}

/// 小复习（两个单元）
pub fn mini_review(review_number: usize, unit_range: &str) -> Schema {
    let mut schema = Schema::new(ContentKind::MiniReview)
        .scalar("review_number", review_number)
        .scalar("unit_range", unit_range);
    for letter in SECTION_LETTERS {
        schema = schema
            .text(format!("section{}_title", letter))
            .items(format!("section{}_items", letter), REVIEW_ITEMS);
    }
    schema.scalar("total_mark", REVIEW_MARKS)
}

/// 总复习（三页）
pub fn final_review(unit_range: &str) -> Schema {
    Schema::new(ContentKind::FinalReview)
        .scalar("unit_range", unit_range)
        .items("final_p1_items", FINAL_ITEMS)
        .items("final_p2_items", FINAL_ITEMS)
        .items("final_p3_items", FINAL_ITEMS)
        .scalar("total_mark", FINAL_MARKS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(level: &Level) -> UnitMeta<'_> {
        UnitMeta {
            level,
            unit_number: 3,
            unit_title: "Arbeit",
        }
    }

    fn count_items(schema: &Schema) -> usize {
        schema
            .fields()
            .iter()
            .filter(|f| f.name.starts_with("task"))
            .map(|f| match f.shape {
                FieldShape::Items(n) => n,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_vocabulary_skeleton_shape() {
        let level = Level::B1;
        let schema = vocabulary(&meta(&level), "Büro", "Kollegen", "Wichtige Verben", "1 Punkt pro Satz");
        let skeleton = schema.skeleton();

        assert_eq!(skeleton["level"], "B1");
        assert_eq!(skeleton["unit_number"], 3);
        assert_eq!(skeleton["topic2_title"], "Kollegen");
        assert_eq!(skeleton["topic1_rows"].as_array().unwrap().len(), 8);
        assert_eq!(skeleton["topic1_rows"][0].as_array().unwrap().len(), 3);
        assert_eq!(skeleton["verbs_rows"].as_array().unwrap().len(), 6);
        assert_eq!(skeleton["verbs_rows"][0].as_array().unwrap().len(), 2);
        assert_eq!(skeleton["taskF_mark_note"], "1 Punkt pro Satz");
        assert!(skeleton.get("taskA_wordbox").is_some());
        assert!(skeleton.get("taskC_wordbox").is_none());
        assert_eq!(skeleton["total_mark"], 90);
        assert_eq!(skeleton["max_mark"], 90);
        assert_eq!(count_items(&schema), 90);
    }

    #[test]
    fn test_grammar_field_order() {
        let level = Level::A2;
        let schema = grammar(&meta(&level), "1 Punkt pro Satz");
        let names = schema.field_names();
        assert_eq!(
            &names[..15],
            &[
                "level", "unit_number", "unit_title", "heading1", "table1_header_1",
                "table1_header_2", "table1_rows", "note1", "heading2", "para2",
                "list2_items", "box1", "heading3", "table2_header_1", "table2_header_2",
            ]
        );
        assert!(names.contains(&"list4_items"));
        assert!(names.contains(&"box2"));
        assert_eq!(names.last(), Some(&"max_mark"));
        assert_eq!(count_items(&schema), 90);
    }

    #[test]
    fn test_review_skeletons() {
        let mini = mini_review(2, "Units 3–4").skeleton();
        assert_eq!(mini["review_number"], 2);
        assert_eq!(mini["unit_range"], "Units 3–4");
        assert_eq!(mini["sectionE_items"].as_array().unwrap().len(), 10);
        assert_eq!(mini["total_mark"], 50);

        let fin = final_review("Units 1–5").skeleton();
        assert_eq!(fin["final_p3_items"].as_array().unwrap().len(), 50);
        assert_eq!(fin["total_mark"], 150);
    }

    #[test]
    fn test_validate_accepts_skeleton() {
        let schema = mini_review(1, "Units 1–2");
        let skeleton = schema.skeleton();
        assert!(schema.validate(skeleton.as_object().unwrap()).is_ok());
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let schema = final_review("Units 1–2");
        let payload = json!({
            "unit_range": "Units 1–2",
            "final_p1_items": ["a"],
            "final_p3_items": ["c"],
            "total_mark": 150
        });
        match schema.validate(payload.as_object().unwrap()) {
            Err(ContentError::MissingField { kind, field }) => {
                assert_eq!(kind, "Final Review");
                assert_eq!(field, "final_p2_items");
            }
            other => panic!("应该报告缺少字段, 实际: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let schema = Schema::new(ContentKind::Grammar).rows("table1_rows", 3, 2);
        let payload = json!({ "table1_rows": ["not", "rows"] });
        assert!(matches!(
            schema.validate(payload.as_object().unwrap()),
            Err(ContentError::WrongShape { .. })
        ));

        let payload = json!({ "table1_rows": [["a", "b"], ["c"]] });
        // 列数不符只警告
        assert!(schema.validate(payload.as_object().unwrap()).is_ok());
    }
}
