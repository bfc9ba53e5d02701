//! 模板填充 - 业务能力层
//!
//! 按 schema 把响应数据渲染为 HTML 片段并替换模板中的 `{{name}}` 占位符。
//! 替换是一次扫描完成的：替换进去的内容不会再被扫描。

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, ContentError};
use crate::models::content::ContentKind;
use crate::models::schema::{value_text, FieldShape, Schema};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid regex"));

/// 字符串列表 → `<li>` 行
pub fn html_li(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", value_text(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 表格行 → `<tr>` 行，单元格按列顺序
pub fn html_tr(rows: &[Value]) -> String {
    rows.iter()
        .map(|row| {
            let cells: String = row
                .as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| format!("<td>{}</td>", value_text(c)))
                        .collect()
                })
                .unwrap_or_default();
            format!("<tr>{}</tr>", cells)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 模板中出现的所有占位符名称
pub fn placeholders(template: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// 用响应数据填充模板
///
/// payload 应已通过 [`Schema::validate`]；schema 中没有声明的占位符会作为错误返回。
pub fn fill(
    template_name: &str,
    template: &str,
    schema: &Schema,
    payload: &Map<String, Value>,
) -> Result<String, ContentError> {
    let rendered: HashMap<&str, String> = schema
        .fields()
        .iter()
        .filter_map(|field| {
            let value = payload.get(&field.name)?;
            let text = match &field.shape {
                FieldShape::Scalar(_) => value_text(value),
                FieldShape::Items(_) => value.as_array().map(|a| html_li(a)).unwrap_or_default(),
                FieldShape::Rows { .. } => value.as_array().map(|a| html_tr(a)).unwrap_or_default(),
            };
            Some((field.name.as_str(), text))
        })
        .collect();

    let mut unfilled = BTreeSet::new();
    let output = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        match rendered.get(&caps[1]) {
            Some(text) => text.clone(),
            None => {
                unfilled.insert(caps[1].to_string());
                caps[0].to_string()
            }
        }
    });

    if !unfilled.is_empty() {
        return Err(ContentError::UnfilledPlaceholder {
            template: template_name.to_string(),
            placeholders: unfilled.into_iter().collect(),
        });
    }

    Ok(output.into_owned())
}

/// 四种内容类型的模板
#[derive(Debug, Clone)]
pub struct TemplateSet {
    vocabulary: String,
    grammar: String,
    mini_review: String,
    final_review: String,
}

impl TemplateSet {
    /// 从模板目录读取全部模板
    pub async fn load(dir: &Path) -> AppResult<Self> {
        let read = |kind: ContentKind| async move {
            let path = dir.join(kind.template_file());
            debug!("读取模板: {}", path.display());
            fs::read_to_string(&path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
        };

        Ok(Self {
            vocabulary: read(ContentKind::Vocabulary).await?,
            grammar: read(ContentKind::Grammar).await?,
            mini_review: read(ContentKind::MiniReview).await?,
            final_review: read(ContentKind::FinalReview).await?,
        })
    }

    pub fn get(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Vocabulary => &self.vocabulary,
            ContentKind::Grammar => &self.grammar,
            ContentKind::MiniReview => &self.mini_review,
            ContentKind::FinalReview => &self.final_review,
        }
    }

    /// 按 schema 填充对应类型的模板
    pub fn render(&self, schema: &Schema, payload: &Map<String, Value>) -> Result<String, ContentError> {
        let kind = schema.kind();
        fill(kind.template_file(), self.get(kind), schema, payload)
    }
}
