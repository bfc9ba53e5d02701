use std::fmt;

use crate::models::schema::Schema;
use crate::models::subject::SubjectRecord;

/// 内容类型，决定使用哪个提示词、schema 和模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Vocabulary,
    Grammar,
    MiniReview,
    FinalReview,
}

impl ContentKind {
    /// 对应的模板文件名
    pub fn template_file(self) -> &'static str {
        match self {
            ContentKind::Vocabulary => "vocab_unit.html",
            ContentKind::Grammar => "grammar_unit.html",
            ContentKind::MiniReview => "review_1page.html",
            ContentKind::FinalReview => "final_review_3page.html",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Vocabulary => "Vocabulary Unit",
            ContentKind::Grammar => "Grammar Unit",
            ContentKind::MiniReview => "Mini Review",
            ContentKind::FinalReview => "Final Review",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub content_kind: ContentKind,
    /// 步骤序号（从 1 开始）
    pub sequence_index: usize,
    /// 单元类为 1 个，小复习为 2 个，总复习为全部
    pub subjects: Vec<SubjectRecord>,
    pub rendered_prompt: String,
    /// 响应必须满足的 schema
    pub schema: Schema,
}

/// 一个物理页面的 HTML 片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFragment(String);

impl PageFragment {
    /// 只由页面提取器创建
    pub(crate) fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 组装完成的整本书
#[derive(Debug, Clone)]
pub struct BookDocument {
    pub html: String,
    pub page_count: usize,
}
