//! 步骤处理流程 - 流程层
//!
//! 核心职责：定义"一个步骤"的完整处理流程
//!
//! 流程顺序：
//! 1. 提示词 → 模型
//! 2. 规范化 → schema 校验
//! 3. 模板填充 → 页面提取

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::content::{GenerationRequest, PageFragment};
use crate::services::llm_service::TextGenerator;
use crate::services::normalizer::normalize;
use crate::services::page_extractor::extract_pages;
use crate::services::template_filler::TemplateSet;
use crate::utils::logging::truncate_text;
use crate::workflow::step_ctx::StepCtx;

/// 步骤处理流程
///
/// - 编排单个步骤从提示词到页面的完整过程
/// - 不持有页面累加器
/// - 只依赖业务能力（services）
pub struct StepFlow<'a, G> {
    generator: &'a G,
    templates: &'a TemplateSet,
    verbose_logging: bool,
}

impl<'a, G: TextGenerator> StepFlow<'a, G> {
    pub fn new(generator: &'a G, templates: &'a TemplateSet, verbose_logging: bool) -> Self {
        Self {
            generator,
            templates,
            verbose_logging,
        }
    }

    /// 执行一个步骤，返回该步骤产生的页面
    pub async fn run(&self, request: &GenerationRequest, ctx: &StepCtx) -> Result<Vec<PageFragment>> {
        debug!("{} 提示词长度: {} 字符", ctx, request.rendered_prompt.len());

        let raw = self
            .generator
            .generate(&request.rendered_prompt)
            .await
            .with_context(|| format!("{} 模型调用失败", ctx))?;

        if self.verbose_logging {
            debug!("{} 模型响应: {}", ctx, truncate_text(&raw, 200));
        }

        let payload = normalize(&raw).with_context(|| format!("{} 响应不是有效的 JSON 对象", ctx))?;

        request
            .schema
            .validate(&payload)
            .with_context(|| format!("{} 响应不符合 schema", ctx))?;

        let markup = self
            .templates
            .render(&request.schema, &payload)
            .with_context(|| format!("{} 模板填充失败", ctx))?;

        let pages = extract_pages(&markup);
        if pages.is_empty() {
            warn!("{} 模板 {} 没有产生任何页面", ctx, request.content_kind.template_file());
        }
        debug!("{} 提取到 {} 页", ctx, pages.len());

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BookSettings;
    use crate::error::{AppError, AppResult, LlmError};
    use crate::models::subject::{Level, SubjectRecord};
    use crate::services::prompt_builder::PromptBuilder;
    use std::path::Path;

    /// 固定返回同一段文本
    struct Canned(String);

    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> AppResult<String> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> AppResult<String> {
            Err(AppError::Llm(LlmError::EmptyContent {
                model: "test".to_string(),
            }))
        }
    }

    async fn templates() -> TemplateSet {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        TemplateSet::load(&dir).await.unwrap()
    }

    fn units() -> Vec<SubjectRecord> {
        vec![
            SubjectRecord {
                level: Level::B1,
                unit_title: "Reisen".to_string(),
                grammar_focus: "Perfekt".to_string(),
                vocab_topics: vec!["Zug".to_string()],
            },
            SubjectRecord {
                level: Level::B1,
                unit_title: "Arbeit".to_string(),
                grammar_focus: "Dativ".to_string(),
                vocab_topics: vec!["Büro".to_string()],
            },
        ]
    }

    fn ctx() -> StepCtx {
        StepCtx::new(5, 6, crate::models::ContentKind::MiniReview, "Mini Review 1 (Units 1–2)")
    }

    #[tokio::test]
    async fn test_fenced_skeleton_becomes_one_page() {
        let templates = templates().await;
        let request = PromptBuilder::new(&BookSettings::default()).mini_review(5, 1, "Units 1–2", &units());
        let body = serde_json::to_string_pretty(&request.schema.skeleton()).unwrap();
        let generator = Canned(format!("```json\n{}\n```", body));

        let flow = StepFlow::new(&generator, &templates, true);
        let pages = flow.run(&request, &ctx()).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].as_str().contains("Units 1–2"));
    }

    #[tokio::test]
    async fn test_missing_field_error_names_step() {
        let templates = templates().await;
        let request = PromptBuilder::new(&BookSettings::default()).mini_review(5, 1, "Units 1–2", &units());
        let generator = Canned(r#"{"review_number": 1, "unit_range": "Units 1–2"}"#.to_string());

        let flow = StepFlow::new(&generator, &templates, false);
        let err = flow.run(&request, &ctx()).await.unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("步骤 #5/6"));
        assert!(chain.contains("Mini Review 1 (Units 1–2)"));
        assert!(chain.contains("缺少字段 sectionA_title (Mini Review)"));
    }

    #[tokio::test]
    async fn test_invalid_json_fails_step() {
        let templates = templates().await;
        let request = PromptBuilder::new(&BookSettings::default()).final_review(6, "Units 1–2", &units());
        let generator = Canned("Entschuldigung, ich kann das nicht.".to_string());

        let flow = StepFlow::new(&generator, &templates, false);
        let err = flow.run(&request, &ctx()).await.unwrap_err();
        assert!(err.to_string().contains("有效的 JSON"));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let templates = templates().await;
        let request = PromptBuilder::new(&BookSettings::default()).final_review(6, "Units 1–2", &units());

        let flow = StepFlow::new(&Failing, &templates, false);
        let err = flow.run(&request, &ctx()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Llm(LlmError::EmptyContent { .. }))
        ));
    }
}
