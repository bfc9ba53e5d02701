//! 整书处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责整本练习册的生成和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查配置、加载科目和模板、初始化构建日志
//! 2. **步骤调度**：按 [`plan_book`] 的顺序逐个执行步骤（严格串行）
//! 3. **页面累加**：唯一持有页面列表的地方
//! 4. **输出**：先写出 book.html，再交给渲染器输出 PDF

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::models::content::BookDocument;
use crate::models::loaders::load_subjects;
use crate::models::subject::SubjectRecord;
use crate::orchestrator::sequencer::{plan_book, total_steps};
use crate::render::{ChromiumEngine, Renderer};
use crate::services::book_assembler::assemble;
use crate::services::build_log::BuildLog;
use crate::services::llm_service::{LlmService, TextGenerator};
use crate::services::prompt_builder::PromptBuilder;
use crate::services::template_filler::TemplateSet;
use crate::utils::logging::{self, progress_line};
use crate::workflow::{StepCtx, StepFlow};

/// 整书生成器
///
/// - 不关心模型从哪里来（只依赖 [`TextGenerator`]）
/// - 不做渲染
pub struct BookBuilder<'a, G> {
    generator: &'a G,
    templates: &'a TemplateSet,
    config: &'a Config,
    build_log: Option<&'a BuildLog>,
}

impl<'a, G: TextGenerator> BookBuilder<'a, G> {
    pub fn new(generator: &'a G, templates: &'a TemplateSet, config: &'a Config) -> Self {
        Self {
            generator,
            templates,
            config,
            build_log: None,
        }
    }

    /// 每完成一个步骤写一行构建日志
    pub fn with_build_log(mut self, build_log: &'a BuildLog) -> Self {
        self.build_log = Some(build_log);
        self
    }

    /// 生成所有步骤并组装成整本书
    ///
    /// 任何一步失败都会立即返回，不产生部分文档。
    pub async fn build_document(&self, subjects: &[SubjectRecord]) -> Result<BookDocument> {
        let plans = plan_book(subjects.len());
        let total_steps = plans.len();
        let prompts = PromptBuilder::new(&self.config.book);
        let flow = StepFlow::new(self.generator, self.templates, self.config.verbose_logging);

        let mut pages = Vec::new();
        for plan in &plans {
            let ctx = StepCtx::new(plan.sequence_index, total_steps, plan.kind, plan.label());
            println!("{}", progress_line(ctx.percent(), &plan.to_string()));

            let request = plan.request(&prompts, subjects);
            let step_pages = flow.run(&request, &ctx).await?;

            if let Some(build_log) = self.build_log {
                build_log.record(
                    (ctx.step_index, ctx.total_steps),
                    ctx.kind,
                    &ctx.label,
                    step_pages.len(),
                )?;
            }
            pages.extend(step_pages);
        }

        let document = assemble(&pages, &self.config.book, &self.config.stylesheet_href);
        info!("✓ 全部 {} 个步骤完成，共 {} 页", total_steps, document.page_count);
        Ok(document)
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    subjects: Vec<SubjectRecord>,
    templates: TemplateSet,
    llm_service: LlmService,
    build_log: BuildLog,
}

impl App {
    /// 初始化应用
    ///
    /// 所有配置错误都在第一次调用模型之前返回。
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let subjects = load_subjects(Path::new(&config.subjects_file)).await?;
        let templates = TemplateSet::load(Path::new(&config.templates_dir))
            .await
            .with_context(|| format!("无法加载模板目录: {}", config.templates_dir))?;

        let build_log = BuildLog::new(&config.output_log_file);
        build_log.init()?;

        logging::log_subjects_loaded(subjects.len(), total_steps(subjects.len()));

        Ok(Self {
            llm_service: LlmService::new(&config),
            config,
            subjects,
            templates,
            build_log,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let document = BookBuilder::new(&self.llm_service, &self.templates, &self.config)
            .with_build_log(&self.build_log)
            .build_document(&self.subjects)
            .await?;

        // 渲染之前总是先写出 HTML
        let book_html = Path::new(&self.config.book_html);
        tokio::fs::write(book_html, &document.html)
            .await
            .with_context(|| format!("无法写入 {}", self.config.book_html))?;
        info!("✓ 已写出 {}", self.config.book_html);

        let output_pdf = self.config.output_pdf_name();
        let renderer = Renderer::new(ChromiumEngine::new(self.config.chrome_executable.as_deref()));

        println!("{}", progress_line(99, "Rendering PDF..."));
        let bytes = renderer
            .render_to_file(book_html, Path::new(&output_pdf))
            .await
            .with_context(|| format!("渲染 {} 失败", output_pdf))?;
        info!("✓ PDF 大小: {} 字节", bytes);
        println!("{}", progress_line(100, &format!("Done: {}", output_pdf)));

        logging::print_final_stats(document.page_count, &output_pdf, &self.config.output_log_file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use std::sync::Mutex;

    const SCHEMA_MARKER: &str = "JSON SCHEMA (fill all fields):\n";

    /// 把提示词里的骨架原样返回，并记录所有提示词
    #[derive(Default)]
    struct EchoSkeleton {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for EchoSkeleton {
        async fn generate(&self, prompt: &str) -> AppResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let start = prompt.find(SCHEMA_MARKER).unwrap() + SCHEMA_MARKER.len();
            Ok(prompt[start..].to_string())
        }
    }

    async fn templates() -> TemplateSet {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        TemplateSet::load(&dir).await.unwrap()
    }

    fn subjects(n: usize) -> Vec<SubjectRecord> {
        let text: String = (1..=n)
            .map(|i| format!("B1 | Einheit {} | Perfekt | Thema{}a, Thema{}b\n", i, i, i))
            .collect();
        crate::models::parse_subjects(&text).unwrap()
    }

    #[tokio::test]
    async fn test_three_units_page_count_and_order() {
        let generator = EchoSkeleton::default();
        let templates = templates().await;
        let config = Config::default();

        let document = BookBuilder::new(&generator, &templates, &config)
            .build_document(&subjects(3))
            .await
            .unwrap();

        // 3 × (3 + 3) + 1 次小复习 + 3 页总复习
        assert_eq!(document.page_count, 22);
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 8);
        assert!(prompts[0].contains("Generate data for ONE Vocabulary Unit."));
        assert!(prompts[1].contains("Generate data for ONE Grammar Unit."));
        assert!(prompts[4].contains("mini review page"));
        assert!(prompts[7].contains("final review"));
        assert!(prompts[6].contains("unit_number: 3"));
        assert!(document.html.contains("Units 1–3"));
    }

    #[tokio::test]
    async fn test_build_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let build_log = BuildLog::new(dir.path().join("build_log.txt"));
        build_log.init().unwrap();

        let generator = EchoSkeleton::default();
        let templates = templates().await;
        let config = Config::default();
        BookBuilder::new(&generator, &templates, &config)
            .with_build_log(&build_log)
            .build_document(&subjects(2))
            .await
            .unwrap();

        let log = std::fs::read_to_string(build_log.path()).unwrap();
        assert_eq!(log.lines().filter(|l| l.starts_with("步骤")).count(), 6);
        assert!(log.contains("步骤 5/6 | Mini Review | Mini Review 1 (Units 1–2) | 1 页"));
    }

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        let config = Config::default();
        let err = App::initialize(config).await.err().unwrap();
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[tokio::test]
    async fn test_initialize_rejects_missing_subject_file() {
        let config = Config {
            llm_api_key: "key".to_string(),
            subjects_file: "no/such/subjects.txt".to_string(),
            ..Config::default()
        };
        let err = App::initialize(config).await.err().unwrap();
        assert!(err.to_string().contains("no/such/subjects.txt"));
    }
}
