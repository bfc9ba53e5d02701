//! # Workbook Builder
//!
//! 一个用于自动生成语言练习册（PDF）的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 科目记录、水平规则、内容类型和声明式 schema
//! - `loaders/` - 科目文件解析
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理单个步骤
//! - `PromptBuilder` - 四种内容的提示词
//! - `LlmService` - 调用兼容 OpenAI 的模型
//! - `normalizer` / `template_filler` / `page_extractor` / `book_assembler`
//! - `BuildLog` - 写构建日志能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个步骤"的完整处理流程
//! - `StepCtx` - 上下文封装（步骤序号 + 类型 + 标签）
//! - `StepFlow` - 流程编排（prompt → LLM → normalize → validate → fill → extract）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/sequencer` - 单元与复习的交错顺序
//! - `orchestrator/book_processor` - 整书处理器，串行执行并输出
//!
//! ### ⑤ 渲染层（Render）
//! - `render/` - 无头 Chromium 引擎和原语兼容层
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod render;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{BookSettings, Config};
pub use error::{AppError, AppResult};
pub use models::{BookDocument, ContentKind, GenerationRequest, Level, PageFragment, SubjectRecord};
pub use orchestrator::{App, BookBuilder};
pub use services::{LlmService, TextGenerator};
pub use workflow::{StepCtx, StepFlow};
