pub mod book_assembler;
pub mod build_log;
pub mod llm_service;
pub mod normalizer;
pub mod page_extractor;
pub mod prompt_builder;
pub mod template_filler;

pub use build_log::BuildLog;
pub use llm_service::{LlmService, TextGenerator};
pub use prompt_builder::PromptBuilder;
pub use template_filler::TemplateSet;
