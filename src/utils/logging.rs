//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志（`RUST_LOG` 优先，否则 info / 详细模式下 debug）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 练习册生成模式");
    info!("📖 目标语言: {}", config.book.language);
    info!("🤖 模型: {} @ {}", config.llm_model_name, config.llm_api_base_url);
    info!("📄 输出文件: {}", config.output_pdf_name());
    info!("{}", "=".repeat(60));
}

/// 记录科目加载信息
pub fn log_subjects_loaded(units: usize, total_steps: usize) {
    info!("✓ 找到 {} 个单元", units);
    info!("📋 共 {} 个生成步骤，逐个顺序执行\n", total_steps);
}

/// 进度行，例如 `[ 14%] Vocabulary Unit 1: generating...`
pub fn progress_line(percent: usize, message: &str) -> String {
    format!("[{:3}%] {}", percent, message)
}

/// 打印最终统计信息
pub fn print_final_stats(pages: usize, output_pdf: &str, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 总页数: {}", pages);
    info!("📄 PDF: {}", output_pdf);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
