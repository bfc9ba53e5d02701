use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// 默认配置文件
const DEFAULT_CONFIG_FILE: &str = "workbook.toml";

/// 书籍内容设置（语言与固定文案）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BookSettings {
    /// 目标语言（写进提示词）
    pub language: String,
    /// HTML lang 属性
    pub html_lang: String,
    /// 文档标题
    pub title: String,
    /// 每个练习的评分说明
    pub mark_note: String,
    /// 词汇单元动词表标题
    pub verbs_heading: String,
    /// 没有词汇主题时的占位标题
    pub fallback_topic1: String,
    pub fallback_topic2: String,
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            language: "German".to_string(),
            html_lang: "de".to_string(),
            title: "German Book".to_string(),
            mark_note: "1 Punkt pro Satz".to_string(),
            verbs_heading: "Wichtige Verben".to_string(),
            fallback_topic1: "Thema 1".to_string(),
            fallback_topic2: "Thema 2".to_string(),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 科目列表文件
    pub subjects_file: String,
    /// HTML 模板目录
    pub templates_dir: String,
    /// 书籍 HTML 中引用的样式表路径
    pub stylesheet_href: String,
    /// 中间产物 HTML 文件
    pub book_html: String,
    /// 输出 PDF 文件名
    pub output_pdf: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 构建日志文件
    pub output_log_file: String,
    /// 无头浏览器可执行文件（为空时自动查找）
    pub chrome_executable: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: Option<u32>,
    // --- 书籍设置 ---
    pub book: BookSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subjects_file: "subjects.txt".to_string(),
            templates_dir: "templates".to_string(),
            stylesheet_href: "templates/style.css".to_string(),
            book_html: "book.html".to_string(),
            output_pdf: "Destination C1 and C2 @destination_b1_b2_c1.pdf".to_string(),
            verbose_logging: false,
            output_log_file: "build_log.txt".to_string(),
            chrome_executable: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://models.inference.ai.azure.com".to_string(),
            llm_model_name: "gpt-4.1".to_string(),
            llm_temperature: 0.2,
            llm_timeout_secs: 180,
            llm_max_tokens: None,
            book: BookSettings::default(),
        }
    }
}

/// 配置文件内容（所有字段可选，覆盖默认值）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub subjects_file: Option<String>,
    pub templates_dir: Option<String>,
    pub stylesheet_href: Option<String>,
    pub book_html: Option<String>,
    pub output_pdf: Option<String>,
    pub verbose_logging: Option<bool>,
    pub output_log_file: Option<String>,
    pub chrome_executable: Option<String>,
    pub llm_api_base_url: Option<String>,
    pub llm_model_name: Option<String>,
    pub llm_temperature: Option<f32>,
    pub llm_timeout_secs: Option<u64>,
    pub llm_max_tokens: Option<u32>,
    pub book: Option<BookSettings>,
}

impl Config {
    /// 加载配置：默认值 < 配置文件 < 环境变量
    ///
    /// `WORKBOOK_CONFIG` 指定的文件必须存在；默认的 `workbook.toml` 可以没有。
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("WORKBOOK_CONFIG").ok().filter(|p| !p.trim().is_empty());
        Ok(Self::load_file(explicit.as_deref())?.merge_env())
    }

    /// 默认值合并配置文件（不读环境变量）
    fn load_file(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or(DEFAULT_CONFIG_FILE);
        if !Path::new(path).exists() {
            if explicit.is_some() {
                return Err(ConfigError::ConfigFileNotFound {
                    path: path.to_string(),
                });
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileUnreadable {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::default().merge_file(parse_file_config(path, &content)?))
    }

    /// 只从环境变量加载
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// 合并配置文件中的值
    pub fn merge_file(self, file: FileConfig) -> Self {
        Self {
            subjects_file: file.subjects_file.unwrap_or(self.subjects_file),
            templates_dir: file.templates_dir.unwrap_or(self.templates_dir),
            stylesheet_href: file.stylesheet_href.unwrap_or(self.stylesheet_href),
            book_html: file.book_html.unwrap_or(self.book_html),
            output_pdf: file.output_pdf.unwrap_or(self.output_pdf),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
            output_log_file: file.output_log_file.unwrap_or(self.output_log_file),
            chrome_executable: file.chrome_executable.or(self.chrome_executable),
            llm_api_key: self.llm_api_key,
            llm_api_base_url: file.llm_api_base_url.unwrap_or(self.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(self.llm_model_name),
            llm_temperature: file.llm_temperature.unwrap_or(self.llm_temperature),
            llm_timeout_secs: file.llm_timeout_secs.unwrap_or(self.llm_timeout_secs),
            llm_max_tokens: file.llm_max_tokens.or(self.llm_max_tokens),
            book: file.book.unwrap_or(self.book),
        }
    }

    /// 合并环境变量中的值
    pub fn merge_env(self) -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let book = self.book;
        Self {
            subjects_file: env("SUBJECTS_FILE").unwrap_or(self.subjects_file),
            templates_dir: env("TEMPLATES_DIR").unwrap_or(self.templates_dir),
            stylesheet_href: env("STYLESHEET_HREF").unwrap_or(self.stylesheet_href),
            book_html: env("BOOK_HTML").unwrap_or(self.book_html),
            output_pdf: env("OUTPUT_PDF").unwrap_or(self.output_pdf),
            verbose_logging: env("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: env("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            chrome_executable: env("CHROME_EXECUTABLE").or(self.chrome_executable),
            llm_api_key: env("LLM_API_KEY").or_else(|| env("GITHUB_TOKEN")).unwrap_or(self.llm_api_key),
            llm_api_base_url: env("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env("LLM_TEMPERATURE").and_then(|v| v.parse().ok()).unwrap_or(self.llm_temperature),
            llm_timeout_secs: env("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(self.llm_timeout_secs),
            llm_max_tokens: env("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()).or(self.llm_max_tokens),
            book: BookSettings {
                language: env("BOOK_LANGUAGE").unwrap_or(book.language),
                html_lang: env("BOOK_HTML_LANG").unwrap_or(book.html_lang),
                title: env("BOOK_TITLE").unwrap_or(book.title),
                mark_note: env("BOOK_MARK_NOTE").unwrap_or(book.mark_note),
                verbs_heading: env("BOOK_VERBS_HEADING").unwrap_or(book.verbs_heading),
                ..book
            },
        }
    }

    /// 在开始生成之前检查必需的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        Ok(())
    }

    /// 最终输出文件名（补全 .pdf 后缀）
    pub fn output_pdf_name(&self) -> String {
        normalize_output_name(&self.output_pdf, &Config::default().output_pdf)
    }
}

fn parse_file_config(path: &str, content: &str) -> Result<FileConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::ConfigFileInvalid {
        path: path.to_string(),
        source,
    })
}

/// 规范化输出文件名：为空时使用默认名，缺少 .pdf 后缀时补全
pub fn normalize_output_name(name: &str, default_name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { default_name } else { name };
    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_output_name() {
        assert_eq!(normalize_output_name("book", "d.pdf"), "book.pdf");
        assert_eq!(normalize_output_name("Book.PDF", "d.pdf"), "Book.PDF");
        assert_eq!(normalize_output_name("  ", "default.pdf"), "default.pdf");
        assert_eq!(normalize_output_name("", "default"), "default.pdf");
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredential { .. })
        ));

        let config = Config {
            llm_api_key: "key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_file_overrides_defaults() {
        let file = parse_file_config(
            "workbook.toml",
            r#"
subjects_file = "units.txt"
llm_timeout_secs = 60

[book]
language = "French"
html_lang = "fr"
"#,
        )
        .unwrap();

        let config = Config::default().merge_file(file);
        assert_eq!(config.subjects_file, "units.txt");
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.book.language, "French");
        assert_eq!(config.book.html_lang, "fr");
        // 未出现的字段保持默认值
        assert_eq!(config.book.mark_note, "1 Punkt pro Satz");
        assert_eq!(config.templates_dir, "templates");
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let result = Config::load_file(Some("/nonexistent/typo.toml"));
        assert!(matches!(
            result,
            Err(ConfigError::ConfigFileNotFound { ref path }) if path == "/nonexistent/typo.toml"
        ));
    }

    #[test]
    fn test_explicit_config_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.toml");
        std::fs::write(&path, "templates_dir = \"tpl\"\n").unwrap();

        let config = Config::load_file(path.to_str()).unwrap();
        assert_eq!(config.templates_dir, "tpl");
    }

    #[test]
    fn test_empty_api_key_falls_back_to_github_token() {
        std::env::set_var("LLM_API_KEY", "");
        std::env::set_var("GITHUB_TOKEN", "ghp_test");
        let config = Config::default().merge_env();
        std::env::remove_var("LLM_API_KEY");
        std::env::remove_var("GITHUB_TOKEN");

        assert_eq!(config.llm_api_key, "ghp_test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_file() {
        let result = parse_file_config("workbook.toml", "llm_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(ConfigError::ConfigFileInvalid { .. })));
    }
}
