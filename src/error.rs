use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 内容契约错误（JSON / 字段 / 占位符）
    #[error("内容错误: {0}")]
    Content(#[from] ContentError),
    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("缺少 LLM API 密钥，请设置环境变量 {var_name}")]
    MissingCredential { var_name: String },

    /// 显式指定的配置文件不存在
    #[error("配置文件 {path} 不存在")]
    ConfigFileNotFound { path: String },

    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ConfigFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    ConfigFileInvalid {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 科目文件不存在
    #[error(
        "{path} 不存在。每行格式:\nlevel | unit_title | grammar_focus | vocab_topics (逗号分隔)"
    )]
    SubjectFileNotFound { path: String },

    /// 科目文件存在但无法读取（权限、编码等）
    #[error("无法读取科目文件 {path}: {source}")]
    SubjectFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 科目行格式错误
    #[error("第 {line} 行格式错误: 需要 4 个以 | 分隔的字段，实际 {found} 个")]
    BadSubjectLine { line: usize, found: usize },

    /// 科目文件没有有效行
    #[error("{path} 中没有有效的科目行")]
    NoSubjects { path: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败 (模型: {model}): {source}")]
    RequestBuildFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },

    /// API 调用失败（网络错误或非 2xx 状态）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },

    /// 请求超时
    #[error("LLM 请求超时 (模型: {model}, {timeout_secs} 秒)")]
    Timeout { model: String, timeout_secs: u64 },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 内容契约错误
#[derive(Debug, Error)]
pub enum ContentError {
    /// 规范化后的文本不是有效 JSON
    #[error("JSON解析失败: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    /// 顶层不是 JSON 对象
    #[error("JSON 顶层必须是对象，实际为 {found}")]
    NotAnObject { found: &'static str },

    /// 缺少模板所需字段
    #[error("缺少字段 {field} ({kind})")]
    MissingField { kind: String, field: String },

    /// 字段类型与 schema 不符
    #[error("字段 {field} 类型错误 ({kind}): 需要 {expected}")]
    WrongShape {
        kind: String,
        field: String,
        expected: &'static str,
    },

    /// 模板中仍有未替换的占位符
    #[error("模板 {template} 中存在未替换的占位符: {placeholders:?}")]
    UnfilledPlaceholder {
        template: String,
        placeholders: Vec<String>,
    },
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 渲染引擎初始化失败
    #[error("渲染引擎启动失败: {message}")]
    EngineLaunchFailed { message: String },

    /// 渲染引擎拒绝文档
    #[error("渲染引擎处理文档失败 ({document}): {message}")]
    EngineFailed { document: String, message: String },

    /// 引擎缺少所需的绘图原语
    #[error("渲染引擎缺少原语: {primitive}")]
    MissingPrimitive { primitive: &'static str },

    /// 兼容层尚未安装
    #[error("兼容层尚未安装原语: {primitive}")]
    NotInstalled { primitive: &'static str },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建渲染引擎错误
    pub fn engine_failed(document: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Render(RenderError::EngineFailed {
            document: document.into(),
            message: source.to_string(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
