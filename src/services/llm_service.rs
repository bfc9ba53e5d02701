//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词发给模型、拿回文本"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, GitHub Models 等）

use std::future::Future;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, LlmError};

/// 文本生成能力
///
/// 流程层只依赖这个 trait，测试中可以替换为脚本化的实现。
pub trait TextGenerator {
    /// 发送一条用户消息，返回模型的原始文本
    fn generate(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 每次请求只发送一条用户消息
/// - 固定温度，单次请求有超时
/// - 不重试
/// - 不解析响应内容
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    pub async fn send_to_llm(&self, user_message: &str) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let build_failed = |source| LlmError::RequestBuildFailed {
            model: self.model_name.clone(),
            source,
        };

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(build_failed)?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            args.max_tokens(max_tokens);
        }
        let request = args.build().map_err(build_failed)?;

        // 调用 API（单次超时，不重试）
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({} 秒)", self.timeout.as_secs());
                LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.timeout.as_secs(),
                }
            })?
            .map_err(|source| {
                warn!("LLM API 调用失败: {}", source);
                LlmError::ApiCallFailed {
                    model: self.model_name.clone(),
                    source,
                }
            })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content)
    }
}

impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        Ok(self.send_to_llm(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 创建测试用的 LlmService（从环境变量读取密钥）
    fn create_test_service() -> LlmService {
        LlmService::new(&Config::from_env())
    }

    #[test]
    fn test_service_uses_config() {
        let config = Config {
            llm_model_name: "test-model".to_string(),
            llm_timeout_secs: 5,
            llm_max_tokens: Some(512),
            ..Config::default()
        };
        let service = LlmService::new(&config);
        assert_eq!(service.model_name(), "test-model");
        assert_eq!(service.timeout, Duration::from_secs(5));
        assert_eq!(service.max_tokens, Some(512));
        assert!((service.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let config = Config {
            llm_api_key: "key".to_string(),
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            llm_timeout_secs: 5,
            ..Config::default()
        };
        let service = LlmService::new(&config);
        let result = service.send_to_llm("Hallo").await;
        assert!(matches!(
            result,
            Err(LlmError::ApiCallFailed { .. }) | Err(LlmError::Timeout { .. })
        ));
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_send_to_llm_simple -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();

        println!("\n========== 测试通用 LLM 调用 ==========");
        let result = service
            .send_to_llm("Return ONLY valid JSON. No markdown. {\"greeting\": \"\"}")
            .await;

        match result {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", response);
                println!("==============================\n");
                assert!(!response.is_empty());
            }
            Err(e) => {
                panic!("测试失败: {}", e);
            }
        }
    }
}
