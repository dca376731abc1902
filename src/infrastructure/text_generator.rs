//! 文本生成器 - 基础设施层
//!
//! 持有唯一的 LLM 客户端，只暴露"给定提示词，返回文本"的能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Azure、Gemini 等），通过 base url 切换

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 文本生成能力
///
/// 职责：
/// - 单次调用，不重试
/// - 不认识 Question / PaperConfig
/// - 失败时返回 `LlmError`，不把失败伪装成空结果
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 模型名称（仅用于日志和错误信息）
    fn model_name(&self) -> &str;

    /// 发送一次对话请求，返回模型的文本回复
    async fn generate(&self, system_message: &str, user_message: &str)
        -> Result<String, LlmError>;
}

/// 基于 OpenAI 兼容接口的文本生成器
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl OpenAiGenerator {
    /// 创建新的生成器
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout(),
        }
    }

    fn build_messages(
        system_message: &str,
        user_message: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(request_build_failed)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(request_build_failed)?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ])
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        system_message: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let messages = Self::build_messages(system_message, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(request_build_failed)?;

        let call = async {
            self.client.chat().create(request).await.map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::ApiCallFailed {
                    model: self.model_name.clone(),
                    source: Box::new(e),
                }
            })
        };
        let response = within(self.timeout, &self.model_name, call).await?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        debug!("LLM 响应长度: {} 字符", content.len());

        Ok(content.trim().to_string())
    }
}

/// 在限定时间内等待请求完成，`None` 表示不限制
async fn within<T, F>(limit: Option<Duration>, model: &str, call: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    let Some(limit) = limit else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!("LLM API 调用超时 ({:?})", limit);
            Err(LlmError::Timeout {
                model: model.to_string(),
                secs: limit.as_secs(),
            })
        }
    }
}

fn request_build_failed(e: impl std::error::Error + Send + Sync + 'static) -> LlmError {
    LlmError::RequestBuildFailed {
        source: Box::new(e),
    }
}
