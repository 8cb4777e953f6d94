//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词发给模型、拿回文本"这一能力，不关心文本块从哪来
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini 的 OpenAI 兼容端点等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, UnitError};

/// 文本生成能力
///
/// 校对和翻译都只依赖这个接口，测试中可以替换为假实现。
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 发送提示词，返回模型输出
    ///
    /// 错误必须已分类：限流类为 `Transient`，其他为 `Permanent`。
    async fn generate(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, UnitError>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API
/// - 把服务商错误映射为 `UnitError`
/// - 不关心文本块的顺序和重试
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// 缺少 API 密钥时直接失败，任务不会开始。
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_llm_key()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        // 限流重试统一交给调度器，客户端只发一次请求
        let client = Client::with_config(openai_config).with_backoff(no_retry_backoff());

        Ok(Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            timeout: config.request_timeout(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, UnitError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| UnitError::Permanent(format!("构建系统消息失败: {}", e)))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| UnitError::Permanent(format!("构建用户消息失败: {}", e)))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| UnitError::Permanent(format!("构建请求失败: {}", e)))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({:?})", self.timeout);
                UnitError::timeout(self.timeout)
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                UnitError::from_provider_message(format!("LLM API 调用失败: {}", e))
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| UnitError::Permanent("LLM 返回内容为空".to_string()))?;

        Ok(content.trim().to_string())
    }
}

/// 不重试的退避策略
fn no_retry_backoff() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[async_trait]
impl ChatModel for LlmService {
    async fn generate(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, UnitError> {
        self.send_to_llm(prompt, system_message).await
    }
}
