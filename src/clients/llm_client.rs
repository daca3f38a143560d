//! LLM API 客户端
//!
//! 使用 `async-openai` 调用兼容 OpenAI 协议的聊天补全接口（方舟 / Doubao 等）。
//! 用户消息始终以内容数组发送：文本在前，图片依次在后。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageUrl,
    },
    Client,
};
use tracing::{debug, warn};

use super::ChatBackend;
use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    fn build_request(
        &self,
        prompt: &str,
        images: &[String],
    ) -> AppResult<async_openai::types::chat::CreateChatCompletionRequest> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: prompt.to_string(),
            },
        ));
        for url in images {
            parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: url.clone(),
                        detail: None,
                    },
                },
            ));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))
    }
}

impl ChatBackend for LlmClient {
    async fn complete(&self, prompt: &str, images: &[String]) -> AppResult<String> {
        debug!(
            "调用 LLM API，模型: {}，提示词 {} 字符，图片 {} 张",
            self.model_name,
            prompt.chars().count(),
            images.len()
        );

        let request = self.build_request(prompt, images)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: self.model_name.clone(),
        })?;

        let content = choice
            .message
            .content
            .clone()
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        debug!("LLM API 调用成功，返回 {} 字符", content.chars().count());
        Ok(content)
    }
}
