pub mod queue;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LlmConfig;
use crate::error::LlmError;

pub use queue::LLMQueue;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchange in a conversation history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generate a response given a system prompt, prior history and new input.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String, LlmError>;
}

/// OpenAI-compatible chat client (hosted or local servers such as llama.cpp)
#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
    pub model: String,
    pub temperature: f32,
}

impl LLMClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String, temperature: f32) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        let client = Client::with_config(config);
        Self {
            client,
            model,
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.base_url.clone(),
            config.model.clone(),
            config.temperature,
        )
    }

    fn build_messages(
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?,
        ));

        for turn in history {
            let message = match turn.role {
                Role::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(turn.content.as_str())
                        .build()?,
                ),
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.content.as_str())
                        .build()?,
                ),
            };
            messages.push(message);
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()?,
        ));
        Ok(messages)
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String, LlmError> {
        info!(
            "🤖 Sending request to LLM (Model: {}, history: {})...",
            self.model,
            history.len()
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(Self::build_messages(system_prompt, history, user_input)?)
            .build()?;

        let response = self.client.chat().create(request).await?;

        info!("🤖 LLM Response received.");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}
