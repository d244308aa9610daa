use crate::retry::{self, RetryPolicy};
use crate::{LLMConfig, LLMProvider, LLMResponse, LlmError, Message, Result, Usage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Client for the DeepSeek (OpenAI-compatible) chat-completion endpoint
pub struct DeepSeekClient {
    client: Client,
    config: LLMConfig,
    retry: RetryPolicy,
}

impl DeepSeekClient {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LlmError::Transport)?;

        Ok(Self {
            client,
            config,
            retry: RetryPolicy::single(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, messages: &[Message]) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect();

        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }

    async fn perform_api_call(&self, url: &str, body: &Value) -> Result<LLMResponse> {
        let timeout_secs = self.config.timeout.as_secs();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::from_transport(e, timeout_secs))?;

        parse_completion(&json)
    }
}

/// Extract the first choice from a chat-completion payload.
pub(crate) fn parse_completion(json: &Value) -> Result<LLMResponse> {
    let choice = &json["choices"][0];
    let content = choice["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            LlmError::MalformedResponse("missing choices[0].message.content".to_string())
        })?
        .to_string();

    let usage = json["usage"].as_object().map(|u| Usage {
        prompt_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as usize,
        completion_tokens: u
            .get("completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize,
        total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0) as usize,
    });

    Ok(LLMResponse {
        content,
        finish_reason: choice["finish_reason"].as_str().map(|s| s.to_string()),
        usage,
    })
}

#[async_trait]
impl LLMProvider for DeepSeekClient {
    async fn generate_with_context(&self, messages: Vec<Message>) -> Result<LLMResponse> {
        let url = self.endpoint();
        let body = self.request_body(&messages);
        debug!(
            "Calling DeepSeek API with model: {} ({} message(s))",
            self.config.model,
            messages.len()
        );

        let client = self;
        let (url, body) = (&url, &body);
        let response = retry::run(&self.retry, "DeepSeek API", move |_| {
            client.perform_api_call(url, body)
        })
        .await?;

        if let Some(usage) = &response.usage {
            info!(
                "DeepSeek API usage: {} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        Ok(response)
    }
}
