use crate::{LLMProvider, LLMResponse, LlmError, Message, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-memory provider that replays scripted replies and records prompts.
///
/// Once the script runs out, every call fails with [`LlmError::Scripted`].
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Prompts seen so far, one entry per call (messages joined by newlines).
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, reply: std::result::Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn generate_with_context(&self, messages: Vec<Message>) -> Result<LLMResponse> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }

        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());

        match next {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            Some(Err(message)) => Err(LlmError::Scripted(message)),
            None => Err(LlmError::Scripted("no scripted reply left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let mock = MockProvider::new().with_reply("first").with_error("second failed");

        assert_eq!(mock.generate("a").await.unwrap().content, "first");
        assert!(matches!(mock.generate("b").await, Err(LlmError::Scripted(_))));
        assert!(mock.generate("c").await.is_err());
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }
}
