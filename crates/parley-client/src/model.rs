use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::response::ChatGeneration;

/// Text-generation and chat capability consumed by orchestration layers
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short identifier of the implementation
    fn model_type(&self) -> &'static str;

    /// Send one prompt, return the reply text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Send a conversation, return every reply in choice order
    async fn chat(&self, messages: &[Message]) -> Result<Vec<Message>>;

    /// Generate for each prompt in turn; the first failure aborts the batch
    async fn generate_batch(&self, prompts: &[String]) -> Result<Vec<String>> {
        let mut outputs = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            outputs.push(self.generate(prompt).await?);
        }
        Ok(outputs)
    }

    /// [`LanguageModel::chat`] with each reply paired with its text
    async fn chat_generations(&self, messages: &[Message]) -> Result<Vec<ChatGeneration>> {
        let replies = self.chat(messages).await?;
        Ok(replies.into_iter().map(ChatGeneration::from).collect())
    }
}
