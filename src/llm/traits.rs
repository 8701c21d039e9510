//! LLM 客户端抽象
//!
//! 所有后端（Ollama / Mock）实现 LlmClient：complete 接收整段消息序列，返回一条完整回复。
//! 传输失败以 Err 返回：这是管线中唯一会终止当前轮的失败。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait：同步语义的整条完成（无流式）
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;
}
