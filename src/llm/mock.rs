//! Mock LLM 客户端（用于测试，无需模型服务）
//!
//! 按预置脚本依次返回回复或传输失败；脚本耗尽后回显最后一条 User 消息，便于长对话测试。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：scripted 队列出队；队列耗尽后回显用户输入，或（failing 模式）持续报错
#[derive(Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    fail_when_exhausted: Option<String>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一串输出（按调用顺序出队）
    pub fn scripted(responses: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            fail_when_exhausted: None,
        }
    }

    /// 每次调用都失败（模拟模型不可达）
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fail_when_exhausted: Some(error.into()),
        }
    }

    pub fn push_response(&self, response: Result<String, String>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Some(scripted) = self.responses.lock().unwrap().pop_front() {
            return scripted;
        }
        if let Some(ref error) = self.fail_when_exhausted {
            return Err(error.clone());
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo from Mock: {}", last_user))
    }
}
