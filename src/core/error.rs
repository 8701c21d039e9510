//! Agent 错误类型
//!
//! 仅模型传输失败会终止当前轮；搜索、检索、持久化的失败都在各自组件内吞掉并降级。

use thiserror::Error;

/// Agent 单轮处理中可能出现的错误（模型、解析、工具、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 模型不可达或调用失败：终止本轮，会话保持可用
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),
}

impl AgentError {
    /// 面向用户的单轮错误文案（会话未损坏，下一轮可正常继续）
    pub fn user_message(&self) -> String {
        match self {
            AgentError::LlmError(e) => format!(
                "An error occurred while processing the message: {}. \
                 Make sure the model server is running and the configured model is installed.",
                truncate(e, 100)
            ),
            other => format!(
                "An error occurred while processing the message: {}",
                truncate(&other.to_string(), 100)
            ),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        s.chars().take(max_chars).collect()
    } else {
        s.to_string()
    }
}
