//! 单轮编排循环
//!
//! 把固定 system 指令、本地检索上下文、最近对话文本、模型记忆窗口与新输入
//! 拼成一次模型调用，在迭代上限与软时间预算内允许模型调用工具；
//! 输出解析失败时把原始输出当最终回答返回，而不是中止本轮。
//! 只有模型传输失败会以 Err 结束本轮。

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::agent::{parse_llm_output, PlannerOutput};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::tools::ToolExecutor;

/// 固定 system 指令模板；{tools} / {context} / {conversation} 每轮填充
const SYSTEM_TEMPLATE: &str = "\
You are Rona, an assistant focused on programming and technology, with internet access. \
Your primary task is to answer questions accurately based on the provided context and on \
information from the internet.

Rules:
1. Use internet search when you need fresh information or anything missing from the local database
2. Focus on the context provided from the local database first
3. Combine internet information with local knowledge when needed
4. Use the available tools (date, time, internet search, page fetch) when needed
5. Keep answers concise and useful
6. For questions about code or programming, give a precise technical answer

Available tools:
{tools}
To call a tool, reply with exactly one JSON object: {\"tool\": \"<name>\", \"args\": { ... }}
To answer the user directly, reply with plain text (no JSON).

Context available from the local database:
-------------------
{context}

Previous conversation:
-------------------
{conversation}

Remember: you can search the internet for fresh or additional information.";

/// 单轮执行结果：最终回复与本轮调用过的工具名
#[derive(Debug)]
pub struct AgentOutcome {
    pub response: String,
    pub tools_used: Vec<String>,
}

/// 编排器：持有 LLM 与工具执行器，invoke 在限界内跑完一轮
pub struct AgentOrchestrator {
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    max_iterations: usize,
    max_execution_time: Duration,
}

impl AgentOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: ToolExecutor,
        max_iterations: usize,
        max_execution_secs: u64,
    ) -> Self {
        Self {
            llm,
            executor,
            max_iterations,
            max_execution_time: Duration::from_secs(max_execution_secs),
        }
    }

    fn system_prompt(&self, context: &str, conversation_context: &str) -> String {
        let mut tools_block = String::new();
        for (name, description) in self.executor.tool_descriptions() {
            tools_block.push_str(&format!("- {}: {}\n", name, description));
        }
        SYSTEM_TEMPLATE
            .replace("{tools}", &tools_block)
            .replace("{context}", context)
            .replace("{conversation}", conversation_context)
    }

    /// 执行一轮：窗口消息 + 新输入 → 模型；ToolCall 则执行并把观察写回消息序列，
    /// Response 或解析失败则结束；迭代/时间预算耗尽时退回最后一次原始输出
    pub async fn invoke(
        &self,
        input: &str,
        context: &str,
        conversation_context: &str,
        window: &[Message],
    ) -> Result<AgentOutcome, AgentError> {
        let deadline = Instant::now() + self.max_execution_time;
        let system = self.system_prompt(context, conversation_context);

        let mut messages: Vec<Message> = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(system));
        messages.extend_from_slice(window);
        messages.push(Message::user(input));

        let mut tools_used: Vec<String> = Vec::new();
        let mut last_output = String::new();

        for step in 0..self.max_iterations {
            // 软预算：到点后不再发起新的迭代，不打断进行中的调用
            if step > 0 && Instant::now() >= deadline {
                tracing::warn!(step, "execution time limit reached, stopping iterations");
                break;
            }

            let output = self
                .llm
                .complete(&messages)
                .await
                .map_err(AgentError::LlmError)?;
            last_output = output.clone();

            match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(resp)) => {
                    return Ok(AgentOutcome {
                        response: resp,
                        tools_used,
                    });
                }
                Ok(PlannerOutput::ToolCall(tc)) => {
                    let observation = match self.executor.execute(&tc.tool, tc.args.clone()).await {
                        Ok(r) => r,
                        Err(e) => format!("Error: {}", e),
                    };
                    tools_used.push(tc.tool.clone());
                    // 将工具调用与结果写回对话，供下一轮使用
                    messages.push(Message::assistant(format!(
                        "Tool call: {} | Result: {}",
                        tc.tool, observation
                    )));
                    messages.push(Message::user(format!(
                        "Observation from {}: {}",
                        tc.tool, observation
                    )));
                }
                Err(e) => {
                    // 解析失败不中止：原始输出就是最终回答
                    tracing::warn!(error = %e, "model output did not parse as an action, using raw output");
                    return Ok(AgentOutcome {
                        response: output,
                        tools_used,
                    });
                }
            }
        }

        let response = if last_output.is_empty() {
            "No response found.".to_string()
        } else {
            format!(
                "Stopped after reaching the step limit ({}). Last model output:\n{}",
                self.max_iterations, last_output
            )
        };
        Ok(AgentOutcome {
            response,
            tools_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::tools::{CurrentDateTool, ToolRegistry};

    fn orchestrator_with(llm: MockLlmClient) -> AgentOrchestrator {
        let mut registry = ToolRegistry::new();
        registry.register(CurrentDateTool);
        AgentOrchestrator::new(Arc::new(llm), ToolExecutor::new(registry, 5), 3, 30)
    }

    #[tokio::test]
    async fn plain_response_ends_the_turn() {
        let orchestrator =
            orchestrator_with(MockLlmClient::scripted(vec![Ok("Just an answer.".to_string())]));
        let outcome = orchestrator.invoke("hi", "ctx", "convo", &[]).await.unwrap();
        assert_eq!(outcome.response, "Just an answer.");
        assert!(outcome.tools_used.is_empty());
    }

    #[tokio::test]
    async fn tool_call_then_answer_records_tool_use() {
        let orchestrator = orchestrator_with(MockLlmClient::scripted(vec![
            Ok(r#"{"tool": "current_date", "args": {}}"#.to_string()),
            Ok("Today is some day.".to_string()),
        ]));
        let outcome = orchestrator
            .invoke("what day is it?", "ctx", "convo", &[])
            .await
            .unwrap();
        assert_eq!(outcome.response, "Today is some day.");
        assert_eq!(outcome.tools_used, vec!["current_date".to_string()]);
    }

    #[tokio::test]
    async fn unknown_tool_failure_is_fed_back_not_fatal() {
        let orchestrator = orchestrator_with(MockLlmClient::scripted(vec![
            Ok(r#"{"tool": "made_up_tool", "args": {}}"#.to_string()),
            Ok("Recovered without that tool.".to_string()),
        ]));
        let outcome = orchestrator.invoke("q", "ctx", "convo", &[]).await.unwrap();
        assert_eq!(outcome.response, "Recovered without that tool.");
        assert_eq!(outcome.tools_used, vec!["made_up_tool".to_string()]);
    }

    #[tokio::test]
    async fn parse_failure_recovers_with_raw_output() {
        let raw = "I think {this is not valid json";
        let orchestrator = orchestrator_with(MockLlmClient::scripted(vec![Ok(raw.to_string())]));
        let outcome = orchestrator.invoke("q", "ctx", "convo", &[]).await.unwrap();
        assert_eq!(outcome.response, raw);
    }

    #[tokio::test]
    async fn iteration_limit_falls_back_to_last_output() {
        let tool_call = r#"{"tool": "current_date", "args": {}}"#.to_string();
        let orchestrator = orchestrator_with(MockLlmClient::scripted(vec![
            Ok(tool_call.clone()),
            Ok(tool_call.clone()),
            Ok(tool_call.clone()),
        ]));
        let outcome = orchestrator.invoke("q", "ctx", "convo", &[]).await.unwrap();
        assert!(outcome.response.contains("step limit (3)"));
        assert_eq!(outcome.tools_used.len(), 3);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let orchestrator = orchestrator_with(MockLlmClient::failing("connection refused"));
        let err = orchestrator.invoke("q", "ctx", "convo", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(_)));
    }

    #[tokio::test]
    async fn system_prompt_carries_context_and_tools() {
        let orchestrator =
            orchestrator_with(MockLlmClient::scripted(vec![Ok("ok".to_string())]));
        let prompt = orchestrator.system_prompt("LOCAL-CTX", "PRIOR-CONVO");
        assert!(prompt.contains("LOCAL-CTX"));
        assert!(prompt.contains("PRIOR-CONVO"));
        assert!(prompt.contains("- current_date:"));
    }
}
