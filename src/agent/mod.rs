//! Agent 层：模型输出解析与单轮编排循环

pub mod orchestrator;
pub mod planner;

pub use orchestrator::{AgentOrchestrator, AgentOutcome};
pub use planner::{parse_llm_output, PlannerOutput, ToolCall};
