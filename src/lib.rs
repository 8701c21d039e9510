//! Rona - Rust 智能问答助手
//!
//! 把三个各自不可靠的信息源（本地文档索引、多引擎互联网搜索、语言模型）
//! 合成一条有界、可恢复的单轮管线。
//!
//! 模块划分：
//! - **agent**: 模型输出解析与单轮编排循环（迭代上限 / 软时间预算 / 解析失败恢复）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与会话状态机（Session 独占会话内全部可变状态）
//! - **llm**: LLM 客户端抽象与实现（Ollama 的 OpenAI 兼容端点 / Mock）
//! - **memory**: 对话历史（审计日志）、模型记忆窗口与各自的持久化 schema
//! - **retrieval**: 容错的本地上下文检索、关键词索引与文档分块导入
//! - **search**: 多引擎搜索结果解析与共享抓取网关
//! - **tools**: 工具箱（日期、时间、web_search、fetch_page）与执行器

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod retrieval;
pub mod search;
pub mod tools;
