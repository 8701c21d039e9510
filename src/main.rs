//! Rona - Rust 智能问答助手
//!
//! 入口：初始化日志、加载配置、组装 Session，并运行最小 REPL
//! （/load 导入文本文件，/clear 清空会话，/quit 退出）。

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rona::agent::AgentOrchestrator;
use rona::config::{load_config, AppConfig};
use rona::core::Session;
use rona::llm::OllamaClient;
use rona::memory::{ConversationStore, MemoryPersistence};
use rona::retrieval::{ingest_text_file, ContextRetriever, KeywordIndex, VectorIndex};
use rona::search::WebSearchGateway;
use rona::tools::{
    CurrentDateTool, CurrentTimeTool, FetchPageTool, ToolExecutor, ToolRegistry, WebSearchTool,
};

const WELCOME: &str = "\
Hello! I am Rona, your assistant with internet search.

- I can search the internet for fresh information
- I can answer questions about text files loaded into the local index (/load <file>)
- I can help with programming and technology

Ask me anything! (/clear to reset, /quit to exit)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    let mut session = build_session(&cfg);
    println!("{WELCOME}\n");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("Conversation cleared.\n");
            }
            _ if input.starts_with("/load ") => {
                let path = input.trim_start_matches("/load ").trim();
                load_file(&session, Path::new(path));
            }
            _ => match session.handle_turn(input).await {
                Ok(outcome) => {
                    if !outcome.tools_used.is_empty() {
                        tracing::info!(tools = ?outcome.tools_used, "tools used this turn");
                    }
                    println!("Rona: {}\n", outcome.response);
                }
                Err(e) => {
                    // 单轮失败：给出文案，会话保持可用
                    println!("Rona: {}\n", e.user_message());
                }
            },
        }
    }

    Ok(())
}

/// 从配置组装一个完整会话（真实 LLM + 搜索网关 + 关键词索引）
fn build_session(cfg: &AppConfig) -> Session {
    let llm = Arc::new(OllamaClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        cfg.llm.temperature,
    ));
    let gateway = Arc::new(WebSearchGateway::new(cfg.search.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(CurrentDateTool);
    registry.register(CurrentTimeTool);
    registry.register(WebSearchTool::new(gateway.clone()));
    registry.register(FetchPageTool::new(gateway));
    let executor = ToolExecutor::new(registry, cfg.agent.tool_timeout_secs);

    let orchestrator = AgentOrchestrator::new(
        llm,
        executor,
        cfg.agent.max_iterations,
        cfg.agent.max_execution_secs,
    );

    let store = ConversationStore::with_file(cfg.app.max_history, cfg.conversation_history_path());
    let window_persistence = MemoryPersistence::new(cfg.agent_memory_path());
    let index: Arc<dyn VectorIndex> = Arc::new(KeywordIndex::default());
    let retriever = ContextRetriever::new(Some(index), cfg.agent.retrieval_k);

    Session::new(
        store,
        window_persistence,
        retriever,
        orchestrator,
        cfg.agent.window_turns,
        cfg.app.context_messages,
    )
}

/// /load：读取文本文件、分块并写入本地索引
fn load_file(session: &Session, path: &Path) {
    let Some(index) = session.retriever().index() else {
        println!("The local document index is not available.\n");
        return;
    };
    match ingest_text_file(index, path) {
        Ok(count) => println!(
            "File loaded. {} chunks added to the local index. You can now ask questions about it.\n",
            count
        ),
        Err(e) => println!("{}\n", e),
    }
}
