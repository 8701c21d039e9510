//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `RONA__*` 覆盖（双下划线表示嵌套，如 `RONA__LLM__MODEL=qwen2:7b`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub agent: AgentSection,
}

/// [app] 段：应用名、数据目录、对话历史容量、上下文条数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 持久化文件所在目录，未设置时用当前目录
    pub data_dir: Option<PathBuf>,
    /// 对话历史（审计日志）保留的消息条数上限
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// 拼入 prompt 的最近对话条数
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
}

fn default_max_history() -> usize {
    10
}

fn default_context_messages() -> usize {
    2
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            data_dir: None,
            max_history: default_max_history(),
            context_messages: default_context_messages(),
        }
    }
}

/// [llm] 段：模型、端点与采样温度（默认指向本地 Ollama 的 OpenAI 兼容端点）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    /// OpenAI 兼容端点；未设置时用本地 Ollama（http://localhost:11434/v1）
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "mistral:7b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

/// [search] 段：默认引擎、超时、结果上限、摘要/页面截断长度、各引擎 URL 模板
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    #[serde(default = "default_engine")]
    pub default_engine: String,
    /// 单次搜索/抓取请求超时（秒）
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    /// 每次搜索返回的结果条数上限
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// 结果摘要截断长度（字符）
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
    /// 页面正文截断长度（字符）
    #[serde(default = "default_page_max_chars")]
    pub page_max_chars: usize,
    /// 各引擎查询 URL 模板，`{}` 为编码后的查询词占位
    #[serde(default = "default_google_url")]
    pub google_url: String,
    #[serde(default = "default_bing_url")]
    pub bing_url: String,
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,
}

fn default_engine() -> String {
    "google".to_string()
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_max_results() -> usize {
    3
}

fn default_snippet_max_chars() -> usize {
    200
}

fn default_page_max_chars() -> usize {
    1000
}

fn default_google_url() -> String {
    "https://www.google.com/search?q={}".to_string()
}

fn default_bing_url() -> String {
    "https://www.bing.com/search?q={}".to_string()
}

fn default_duckduckgo_url() -> String {
    "https://duckduckgo.com/html/?q={}".to_string()
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            default_engine: default_engine(),
            timeout_secs: default_search_timeout_secs(),
            max_results: default_max_results(),
            snippet_max_chars: default_snippet_max_chars(),
            page_max_chars: default_page_max_chars(),
            google_url: default_google_url(),
            bing_url: default_bing_url(),
            duckduckgo_url: default_duckduckgo_url(),
        }
    }
}

/// [agent] 段：单轮迭代上限、软时间预算、本地检索条数、模型记忆窗口轮数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 单轮对话内模型最多调用次数
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// 单轮软时间预算（秒）：超出后不再发起新的迭代，不中断进行中的请求
    #[serde(default = "default_max_execution_secs")]
    pub max_execution_secs: u64,
    /// 单次工具调用超时（秒）；要大于搜索请求超时，给解析留余量
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// 本地检索返回的片段条数
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    /// 模型记忆窗口保留轮数（每轮 user + assistant 两条）
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
}

fn default_max_iterations() -> usize {
    3
}

fn default_max_execution_secs() -> u64 {
    30
}

fn default_tool_timeout_secs() -> u64 {
    15
}

fn default_retrieval_k() -> usize {
    2
}

fn default_window_turns() -> usize {
    4
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_execution_secs: default_max_execution_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
            retrieval_k: default_retrieval_k(),
            window_turns: default_window_turns(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            search: SearchSection::default(),
            agent: AgentSection::default(),
        }
    }
}

impl AppConfig {
    /// 对话历史文件路径（data_dir/conversation_history.json）
    pub fn conversation_history_path(&self) -> PathBuf {
        self.data_root().join("conversation_history.json")
    }

    /// 模型记忆窗口文件路径（data_dir/agent_memory.json）
    pub fn agent_memory_path(&self) -> PathBuf {
        self.data_root().join("agent_memory.json")
    }

    fn data_root(&self) -> PathBuf {
        self.app
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// 从 config 目录加载配置，环境变量 RONA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 RONA__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RONA")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.max_history, 10);
        assert_eq!(cfg.search.max_results, 3);
        assert_eq!(cfg.search.timeout_secs, 10);
        assert_eq!(cfg.agent.max_iterations, 3);
        assert_eq!(cfg.agent.max_execution_secs, 30);
        assert_eq!(cfg.agent.window_turns, 4);
    }

    #[test]
    fn data_paths_use_data_dir() {
        let mut cfg = AppConfig::default();
        cfg.app.data_dir = Some(PathBuf::from("/tmp/rona-data"));
        assert_eq!(
            cfg.conversation_history_path(),
            PathBuf::from("/tmp/rona-data/conversation_history.json")
        );
        assert_eq!(
            cfg.agent_memory_path(),
            PathBuf::from("/tmp/rona-data/agent_memory.json")
        );
    }
}
