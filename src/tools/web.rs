//! 互联网工具：搜索与页面抓取，委托给 WebSearchGateway
//!
//! 面向模型的输出约定：搜索结果渲染为编号的 title/url/snippet 列表，
//! 空结果集给明确的「没有结果」文案而不是空串。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::search::{SearchResult, WebSearchGateway};
use crate::tools::Tool;

/// 空结果集的用户可见文案
pub const NO_RESULTS_TEXT: &str = "No search results were found on the internet.";

/// 将结果渲染为编号列表；空集给明确文案
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_TEXT.to_string();
    }
    let mut out = format!("Search results for '{}':\n\n", query);
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, result.title));
        out.push_str(&format!("   URL: {}\n", result.url));
        out.push_str(&format!("   Summary: {}\n\n", result.snippet));
    }
    out
}

/// 搜索工具：query 必填，engine 可选（google / bing / duckduckgo，未识别回退默认）
pub struct WebSearchTool {
    gateway: Arc<WebSearchGateway>,
}

impl WebSearchTool {
    pub fn new(gateway: Arc<WebSearchGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet for current information that is not in the local database. \
         Args: {\"query\": \"...\", \"engine\": \"google|bing|duckduckgo\"} (engine optional)."
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        if query.is_empty() {
            return Err("Missing query".to_string());
        }
        let engine = args.get("engine").and_then(|v| v.as_str()).unwrap_or("");
        let results = self.gateway.search(query, engine).await;
        Ok(format_results(query, &results))
    }
}

/// 页面抓取工具：url 必填，返回去标记并截断后的正文
pub struct FetchPageTool {
    gateway: Arc<WebSearchGateway>,
}

impl FetchPageTool {
    pub fn new(gateway: Arc<WebSearchGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Fetch the readable content of a specific webpage when detailed information from one \
         site is needed. Args: {\"url\": \"https://...\"}."
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let url = args.get("url").and_then(|v| v.as_str()).unwrap_or("").trim();
        if url.is_empty() {
            return Err("Missing url".to_string());
        }
        tracing::info!(url = %url, "fetch_page tool");
        let content = self.gateway.fetch_page(url).await;
        if content.is_empty() {
            return Ok("No content could be retrieved from the given URL.".to_string());
        }
        Ok(format!("Page content from {}:\n\n{}", url, content))
    }
}
