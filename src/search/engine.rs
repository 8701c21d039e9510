//! 搜索引擎适配：各引擎结果页的选择器路径与解析
//!
//! 每个引擎只在三点上不同：查询 URL 模板、结果块的选择器路径、出站链接的解包方式
//! （Google 把外链包在 /url?q= 重定向参数里）。选择器抽取天然脆弱于页面改版，
//! 约定上「选择器没匹配到」与「真的零结果」是同一个可观察结果：空列表。

use scraper::{ElementRef, Html, Selector};

/// 支持的搜索引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
}

impl SearchEngine {
    /// 按名称解析；未识别的名称返回 None，由网关静默回退到默认引擎
    pub fn resolve(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "bing" => Some(Self::Bing),
            "duckduckgo" => Some(Self::DuckDuckGo),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
        }
    }
}

/// 单条搜索结果；snippet 已按上限截断，产生后立即被消费、从不持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// 解析结果页 HTML：按引擎分发，最多返回 max_results 条；解析失败等同零结果
pub fn parse_results(
    engine: SearchEngine,
    html: &str,
    max_results: usize,
    snippet_max_chars: usize,
) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    match engine {
        SearchEngine::Google => parse_google(&doc, max_results, snippet_max_chars),
        SearchEngine::Bing => parse_bing(&doc, max_results, snippet_max_chars),
        SearchEngine::DuckDuckGo => parse_duckduckgo(&doc, max_results, snippet_max_chars),
    }
}

/// Google：结果块 div.g，标题 h3，链接取块内第一个 a[href]，摘要 div.VwiC3b
fn parse_google(doc: &Html, max_results: usize, snippet_max_chars: usize) -> Vec<SearchResult> {
    let block_sel = Selector::parse("div.g").unwrap();
    let title_sel = Selector::parse("h3").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();
    let snippet_sel = Selector::parse("div.VwiC3b").unwrap();

    let mut results = Vec::new();
    for block in doc.select(&block_sel).take(max_results) {
        let title = block.select(&title_sel).next().map(collapsed_text);
        let link = block
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(unwrap_google_redirect);
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        if let (Some(title), Some(url)) = (title, link) {
            results.push(SearchResult {
                title,
                url,
                snippet: truncate_snippet(&snippet, snippet_max_chars),
            });
        }
    }
    results
}

/// Bing：结果块 li.b_algo，标题 h2，链接取块内第一个 a[href]，摘要 p
fn parse_bing(doc: &Html, max_results: usize, snippet_max_chars: usize) -> Vec<SearchResult> {
    let block_sel = Selector::parse("li.b_algo").unwrap();
    let title_sel = Selector::parse("h2").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();
    let snippet_sel = Selector::parse("p").unwrap();

    let mut results = Vec::new();
    for block in doc.select(&block_sel).take(max_results) {
        let title = block.select(&title_sel).next().map(collapsed_text);
        let link = block
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        if let (Some(title), Some(url)) = (title, link) {
            results.push(SearchResult {
                title,
                url,
                snippet: truncate_snippet(&snippet, snippet_max_chars),
            });
        }
    }
    results
}

/// DuckDuckGo（html 版）：结果块 div.result，标题与链接同在 a.result__a，摘要 a.result__snippet
fn parse_duckduckgo(doc: &Html, max_results: usize, snippet_max_chars: usize) -> Vec<SearchResult> {
    let block_sel = Selector::parse("div.result").unwrap();
    let title_sel = Selector::parse("a.result__a").unwrap();
    let snippet_sel = Selector::parse("a.result__snippet").unwrap();

    let mut results = Vec::new();
    for block in doc.select(&block_sel).take(max_results) {
        let Some(anchor) = block.select(&title_sel).next() else {
            continue;
        };
        let title = collapsed_text(anchor);
        let url = anchor.value().attr("href").unwrap_or_default().to_string();
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet: truncate_snippet(&snippet, snippet_max_chars),
        });
    }
    results
}

/// Google 出站链接形如 /url?q=<目标>&sa=...，取 q 参数原值
fn unwrap_google_redirect(href: &str) -> String {
    match href.strip_prefix("/url?q=") {
        Some(rest) => rest.split('&').next().unwrap_or(rest).to_string(),
        None => href.to_string(),
    }
}

/// 抽取元素文本并压缩空白
fn collapsed_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_snippet(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
