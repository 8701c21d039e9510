//! 搜索网关：共享抓取策略与页面正文提取
//!
//! 所有出站请求复用同一个 HTTP 客户端：固定超时与浏览器 UA。
//! search 与 fetch_page 都是失败吞掉型：网络错、非 2xx、解析错一律给空结果/空串并记 warn。

use std::time::Duration;

use reqwest::Client;

use crate::config::SearchSection;
use crate::search::{parse_results, SearchEngine, SearchResult};

/// 浏览器样式 UA，避免被站点按爬虫拦截
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 搜索网关：引擎选择、统一抓取策略、结果规范化与页面正文提取
pub struct WebSearchGateway {
    client: Client,
    cfg: SearchSection,
    default_engine: SearchEngine,
}

impl WebSearchGateway {
    pub fn new(cfg: SearchSection) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers({
                use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
                let mut h = reqwest::header::HeaderMap::new();
                h.insert(
                    ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                        .parse()
                        .unwrap(),
                );
                h.insert(ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse().unwrap());
                h
            })
            .build()
            .unwrap_or_default();
        let default_engine = SearchEngine::resolve(&cfg.default_engine).unwrap_or(SearchEngine::Google);
        Self {
            client,
            cfg,
            default_engine,
        }
    }

    /// 按名称选引擎；未识别的名称静默回退到默认引擎（不报错）
    pub fn resolve_engine(&self, name: &str) -> SearchEngine {
        SearchEngine::resolve(name).unwrap_or(self.default_engine)
    }

    /// 引擎查询 URL：模板中的 `{}` 替换为编码后的查询词
    pub fn search_url(&self, engine: SearchEngine, query: &str) -> String {
        let template = match engine {
            SearchEngine::Google => &self.cfg.google_url,
            SearchEngine::Bing => &self.cfg.bing_url,
            SearchEngine::DuckDuckGo => &self.cfg.duckduckgo_url,
        };
        template.replace("{}", &urlencoding::encode(query))
    }

    /// 搜索：抓取结果页并解析为至多 max_results 条；任何失败都给空列表
    pub async fn search(&self, query: &str, engine_name: &str) -> Vec<SearchResult> {
        let engine = self.resolve_engine(engine_name);
        let url = self.search_url(engine, query);
        tracing::info!(query = %query, engine = %engine.name(), "searching web");

        let html = match self.fetch_html(&url).await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(engine = %engine.name(), error = %e, "search request failed");
                return Vec::new();
            }
        };
        parse_results(engine, &html, self.cfg.max_results, self.cfg.snippet_max_chars)
    }

    /// 抓取指定 URL 的正文：去掉脚本/样式、压缩空白、截断到上限；任何失败都给空串
    pub async fn fetch_page(&self, url: &str) -> String {
        let body = match self.fetch_html(url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "page fetch failed");
                return String::new();
            }
        };

        let text = html_to_text(&body);
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() > self.cfg.page_max_chars {
            format!(
                "{}...",
                collapsed
                    .chars()
                    .take(self.cfg.page_max_chars)
                    .collect::<String>()
            )
        } else {
            collapsed
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let mut body = resp.text().await.map_err(|e| format!("Read body: {}", e))?;
        // 去除 BOM，避免后续文本提取被首字符干扰
        if body.starts_with('\u{FEFF}') {
            body = body[3..].to_string();
        }
        Ok(body)
    }
}

/// 将 HTML 转为可读文本（去除 script/style 等）
fn html_to_text(html: &str) -> String {
    match html2text::from_read(html.as_bytes(), 120) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => strip_html_tags(html),
    }
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut prev_whitespace = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => {
                let is_whitespace = c.is_whitespace();
                if is_whitespace && prev_whitespace {
                    continue;
                }
                prev_whitespace = is_whitespace;
                out.push(if is_whitespace { ' ' } else { c });
            }
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 指向本机关闭端口的配置：连接被拒，模拟网络失败
    fn dead_endpoint_cfg() -> SearchSection {
        SearchSection {
            timeout_secs: 2,
            google_url: "http://127.0.0.1:9/search?q={}".to_string(),
            bing_url: "http://127.0.0.1:9/bing?q={}".to_string(),
            duckduckgo_url: "http://127.0.0.1:9/ddg?q={}".to_string(),
            ..SearchSection::default()
        }
    }

    #[test]
    fn unknown_engine_falls_back_to_default() {
        let gateway = WebSearchGateway::new(SearchSection::default());
        assert_eq!(gateway.resolve_engine("unknown-engine"), SearchEngine::Google);
        assert_eq!(
            gateway.resolve_engine("unknown-engine"),
            gateway.resolve_engine("google")
        );
    }

    #[test]
    fn search_url_encodes_query() {
        let gateway = WebSearchGateway::new(SearchSection::default());
        let url = gateway.search_url(SearchEngine::Google, "latest rust release");
        assert_eq!(
            url,
            "https://www.google.com/search?q=latest%20rust%20release"
        );
    }

    #[tokio::test]
    async fn search_network_failure_returns_empty() {
        let gateway = WebSearchGateway::new(dead_endpoint_cfg());
        assert!(gateway.search("anything", "google").await.is_empty());
    }

    #[tokio::test]
    async fn search_unknown_engine_behaves_like_default_on_failure() {
        let gateway = WebSearchGateway::new(dead_endpoint_cfg());
        let via_default = gateway.search("anything", "google").await;
        let via_unknown = gateway.search("anything", "unknown-engine").await;
        assert_eq!(via_default, via_unknown);
    }

    #[tokio::test]
    async fn fetch_page_failure_returns_empty_string() {
        let gateway = WebSearchGateway::new(dead_endpoint_cfg());
        assert_eq!(gateway.fetch_page("http://127.0.0.1:9/page").await, "");
    }

    #[test]
    fn strip_html_tags_collapses_whitespace() {
        let html = "<p>hello   <b>world</b></p>\n\n<script>var x = 1;</script>";
        let text = strip_html_tags(html);
        assert!(text.starts_with("hello world"));
    }
}
