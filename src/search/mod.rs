//! 互联网搜索层：多引擎结果页解析与共享抓取网关

pub mod engine;
pub mod gateway;

pub use engine::{parse_results, SearchEngine, SearchResult};
pub use gateway::WebSearchGateway;
