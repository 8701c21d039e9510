//! 工具箱：日期/时间、互联网搜索、页面抓取，与按名注册/执行的基础设施

pub mod datetime;
pub mod executor;
pub mod registry;
pub mod web;

pub use datetime::{CurrentDateTool, CurrentTimeTool};
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
pub use web::{FetchPageTool, WebSearchTool};
