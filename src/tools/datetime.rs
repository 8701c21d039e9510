//! 日期/时间工具

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// 当前日期工具：YYYY-MM-DD
pub struct CurrentDateTool;

#[async_trait]
impl Tool for CurrentDateTool {
    fn name(&self) -> &str {
        "current_date"
    }

    fn description(&self) -> &str {
        "Returns the current date in YYYY-MM-DD format. Args: {}"
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(chrono::Local::now().format("%Y-%m-%d").to_string())
    }
}

/// 当前时间工具：HH:MM:SS
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Returns the current time in HH:MM:SS format. Args: {}"
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(chrono::Local::now().format("%H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn date_is_iso_shaped() {
        let out = CurrentDateTool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out.as_bytes()[4], b'-');
        assert_eq!(out.as_bytes()[7], b'-');
    }

    #[tokio::test]
    async fn time_is_colon_separated() {
        let out = CurrentTimeTool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(out.as_bytes()[2], b':');
        assert_eq!(out.as_bytes()[5], b':');
    }
}
