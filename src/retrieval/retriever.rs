//! 容错的上下文检索
//!
//! 包装可插拔的相似度检索协作方：协作方缺失、调用失败或零命中时都退回固定占位文本并记 warn，
//! 绝不向上抛：管线必须在检索完全坏掉时仍照常调用模型。

use std::sync::Arc;

/// 检索协作方返回的片段；管线只把 text 当不透明文本拼接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_id: String,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
        }
    }
}

/// 相似度检索协作方：管线只消费这两个操作
pub trait VectorIndex: Send + Sync {
    /// 按查询检索最相关的 k 条片段
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, String>;

    /// 批量写入片段
    fn add_documents(&self, chunks: Vec<RetrievedChunk>) -> Result<(), String>;
}

/// 协作方未配置时的占位文本
pub const NO_INDEX_TEXT: &str =
    "The local document index is not available. Relying on general knowledge and the internet.";
/// 检索调用失败时的占位文本
pub const SEARCH_FAILED_TEXT: &str = "The local document search failed.";
/// 零命中时的占位文本
pub const NO_CONTEXT_TEXT: &str =
    "No relevant context is available for this question in the local document index.";

/// 上下文检索器：fetch 永远返回可用文本
pub struct ContextRetriever {
    index: Option<Arc<dyn VectorIndex>>,
    k: usize,
}

impl ContextRetriever {
    pub fn new(index: Option<Arc<dyn VectorIndex>>, k: usize) -> Self {
        Self { index, k }
    }

    /// 取本地上下文：命中片段按换行拼接；任何失败路径给固定占位文本
    pub fn fetch(&self, query: &str) -> String {
        let Some(ref index) = self.index else {
            return NO_INDEX_TEXT.to_string();
        };
        match index.similarity_search(query, self.k) {
            Ok(chunks) if chunks.is_empty() => NO_CONTEXT_TEXT.to_string(),
            Ok(chunks) => chunks
                .into_iter()
                .map(|c| c.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                tracing::warn!(error = %e, "vector search failed");
                SEARCH_FAILED_TEXT.to_string()
            }
        }
    }

    /// 导入等旁路操作需要直接拿协作方
    pub fn index(&self) -> Option<&Arc<dyn VectorIndex>> {
        self.index.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingIndex;

    impl VectorIndex for FailingIndex {
        fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<RetrievedChunk>, String> {
            Err("index exploded".to_string())
        }

        fn add_documents(&self, _chunks: Vec<RetrievedChunk>) -> Result<(), String> {
            Err("index exploded".to_string())
        }
    }

    struct FixedIndex(Vec<RetrievedChunk>);

    impl VectorIndex for FixedIndex {
        fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<RetrievedChunk>, String> {
            Ok(self.0.iter().take(k).cloned().collect())
        }

        fn add_documents(&self, _chunks: Vec<RetrievedChunk>) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn missing_index_yields_placeholder() {
        let retriever = ContextRetriever::new(None, 2);
        assert_eq!(retriever.fetch("anything"), NO_INDEX_TEXT);
    }

    #[test]
    fn failing_index_yields_fallback_not_panic() {
        let retriever = ContextRetriever::new(Some(Arc::new(FailingIndex)), 2);
        assert_eq!(retriever.fetch("anything"), SEARCH_FAILED_TEXT);
    }

    #[test]
    fn empty_hits_yield_no_context_text() {
        let retriever = ContextRetriever::new(Some(Arc::new(FixedIndex(Vec::new()))), 2);
        assert_eq!(retriever.fetch("anything"), NO_CONTEXT_TEXT);
    }

    #[test]
    fn hits_are_joined_by_newlines() {
        let retriever = ContextRetriever::new(
            Some(Arc::new(FixedIndex(vec![
                RetrievedChunk::new("first chunk", "doc-a"),
                RetrievedChunk::new("second chunk", "doc-a"),
            ]))),
            2,
        );
        assert_eq!(retriever.fetch("anything"), "first chunk\nsecond chunk");
    }
}
