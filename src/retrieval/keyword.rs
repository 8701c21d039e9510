//! 关键词重叠索引
//!
//! VectorIndex 的内置实现：小写分词后按词重叠数打分（无真实向量，嵌入计算不在本仓库范围内）。
//! 真实部署可换成任意实现了 VectorIndex 的外部向量库适配器。

use std::collections::HashSet;
use std::sync::RwLock;

use crate::retrieval::{RetrievedChunk, VectorIndex};

/// 将文本切分为小写词集合，用于简单相似度（词重叠数）
fn tokenize_lower(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 1)
        .collect()
}

/// 内存关键词索引：(chunk, 词集合) 列表，容量满时淘汰最旧
pub struct KeywordIndex {
    store: RwLock<Vec<(RetrievedChunk, HashSet<String>)>>,
    max_entries: usize,
}

impl KeywordIndex {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: RwLock::new(Vec::new()),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl VectorIndex for KeywordIndex {
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, String> {
        let query_tokens = tokenize_lower(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }
        let store = self
            .store
            .read()
            .map_err(|_| "keyword index lock poisoned".to_string())?;
        let mut scored: Vec<(usize, RetrievedChunk)> = store
            .iter()
            .map(|(chunk, doc_tokens)| {
                (query_tokens.intersection(doc_tokens).count(), chunk.clone())
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, c)| c).collect())
    }

    fn add_documents(&self, chunks: Vec<RetrievedChunk>) -> Result<(), String> {
        let mut store = self
            .store
            .write()
            .map_err(|_| "keyword index lock poisoned".to_string())?;
        for chunk in chunks {
            if chunk.text.trim().is_empty() {
                continue;
            }
            let tokens = tokenize_lower(&chunk.text);
            store.push((chunk, tokens));
        }
        let n = store.len();
        if n > self.max_entries {
            store.drain(0..n - self.max_entries);
        }
        Ok(())
    }
}
