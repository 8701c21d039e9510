//! 文档分块与导入
//!
//! 将文本文件切成带重叠的块后写入检索索引；优先在段落/句子边界断开（UTF-8 安全）。

use std::path::Path;
use std::sync::Arc;

use crate::retrieval::{RetrievedChunk, VectorIndex};

/// 分块策略
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// 目标块大小（字符数）
    pub chunk_size: usize,
    /// 块之间的重叠（字符数）
    pub chunk_overlap: usize,
    /// 分隔符优先级（从高到低）
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 600,
            chunk_overlap: 30,
            separators: vec!["\n\n".to_string(), "\n".to_string(), " ".to_string()],
        }
    }
}

/// 文档分块器
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// 将文档分割为块（UTF-8 安全）
    pub fn chunk(&self, source_id: &str, text: &str) -> Vec<RetrievedChunk> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        if total_chars == 0 {
            return chunks;
        }

        let mut current_idx = 0;

        while current_idx < total_chars {
            let target_end = (current_idx + self.config.chunk_size).min(total_chars);
            let mut actual_end = target_end;

            // 非文档末尾时尝试在分隔符处断开
            if target_end < total_chars {
                let slice: String = chars[current_idx..target_end].iter().collect();
                for sep in &self.config.separators {
                    if let Some(pos) = slice.rfind(sep) {
                        let chars_to_sep: usize = slice[..pos].chars().count() + sep.chars().count();
                        if chars_to_sep > 0 {
                            actual_end = current_idx + chars_to_sep;
                            break;
                        }
                    }
                }
            }

            // 至少前进一个字符
            if actual_end <= current_idx {
                actual_end = (current_idx + 1).min(total_chars);
            }

            let chunk_text: String = chars[current_idx..actual_end].iter().collect();
            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                chunks.push(RetrievedChunk::new(trimmed, source_id));
            }

            let overlap = self.config.chunk_overlap.min(actual_end - current_idx);
            let next_start = actual_end.saturating_sub(overlap);
            current_idx = if next_start > current_idx {
                next_start
            } else {
                actual_end
            };
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

/// 读取 UTF-8 文本文件、分块并写入索引；返回写入的块数
///
/// 文件不可读或写入失败都转为 Err(String)，由调用方决定如何向用户呈现。
pub fn ingest_text_file(index: &Arc<dyn VectorIndex>, path: &Path) -> Result<usize, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let source_id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let chunks = Chunker::default().chunk(&source_id, &text);
    let count = chunks.len();
    index.add_documents(chunks)?;
    tracing::info!(file = %path.display(), chunks = count, "ingested text file");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::KeywordIndex;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = Chunker::default().chunk("doc", "a short paragraph");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short paragraph");
        assert_eq!(chunks[0].source_id, "doc");
    }

    #[test]
    fn long_text_produces_bounded_overlapping_chunks() {
        let paragraph = "word ".repeat(200); // 1000 字符
        let chunks = Chunker::default().chunk("doc", &paragraph);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 600);
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(400), "b".repeat(400));
        let chunks = Chunker::default().chunk("doc", &text);
        assert_eq!(chunks[0].text, "a".repeat(400));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(Chunker::default().chunk("doc", "").is_empty());
    }

    #[test]
    fn ingest_reports_chunk_count() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "some local knowledge about rust traits").unwrap();

        let index: Arc<dyn VectorIndex> = Arc::new(KeywordIndex::default());
        let count = ingest_text_file(&index, &file).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            index.similarity_search("rust traits", 2).unwrap().len(),
            1
        );
    }

    #[test]
    fn ingest_missing_file_is_err() {
        let index: Arc<dyn VectorIndex> = Arc::new(KeywordIndex::default());
        assert!(ingest_text_file(&index, Path::new("/no/such/file.txt")).is_err());
    }
}
