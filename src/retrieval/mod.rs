//! 本地检索层：向量索引抽象、容错的上下文检索器、文档分块与导入

pub mod chunker;
pub mod keyword;
pub mod retriever;

pub use chunker::{ingest_text_file, Chunker, ChunkingConfig};
pub use keyword::KeywordIndex;
pub use retriever::{ContextRetriever, RetrievedChunk, VectorIndex};
