//! 模型记忆窗口持久化
//!
//! 与对话历史文件刻意分开的第二份 schema：消息按类型打标
//! （"human" / "ai"，而非 role 词汇表），单文件 JSON 数组，每次保存整文件重写。
//! save / load 吞掉并记录 I/O 与解析错误，绝不向上抛。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::memory::{write_atomic, Message, Role};

/// 磁盘上的打标消息（独立于内存 Message 的 DTO）
#[derive(Serialize, Deserialize)]
struct TaggedMessage {
    #[serde(rename = "type")]
    kind: String,
    data: TaggedData,
}

#[derive(Serialize, Deserialize)]
struct TaggedData {
    content: String,
}

/// 模型记忆窗口的文件持久化
#[derive(Debug)]
pub struct MemoryPersistence {
    path: PathBuf,
}

impl MemoryPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 将窗口内容序列化为打标格式并整文件重写；失败记 warn
    pub fn save(&self, messages: &[Message]) {
        let tagged: Vec<TaggedMessage> = messages
            .iter()
            .map(|m| TaggedMessage {
                kind: match m.role {
                    Role::User => "human",
                    Role::Assistant => "ai",
                    Role::System => "system",
                }
                .to_string(),
                data: TaggedData {
                    content: m.content.clone(),
                },
            })
            .collect();
        let json = match serde_json::to_string_pretty(&tagged) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize memory window");
                return;
            }
        };
        if let Err(e) = write_atomic(&self.path, &json) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save memory window");
        }
    }

    /// 从文件加载窗口内容
    ///
    /// 文件缺失返回空；解析失败或形状不是数组时记 warn 并返回空；
    /// 未知类型标签跳过。加载出的消息以加载时刻为时间戳（文件不存时间戳）。
    pub fn load(&self) -> Vec<Message> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no existing memory file found");
            return Vec::new();
        }
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read memory file");
                return Vec::new();
            }
        };
        let tagged: Vec<TaggedMessage> = match serde_json::from_str(&data) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "memory file format is incorrect");
                return Vec::new();
            }
        };
        tagged
            .into_iter()
            .filter_map(|t| match t.kind.as_str() {
                "human" => Some(Message::user(t.data.content)),
                "ai" => Some(Message::assistant(t.data.content)),
                "system" => Some(Message::system(t.data.content)),
                other => {
                    tracing::warn!(kind = %other, "skipping message with unknown type tag");
                    None
                }
            })
            .collect()
    }

    /// 清空操作：把文件重写为空数组
    pub fn clear(&self) {
        self.save(&[]);
    }
}
