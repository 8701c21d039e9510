//! 对话历史（审计日志）
//!
//! 只追加、定容的消息日志：超出容量时从头部 FIFO 淘汰，每次变更整文件原子重写到磁盘。
//! recent_context_text 按角色截断后渲染最近几条，仅用于拼 prompt，不改动存储内容。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::memory::write_atomic;

/// 拼上下文时 user 内容的截断长度（字符）
const USER_CONTEXT_CHARS: usize = 500;
/// 拼上下文时 assistant 内容的截断长度（字符）
const ASSISTANT_CONTEXT_CHARS: usize = 800;

/// 消息角色（与 LLM API 一致；历史文件中只会出现 user / assistant）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息：角色、内容与写入时刻（ISO-8601），写入后不再修改
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// 对话历史：容量 N 的 FIFO 日志，单文件 JSON 数组持久化
///
/// 文件缺失、不可读或形状不是数组时从空历史启动并记 warn，不让启动失败。
#[derive(Debug)]
pub struct ConversationStore {
    messages: Vec<Message>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl ConversationStore {
    /// 仅内存（测试或一次性会话用）
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity,
            path: None,
        }
    }

    /// 绑定持久化文件；文件存在则加载，加载失败从空历史启动
    pub fn with_file(capacity: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let messages = Self::load_from(&path);
        let mut store = Self {
            messages,
            capacity,
            path: Some(path),
        };
        store.trim();
        store
    }

    fn load_from(path: &std::path::Path) -> Vec<Message> {
        if !path.exists() {
            return Vec::new();
        }
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read conversation history, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Message>>(&data) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "conversation history is not a message list, starting empty");
                Vec::new()
            }
        }
    }

    /// 追加一条消息：打当前时间戳，从头部淘汰超出容量的部分，整文件重写
    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        self.trim();
        self.persist();
    }

    fn trim(&mut self) {
        if self.messages.len() > self.capacity {
            let excess = self.messages.len() - self.capacity;
            self.messages.drain(..excess);
        }
    }

    /// 最近 min(k, len) 条消息渲染为 "User: ..." / "Assistant: ..." 行
    ///
    /// user 内容截到 500 字符、assistant 截到 800 字符，仅作用于返回文本。
    pub fn recent_context_text(&self, k: usize) -> String {
        let start = self.messages.len().saturating_sub(k);
        let mut lines = Vec::new();
        for msg in &self.messages[start..] {
            match msg.role {
                Role::User => {
                    lines.push(format!("User: {}", truncate_chars(&msg.content, USER_CONTEXT_CHARS)));
                }
                Role::Assistant => {
                    lines.push(format!(
                        "Assistant: {}",
                        truncate_chars(&msg.content, ASSISTANT_CONTEXT_CHARS)
                    ));
                }
                Role::System => {}
            }
        }
        lines.join("\n")
    }

    /// 清空历史并把持久化文件重写为空数组
    pub fn clear(&mut self) {
        self.messages.clear();
        self.persist();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 整文件重写；失败记 warn 并继续用内存态
    fn persist(&self) {
        let Some(ref path) = self.path else {
            return;
        };
        let json = match serde_json::to_string_pretty(&self.messages) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize conversation history");
                return;
            }
        };
        if let Err(e) = write_atomic(path, &json) {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist conversation history");
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        s.chars().take(max_chars).collect()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_enforced_fifo() {
        let mut store = ConversationStore::in_memory(3);
        for i in 0..7 {
            store.add(Role::User, format!("msg-{i}"));
        }
        assert_eq!(store.len(), 3);
        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg-4", "msg-5", "msg-6"]);
    }

    #[test]
    fn capacity_one_keeps_only_latest() {
        let mut store = ConversationStore::in_memory(1);
        store.add(Role::User, "hi");
        store.add(Role::Assistant, "hello");
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].role, Role::Assistant);
        assert_eq!(store.messages()[0].content, "hello");
    }

    #[test]
    fn recent_context_truncates_only_rendered_text() {
        let mut store = ConversationStore::in_memory(10);
        let long_user = "u".repeat(600);
        let long_assistant = "a".repeat(900);
        store.add(Role::User, long_user.clone());
        store.add(Role::Assistant, long_assistant.clone());

        let context = store.recent_context_text(2);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("User: {}", "u".repeat(500)));
        assert_eq!(lines[1], format!("Assistant: {}", "a".repeat(800)));

        // 存储内容未被截断
        assert_eq!(store.messages()[0].content, long_user);
        assert_eq!(store.messages()[1].content, long_assistant);
    }

    #[test]
    fn recent_context_returns_min_k_len_entries() {
        let mut store = ConversationStore::in_memory(10);
        store.add(Role::User, "only one");
        assert_eq!(store.recent_context_text(5).lines().count(), 1);
        store.add(Role::Assistant, "two");
        store.add(Role::User, "three");
        assert_eq!(store.recent_context_text(2).lines().count(), 2);
        // 最近的在最后
        assert!(store.recent_context_text(2).ends_with("User: three"));
    }

    #[test]
    fn persistence_round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation_history.json");

        let mut store = ConversationStore::with_file(10, &path);
        store.add(Role::User, "question");
        store.add(Role::Assistant, "answer");
        let saved = store.messages().to_vec();

        let reloaded = ConversationStore::with_file(10, &path);
        assert_eq!(reloaded.messages(), saved.as_slice());
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation_history.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        let store = ConversationStore::with_file(10, &path);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_rewrites_file_as_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation_history.json");

        let mut store = ConversationStore::with_file(10, &path);
        store.add(Role::User, "hi");
        store.clear();
        assert!(store.is_empty());

        let data = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Message> = serde_json::from_str(&data).unwrap();
        assert!(parsed.is_empty());
    }
}
