//! 记忆层：对话历史（审计日志）、模型记忆窗口与各自的持久化

pub mod conversation;
pub mod persistence;
pub mod window;

use std::path::Path;

pub use conversation::{ConversationStore, Message, Role};
pub use persistence::MemoryPersistence;
pub use window::WindowedMemory;

/// 原子覆盖写：先写同目录临时文件再 rename，避免写一半的文件被下次启动读到
pub(crate) fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
