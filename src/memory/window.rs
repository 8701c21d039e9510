//! 模型记忆窗口
//!
//! 喂回模型的先前对话，独立于审计用的对话历史：只保留最近 K 轮
//! （每轮含 user + assistant，故实际保留约 window_turns*2 条消息），超出时自动剪枝。

use crate::memory::Message;

/// 模型记忆窗口：最近 K 轮对话
#[derive(Clone, Debug)]
pub struct WindowedMemory {
    messages: Vec<Message>,
    window_turns: usize,
}

impl WindowedMemory {
    pub fn new(window_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            window_turns,
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
        self.prune();
    }

    /// 整轮写入：一轮完整结束后才变更窗口，轮中不动
    pub fn push_turn(&mut self, user_input: &str, response: &str) {
        self.messages.push(Message::user(user_input));
        self.messages.push(Message::assistant(response));
        self.prune();
    }

    /// 加载持久化内容时整体替换
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 超出 window_turns*2 时丢弃最旧的消息，保留最近部分
    fn prune(&mut self) {
        let keep = self.window_turns * 2;
        if self.messages.len() > keep {
            self.messages.drain(..self.messages.len() - keep);
        }
    }
}
