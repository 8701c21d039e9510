//! 会话：单个用户会话的全部可变状态与单轮流程
//!
//! 显式 Session 对象独占持有对话历史、模型记忆窗口与编排器，按引用传给各操作；
//! 多会话部署给每个会话各自的 Session 即可，无需锁（单会话同时最多一轮在飞）。
//!
//! 单轮状态机：Idle → ContextGathering → ModelReasoning → Responding → Idle；
//! 任一步的不可恢复失败（目前只有模型传输失败）进入 Errored，
//! 给出用户可见的错误文案并回到 Idle，已存储状态不受影响。

use crate::agent::{AgentOrchestrator, AgentOutcome};
use crate::core::AgentError;
use crate::memory::{ConversationStore, MemoryPersistence, Message, Role, WindowedMemory};
use crate::retrieval::ContextRetriever;

/// 单轮阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    ContextGathering,
    ModelReasoning,
    Responding,
    Errored,
}

/// 用户会话：一轮 = 记录输入 → 检索 → 模型调用（可用工具）→ 记录回复 → 落盘窗口
pub struct Session {
    store: ConversationStore,
    window: WindowedMemory,
    window_persistence: MemoryPersistence,
    retriever: ContextRetriever,
    orchestrator: AgentOrchestrator,
    context_messages: usize,
    phase: TurnPhase,
    last_terminal_phase: TurnPhase,
}

impl Session {
    /// 组装会话；窗口内容从持久化文件加载（缺失或损坏则从空窗口开始）
    pub fn new(
        store: ConversationStore,
        window_persistence: MemoryPersistence,
        retriever: ContextRetriever,
        orchestrator: AgentOrchestrator,
        window_turns: usize,
        context_messages: usize,
    ) -> Self {
        let mut window = WindowedMemory::new(window_turns);
        window.set_messages(window_persistence.load());
        Self {
            store,
            window,
            window_persistence,
            retriever,
            orchestrator,
            context_messages,
            phase: TurnPhase::Idle,
            last_terminal_phase: TurnPhase::Idle,
        }
    }

    /// 处理一轮用户输入
    ///
    /// 检索与持久化都是失败吞掉型，只有模型传输失败以 Err 返回；
    /// 失败的轮不追加 assistant 消息、不重写窗口文件，下一轮从上次成功状态继续。
    pub async fn handle_turn(&mut self, input: &str) -> Result<AgentOutcome, AgentError> {
        self.set_phase(TurnPhase::ContextGathering);
        self.store.add(Role::User, input);
        let context = self.retriever.fetch(input);
        let conversation_context = self.store.recent_context_text(self.context_messages);

        self.set_phase(TurnPhase::ModelReasoning);
        let window_snapshot: Vec<Message> = self.window.messages().to_vec();
        match self
            .orchestrator
            .invoke(input, &context, &conversation_context, &window_snapshot)
            .await
        {
            Ok(outcome) => {
                self.set_phase(TurnPhase::Responding);
                self.store.add(Role::Assistant, outcome.response.clone());
                self.window.push_turn(input, &outcome.response);
                self.window_persistence.save(self.window.messages());
                self.last_terminal_phase = TurnPhase::Responding;
                self.set_phase(TurnPhase::Idle);
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                self.set_phase(TurnPhase::Errored);
                self.last_terminal_phase = TurnPhase::Errored;
                self.set_phase(TurnPhase::Idle);
                Err(e)
            }
        }
    }

    /// 清空会话：对话历史与模型记忆窗口连同两份磁盘文件一起清空
    pub fn clear(&mut self) {
        self.store.clear();
        self.window.clear();
        self.window_persistence.clear();
        tracing::info!("session cleared");
    }

    /// 对话历史（审计日志）只读视图
    pub fn history(&self) -> &[Message] {
        self.store.messages()
    }

    /// 模型记忆窗口只读视图
    pub fn window(&self) -> &[Message] {
        self.window.messages()
    }

    /// 当前阶段（轮与轮之间为 Idle）
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// 上一轮的终止阶段（Responding 成功 / Errored 失败）
    pub fn last_terminal_phase(&self) -> TurnPhase {
        self.last_terminal_phase
    }

    /// 导入等旁路操作需要拿检索器
    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        tracing::debug!(?phase, "turn phase");
        self.phase = phase;
    }
}
