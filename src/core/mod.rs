//! 核心层：错误类型与会话状态机

pub mod error;
pub mod session;

pub use error::AgentError;
pub use session::{Session, TurnPhase};
