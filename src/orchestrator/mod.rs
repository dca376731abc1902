//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有组卷会话的全部可变状态，负责把外部调用的结果安全地落到试卷上。
//!
//! ## 模块划分
//!
//! ### `session` - 组卷会话
//! - 持有试卷结构、已选题目、候选池
//! - 调度候选题刷新与 AI 出题
//! - 失败时保持状态不变
//!
//! ### `request_tracker` - 请求令牌
//! - 每个槽位（候选题 / AI 出题）一个单调递增令牌
//! - 过期结果直接丢弃（以最新请求为准）
//!
//! ## 层次关系
//!
//! ```text
//! session (持有状态，调度)
//!     ↓
//! engine (组卷引擎：PaperAssembly)
//!     ↓
//! services (能力层：generation / question_bank)
//!     ↓
//! infrastructure (基础设施：TextGenerator)
//! ```

pub mod request_tracker;
pub mod session;

pub use request_tracker::{RequestSlot, RequestTicket, RequestTracker};
pub use session::{AssemblySession, Completion};
