//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个服务只做一件事，不持有会话状态：
//! - `generation` - 按结构让 AI 出题 / 按提示词生成题库
//! - `question_bank` - 候选题来源（静态题库、LLM 题库）

pub mod generation;
pub mod question_bank;

pub use generation::{BankPromptRequest, PatternGenerationRequest, QuestionGenerator, SlotRequest};
pub use question_bank::{BankQuery, PromptQuestionBank, QuestionBankProvider, StaticQuestionBank};
