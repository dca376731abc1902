//! # Paper Builder
//!
//! 按结构组装试卷的 Rust 库：挑选题库题目，或让 LLM 按结构出题
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（LLM 客户端），只暴露能力
//! - `TextGenerator` - 文本生成接口，`OpenAiGenerator` 为默认实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有会话状态
//! - `QuestionGenerator` - 按结构出题 / 按提示词生成题库
//! - `QuestionBankProvider` - 候选题来源（静态题库、LLM 题库）
//!
//! ### ③ 组卷引擎（Engine）
//! - `engine/` - 已选题目集合，全函数，不做任何 IO
//! - `PaperAssembly` - 加入、移除、清空、批量加入、排序
//! - `MarksSummary` - 目标分值与已选分值对比
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 组卷会话，唯一的状态持有者
//! - `orchestrator/request_tracker` - 过期结果丢弃
//!
//! 另有 `models/`（数据结构、结构编码、TOML 加载）与 `render/`（试卷输出）。
//!
//! ## 模块结构

pub mod config;
pub mod engine;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use engine::{IdAllocator, MarksSummary, PaperAssembly};
pub use error::{AppError, AppResult, FailureKind, LlmError};
pub use infrastructure::{OpenAiGenerator, TextGenerator};
pub use models::{
    AiQuestion, Difficulty, PaperConfig, Question, QuestionType, SingleQuestion, SubjectCatalog,
};
pub use orchestrator::{AssemblySession, Completion};
pub use render::{AssembledPaper, PaperRenderer, PlainTextRenderer};
pub use services::{QuestionBankProvider, QuestionGenerator, StaticQuestionBank};
