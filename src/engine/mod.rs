//! 组卷引擎（核心）
//!
//! - `assembly` - 已选题目集合：加入、移除、清空、批量加入 AI 题目、排序
//! - `ids` - 会话内 ID 分配
//! - `summary` - 目标分值与已选分值对比

pub mod assembly;
pub mod ids;
pub mod summary;

pub use assembly::{sort_selection, PaperAssembly};
pub use ids::IdAllocator;
pub use summary::{MarksSummary, TypeTally};
