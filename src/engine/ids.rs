//! 题目 ID 分配

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::QuestionId;

/// 会话内的题目 ID 分配器
///
/// 克隆出的句柄共享同一个计数器：组卷引擎给 AI 题目分配 ID，
/// LLM 题库给候选题分配临时 ID，两边不会撞号。
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Arc<AtomicU64>,
}

impl IdAllocator {
    /// 从指定 ID 开始分配
    pub fn starting_at(first: QuestionId) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first.max(1))),
        }
    }

    /// 以当前毫秒时间戳作为起点，远高于静态题库的 ID
    pub fn from_clock() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self::starting_at(u64::try_from(millis).unwrap_or(1))
    }

    /// 分配一个新 ID
    pub fn issue(&self) -> QuestionId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// 登记一个外部 ID，之后分配的 ID 都比它大
    pub fn observe(&self, id: QuestionId) {
        self.next.fetch_max(id.saturating_add(1), Ordering::Relaxed);
    }

    /// 下一个将要分配的 ID
    pub fn peek(&self) -> QuestionId {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::from_clock()
    }
}
