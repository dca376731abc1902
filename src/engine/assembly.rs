//! 组卷引擎
//!
//! 持有正在组装的试卷的已选题目：
//! - 以 `id` 作为唯一身份，不做内容去重
//! - 每次修改后按 (题型顺序, id) 稳定排序
//! - 所有操作都是全函数，外部失败不会走到这里

use tracing::debug;

use crate::engine::ids::IdAllocator;
use crate::engine::summary::MarksSummary;
use crate::models::{AiQuestion, PaperConfig, Provenance, Question, QuestionId};

/// 已选题目集合
#[derive(Debug, Clone)]
pub struct PaperAssembly {
    selected: Vec<Question>,
    ids: IdAllocator,
}

impl PaperAssembly {
    pub fn new(ids: IdAllocator) -> Self {
        Self {
            selected: Vec::new(),
            ids,
        }
    }

    /// 当前试卷题目（已排序）
    pub fn questions(&self) -> &[Question] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.selected.iter().any(|q| q.id == id)
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.selected.iter().find(|q| q.id == id)
    }

    /// 加入一道题；同 id 已存在时不做任何修改（保留原题）
    pub fn add(&mut self, question: Question) -> &[Question] {
        if self.contains(question.id) {
            debug!("题目 #{} 已在试卷中，忽略", question.id);
            return &self.selected;
        }

        self.ids.observe(question.id);
        self.selected.push(question);
        self.sort();
        &self.selected
    }

    /// 移除一道题，返回是否确实移除
    pub fn remove(&mut self, id: QuestionId) -> bool {
        let before = self.selected.len();
        // retain 保持相对顺序，删除后仍然有序
        self.selected.retain(|q| q.id != id);
        self.selected.len() != before
    }

    /// 清空试卷
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    /// 批量加入 AI 题目
    ///
    /// 按输入顺序逐个分配新 ID、补上来源信息后追加，最后统一排序。
    /// 返回分配的 ID，顺序与输入一致。
    pub fn add_batch(
        &mut self,
        batch: Vec<AiQuestion>,
        provenance: &Provenance,
    ) -> Vec<QuestionId> {
        let mut assigned = Vec::with_capacity(batch.len());

        for ai_question in batch {
            let id = self.fresh_id();
            self.selected.push(ai_question.lift(id, provenance));
            assigned.push(id);
        }

        self.sort();
        debug!(
            "批量加入 {} 道 AI 题目 (章节: {})",
            assigned.len(),
            provenance.chapter
        );
        assigned
    }

    /// 已选题目总分
    pub fn selected_marks(&self) -> u64 {
        self.selected.iter().map(|q| u64::from(q.marks.get())).sum()
    }

    /// 与目标结构对比的统计
    pub fn summary(&self, config: &PaperConfig) -> MarksSummary {
        MarksSummary::compute(config, &self.selected)
    }

    fn fresh_id(&self) -> QuestionId {
        loop {
            let id = self.ids.issue();
            if !self.contains(id) {
                return id;
            }
        }
    }

    fn sort(&mut self) {
        sort_selection(&mut self.selected);
    }
}

/// 按 (题型顺序, id) 稳定排序
pub fn sort_selection(questions: &mut [Question]) {
    questions.sort_by_key(|q| (q.question_type.rank(), q.id));
}
