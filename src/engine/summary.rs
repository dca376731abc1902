//! 分值统计：目标结构 vs 已选题目

use crate::models::{PaperConfig, Question, QuestionType};

/// 单个题型的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTally {
    pub question_type: QuestionType,
    pub target_count: u32,
    pub target_marks: u64,
    pub selected_count: usize,
    pub selected_marks: u64,
}

impl TypeTally {
    /// 已选数量与分值都达到目标
    pub fn is_satisfied(&self) -> bool {
        self.selected_count == self.target_count as usize
            && self.selected_marks == self.target_marks
    }
}

/// 整卷统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksSummary {
    /// 启用的题型或已有题目的题型，按排版顺序
    pub rows: Vec<TypeTally>,
    pub target_total: u64,
    pub selected_total: u64,
}

impl MarksSummary {
    pub fn compute(config: &PaperConfig, questions: &[Question]) -> Self {
        let rows: Vec<TypeTally> = config
            .pattern
            .iter()
            .map(|(question_type, detail)| {
                let of_type = questions
                    .iter()
                    .filter(|q| q.question_type == question_type);
                TypeTally {
                    question_type,
                    target_count: detail.count(),
                    target_marks: detail.target_marks(),
                    selected_count: of_type.clone().count(),
                    selected_marks: of_type.map(|q| u64::from(q.marks.get())).sum(),
                }
            })
            .filter(|row| {
                config.pattern.detail(row.question_type).is_enabled() || row.selected_count > 0
            })
            .collect();

        Self {
            target_total: config.total_marks(),
            selected_total: rows.iter().map(|row| row.selected_marks).sum(),
            rows,
        }
    }

    /// 还差多少分（超出为负）
    pub fn remaining(&self) -> i128 {
        i128::from(self.target_total) - i128::from(self.selected_total)
    }

    pub fn is_complete(&self) -> bool {
        self.selected_total == self.target_total
    }

    pub fn row(&self, question_type: QuestionType) -> Option<&TypeTally> {
        self.rows.iter().find(|row| row.question_type == question_type)
    }
}
