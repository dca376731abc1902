//! 试卷输出
//!
//! `AssembledPaper` 是会话对外暴露的只读视图，`PaperRenderer` 把它变成具体格式。

pub mod plain_text;

pub use plain_text::PlainTextRenderer;

use crate::engine::MarksSummary;
use crate::models::{PaperConfig, Question, QuestionType};

/// 组装完成的试卷视图
#[derive(Debug, Clone)]
pub struct AssembledPaper<'a> {
    pub config: &'a PaperConfig,
    /// 已按 (题型顺序, id) 排序
    pub questions: &'a [Question],
    pub summary: MarksSummary,
}

impl<'a> AssembledPaper<'a> {
    pub fn new(config: &'a PaperConfig, questions: &'a [Question]) -> Self {
        Self {
            config,
            questions,
            summary: MarksSummary::compute(config, questions),
        }
    }

    /// 按题型分组，顺序与排版顺序一致
    pub fn sections(&self) -> Vec<(QuestionType, &'a [Question])> {
        let questions = self.questions;
        let mut sections = Vec::new();
        let mut start = 0;

        while start < questions.len() {
            let question_type = questions[start].question_type;
            let len = questions[start..]
                .iter()
                .take_while(|q| q.question_type == question_type)
                .count();
            sections.push((question_type, &questions[start..start + len]));
            start += len;
        }

        sections
    }
}

/// 试卷渲染器
pub trait PaperRenderer {
    type Output;

    fn render(&self, paper: &AssembledPaper<'_>) -> Self::Output;
}
