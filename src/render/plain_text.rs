//! 纯文本试卷

use crate::models::{Question, SingleQuestion};
use crate::render::{AssembledPaper, PaperRenderer};

/// 纯文本渲染器
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    /// 分隔线宽度
    pub width: usize,
    /// 是否输出页脚的分值统计
    pub show_footer: bool,
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self {
            width: 60,
            show_footer: true,
        }
    }
}

impl PaperRenderer for PlainTextRenderer {
    type Output = String;

    fn render(&self, paper: &AssembledPaper<'_>) -> String {
        let mut lines = self.header(paper);

        let mut number = 0;
        for (index, (question_type, questions)) in paper.sections().into_iter().enumerate() {
            let section_marks: u64 = questions.iter().map(|q| u64::from(q.marks.get())).sum();
            lines.push(String::new());
            lines.push(format!(
                "{}. {} ({})  [{}]",
                section_letter(index),
                question_type.heading(),
                question_type.label(),
                section_marks
            ));
            lines.push(String::new());

            for question in questions {
                number += 1;
                push_question(&mut lines, number, question);
            }
        }

        if self.show_footer {
            lines.push(String::new());
            lines.push("-".repeat(self.width));
            for row in &paper.summary.rows {
                lines.push(format!(
                    "{:<12} {:>3}/{:<3} questions  {:>3}/{:<3} marks",
                    row.question_type.label(),
                    row.selected_count,
                    row.target_count,
                    row.selected_marks,
                    row.target_marks
                ));
            }
            lines.push(format!(
                "Selected marks: {} / {}",
                paper.summary.selected_total, paper.summary.target_total
            ));
        }

        lines.join("\n") + "\n"
    }
}

impl PlainTextRenderer {
    fn header(&self, paper: &AssembledPaper<'_>) -> Vec<String> {
        let config = paper.config;
        let mut lines = Vec::new();

        for title in [&config.school_name, &config.exam_term] {
            if !title.trim().is_empty() {
                lines.push(center(title, self.width));
            }
        }

        lines.push(format!("Class: {}    Subject: {}", config.class, config.subject));
        let time = if config.time.trim().is_empty() {
            "-"
        } else {
            config.time.as_str()
        };
        lines.push(format!(
            "Time: {}    Full Marks: {}",
            time,
            paper.summary.target_total
        ));
        lines.push("=".repeat(self.width));
        lines
    }
}

fn push_question(lines: &mut Vec<String>, number: usize, question: &Question) {
    let prefix = format!("{number}. ");
    let indent = " ".repeat(prefix.chars().count());

    for (index, alternative) in question.alternatives.iter().enumerate() {
        if index == 0 {
            lines.push(format!("{prefix}{}  [{}]", alternative.text, question.marks));
        } else {
            lines.push(format!("{indent}OR"));
            lines.push(format!("{indent}{}", alternative.text));
        }
        push_options(lines, &indent, alternative);
    }
}

fn push_options(lines: &mut Vec<String>, indent: &str, alternative: &SingleQuestion) {
    for (index, option) in alternative.choices.as_slice().iter().enumerate() {
        lines.push(format!("{indent}  ({}) {option}", option_label(index)));
    }
}

fn section_letter(index: usize) -> char {
    char::from_u32('A' as u32 + (index % 26) as u32).unwrap_or('?')
}

fn option_label(index: usize) -> char {
    char::from_u32('a' as u32 + (index % 26) as u32).unwrap_or('?')
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}
