//! 试卷结构配置
//!
//! 题型槽位（启用 / 数量 / 分值）与试卷元信息。

use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::models::question::Provenance;
use crate::models::question_type::QuestionType;
use crate::models::subject::SubjectCatalog;

/// 单个题型槽位
///
/// 关闭时数量与分值强制为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionTypeDetail {
    enabled: bool,
    count: u32,
    marks: u32,
}

impl QuestionTypeDetail {
    pub fn enabled(count: u32, marks: u32) -> Self {
        Self {
            enabled: true,
            count,
            marks,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn marks(&self) -> u32 {
        self.marks
    }

    /// 切换启用状态；关闭会清空数量与分值
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.count = 0;
            self.marks = 0;
        }
    }

    /// 关闭状态下忽略
    pub fn set_count(&mut self, count: u32) {
        if self.enabled {
            self.count = count;
        }
    }

    /// 关闭状态下忽略
    pub fn set_marks(&mut self, marks: u32) {
        if self.enabled {
            self.marks = marks;
        }
    }

    /// 本题型的目标总分
    pub fn target_marks(&self) -> u64 {
        if self.enabled {
            u64::from(self.count) * u64::from(self.marks)
        } else {
            0
        }
    }
}

/// 六个题型槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pattern {
    pub mcq: QuestionTypeDetail,
    pub saq: QuestionTypeDetail,
    pub long: QuestionTypeDetail,
    pub true_false: QuestionTypeDetail,
    pub fill_in_blanks: QuestionTypeDetail,
    pub essay: QuestionTypeDetail,
}

impl Pattern {
    pub fn detail(&self, question_type: QuestionType) -> &QuestionTypeDetail {
        match question_type {
            QuestionType::Mcq => &self.mcq,
            QuestionType::Saq => &self.saq,
            QuestionType::Long => &self.long,
            QuestionType::TrueFalse => &self.true_false,
            QuestionType::FillInBlanks => &self.fill_in_blanks,
            QuestionType::Essay => &self.essay,
        }
    }

    pub fn detail_mut(&mut self, question_type: QuestionType) -> &mut QuestionTypeDetail {
        match question_type {
            QuestionType::Mcq => &mut self.mcq,
            QuestionType::Saq => &mut self.saq,
            QuestionType::Long => &mut self.long,
            QuestionType::TrueFalse => &mut self.true_false,
            QuestionType::FillInBlanks => &mut self.fill_in_blanks,
            QuestionType::Essay => &mut self.essay,
        }
    }

    /// 按排版顺序遍历槽位
    pub fn iter(&self) -> impl Iterator<Item = (QuestionType, &QuestionTypeDetail)> + '_ {
        QuestionType::ALL.into_iter().map(move |t| (t, self.detail(t)))
    }
}

/// 试卷配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperConfig {
    pub school_name: String,
    pub exam_term: String,
    /// 考试时间，自由文本
    pub time: String,
    pub class: String,
    pub subject: String,
    /// 已选章节，空集表示尚未选择
    pub chapters: BTreeSet<String>,
    pub pattern: Pattern,
}

impl Default for PaperConfig {
    /// 默认配置：十年级数学，选择 15×1、简答 10×2、大题 5×5
    fn default() -> Self {
        Self {
            school_name: String::new(),
            exam_term: String::new(),
            time: String::new(),
            class: "10".to_string(),
            subject: "গণিত".to_string(),
            chapters: BTreeSet::new(),
            pattern: Pattern {
                mcq: QuestionTypeDetail::enabled(15, 1),
                saq: QuestionTypeDetail::enabled(10, 2),
                long: QuestionTypeDetail::enabled(5, 5),
                true_false: QuestionTypeDetail::disabled(),
                fill_in_blanks: QuestionTypeDetail::disabled(),
                essay: QuestionTypeDetail::disabled(),
            },
        }
    }
}

impl PaperConfig {
    /// 试卷总分
    pub fn total_marks(&self) -> u64 {
        compute_total_marks(self)
    }

    /// 启用的题型
    pub fn requested_types(&self) -> BTreeSet<QuestionType> {
        self.pattern
            .iter()
            .filter(|(_, detail)| detail.is_enabled())
            .map(|(t, _)| t)
            .collect()
    }

    pub fn set_type_enabled(&mut self, question_type: QuestionType, enabled: bool) {
        self.pattern.detail_mut(question_type).set_enabled(enabled);
    }

    /// 生成题目使用的语言
    pub fn language(&self) -> &'static str {
        language_for_subject(&self.subject)
    }

    /// 更换科目：班级重置为该科目的第一个班级，章节清空
    pub fn change_subject(
        &mut self,
        subject: &str,
        catalog: &SubjectCatalog,
    ) -> Result<(), ConfigError> {
        let first_class = catalog
            .first_class(subject)
            .ok_or_else(|| ConfigError::UnknownSubject {
                subject: subject.to_string(),
            })?;
        self.subject = subject.to_string();
        self.class = first_class.to_string();
        self.chapters.clear();
        Ok(())
    }

    /// AI 批量题目的来源信息
    ///
    /// 只选了一个章节时使用该章节，否则使用 `fallback_chapter`。
    pub fn ai_provenance(&self, fallback_chapter: &str) -> Provenance {
        let chapter = match self.chapters.len() {
            1 => self.chapters.iter().next().cloned(),
            _ => None,
        }
        .unwrap_or_else(|| fallback_chapter.to_string());

        Provenance {
            class: self.class.clone(),
            subject: self.subject.clone(),
            chapter,
        }
    }
}

/// 计算试卷总分：启用题型的 数量 × 分值 之和
pub fn compute_total_marks(config: &PaperConfig) -> u64 {
    config
        .pattern
        .iter()
        .map(|(_, detail)| detail.target_marks())
        .sum()
}

/// 科目为英语时用英语出题，其余用孟加拉语
pub fn language_for_subject(subject: &str) -> &'static str {
    if subject == "English" {
        "English"
    } else {
        "Bengali"
    }
}

/// 难度 (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> Result<Self, ConfigError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(ConfigError::DifficultyOutOfRange { value })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_mcq(count: u32, marks: u32) -> PaperConfig {
        let mut config = PaperConfig::default();
        for t in QuestionType::ALL {
            config.set_type_enabled(t, false);
        }
        config.pattern.mcq = QuestionTypeDetail::enabled(count, marks);
        config
    }

    #[test]
    fn test_total_marks_single_type() {
        let config = only_mcq(2, 1);
        assert_eq!(compute_total_marks(&config), 2);
    }

    #[test]
    fn test_default_total_marks() {
        assert_eq!(PaperConfig::default().total_marks(), 15 + 20 + 25);
    }

    #[test]
    fn test_total_marks_matches_manual_sum() {
        let mut config = PaperConfig::default();
        config.pattern.essay = QuestionTypeDetail::enabled(1, 10);
        config.pattern.true_false = QuestionTypeDetail::enabled(4, 1);

        let expected: u64 = config
            .pattern
            .iter()
            .filter(|(_, d)| d.is_enabled())
            .map(|(_, d)| u64::from(d.count()) * u64::from(d.marks()))
            .sum();
        assert_eq!(config.total_marks(), expected);
        assert_eq!(expected, 60 + 10 + 4);
    }

    #[test]
    fn test_disable_clears_count_and_marks() {
        let mut config = PaperConfig::default();
        config.set_type_enabled(QuestionType::Saq, false);

        let saq = config.pattern.detail(QuestionType::Saq);
        assert!(!saq.is_enabled());
        assert_eq!((saq.count(), saq.marks()), (0, 0));
        assert_eq!(config.total_marks(), 15 + 25);

        // 重新启用后需要重新填写
        config.set_type_enabled(QuestionType::Saq, true);
        assert_eq!(config.pattern.saq.count(), 0);
    }

    #[test]
    fn test_setters_ignored_while_disabled() {
        let mut detail = QuestionTypeDetail::disabled();
        detail.set_count(7);
        detail.set_marks(3);
        assert_eq!(detail, QuestionTypeDetail::disabled());
        assert_eq!(detail.target_marks(), 0);
    }

    #[test]
    fn test_requested_types_follow_enabled_slots() {
        let config = PaperConfig::default();
        let types: Vec<_> = config.requested_types().into_iter().collect();
        assert_eq!(
            types,
            vec![QuestionType::Mcq, QuestionType::Saq, QuestionType::Long]
        );
    }

    #[test]
    fn test_language_rule() {
        assert_eq!(language_for_subject("English"), "English");
        assert_eq!(language_for_subject("গণিত"), "Bengali");
    }

    #[test]
    fn test_ai_provenance_uses_single_chapter() {
        let mut config = PaperConfig::default();
        assert_eq!(config.ai_provenance("AI Generated").chapter, "AI Generated");

        config.chapters.insert("আলো".to_string());
        assert_eq!(config.ai_provenance("AI Generated").chapter, "আলো");

        config.chapters.insert("বিদ্যুৎ".to_string());
        assert_eq!(config.ai_provenance("AI Generated").chapter, "AI Generated");
    }

    #[test]
    fn test_difficulty_bounds() {
        assert_eq!(Difficulty::new(0).unwrap().value(), 0);
        assert_eq!(Difficulty::new(100).unwrap().value(), 100);
        assert_eq!(
            Difficulty::new(101),
            Err(ConfigError::DifficultyOutOfRange { value: 101 })
        );
        assert!(Difficulty::new(-1).is_err());
        assert_eq!(Difficulty::default().value(), 50);
    }
}
