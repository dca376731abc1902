//! 题型
//!
//! 六个题型槽位与规范题型标签之间的显式映射表。
//! 线上标签（LLM 输出 / 题库文件）与槽位键（组卷参数）都通过这里转换，
//! 其余代码只面对 `QuestionType`。

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::SchemaError;

/// 题型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum QuestionType {
    /// 选择题
    Mcq,
    /// 简答题
    Saq,
    /// 大题
    Long,
    /// 判断题
    TrueFalse,
    /// 填空题
    FillInBlanks,
    /// 作文题（Rochonadhormi）
    Essay,
}

/// 线上标签 → 题型，包含常见的别名写法
static LABELS: phf::Map<&'static str, QuestionType> = phf_map! {
    "MCQ" => QuestionType::Mcq,
    "SAQ" => QuestionType::Saq,
    "Long" => QuestionType::Long,
    "True/False" => QuestionType::TrueFalse,
    "Fill in the Blanks" => QuestionType::FillInBlanks,
    "Rochonadhormi" => QuestionType::Essay,
    "TrueFalse" => QuestionType::TrueFalse,
    "FillInBlanks" => QuestionType::FillInBlanks,
    "Essay" => QuestionType::Essay,
};

/// 槽位键 → 题型
static SLOT_KEYS: phf::Map<&'static str, QuestionType> = phf_map! {
    "mcq" => QuestionType::Mcq,
    "saq" => QuestionType::Saq,
    "long" => QuestionType::Long,
    "trueFalse" => QuestionType::TrueFalse,
    "fillInBlanks" => QuestionType::FillInBlanks,
    "rochonadhormi" => QuestionType::Essay,
};

impl QuestionType {
    /// 按排版顺序排列的全部题型
    pub const ALL: [QuestionType; 6] = [
        QuestionType::Mcq,
        QuestionType::Saq,
        QuestionType::TrueFalse,
        QuestionType::FillInBlanks,
        QuestionType::Long,
        QuestionType::Essay,
    ];

    /// 排版顺序：选择 < 简答 < 判断 < 填空 < 大题 < 作文
    pub fn rank(self) -> u8 {
        match self {
            QuestionType::Mcq => 0,
            QuestionType::Saq => 1,
            QuestionType::TrueFalse => 2,
            QuestionType::FillInBlanks => 3,
            QuestionType::Long => 4,
            QuestionType::Essay => 5,
        }
    }

    /// 线上标签
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Saq => "SAQ",
            QuestionType::Long => "Long",
            QuestionType::TrueFalse => "True/False",
            QuestionType::FillInBlanks => "Fill in the Blanks",
            QuestionType::Essay => "Rochonadhormi",
        }
    }

    /// 组卷参数中的槽位键
    pub fn slot_key(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Saq => "saq",
            QuestionType::Long => "long",
            QuestionType::TrueFalse => "trueFalse",
            QuestionType::FillInBlanks => "fillInBlanks",
            QuestionType::Essay => "rochonadhormi",
        }
    }

    /// 试卷中的分组标题
    pub fn heading(self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple Choice Questions",
            QuestionType::Saq => "Short Answer Questions",
            QuestionType::Long => "Long Answer Questions",
            QuestionType::TrueFalse => "True or False",
            QuestionType::FillInBlanks => "Fill in the Blanks",
            QuestionType::Essay => "Essay",
        }
    }

    /// 选择题要求恰好 4 个选项
    pub fn expects_options(self) -> bool {
        matches!(self, QuestionType::Mcq)
    }

    /// 从线上标签解析
    pub fn from_label(label: &str) -> Option<Self> {
        LABELS.get(label.trim()).copied()
    }

    /// 从槽位键解析
    pub fn from_slot_key(key: &str) -> Option<Self> {
        SLOT_KEYS.get(key).copied()
    }
}

impl Ord for QuestionType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for QuestionType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<QuestionType> for &'static str {
    fn from(question_type: QuestionType) -> Self {
        question_type.label()
    }
}

impl TryFrom<String> for QuestionType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or(SchemaError::UnknownQuestionType(value))
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_rank_order_matches_all() {
        let ranks: Vec<u8> = QuestionType::ALL.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ordering_follows_rank_not_declaration() {
        // Long 在声明中排第三，但排版时在判断、填空之后
        assert!(QuestionType::TrueFalse < QuestionType::Long);
        assert!(QuestionType::FillInBlanks < QuestionType::Long);

        let set: BTreeSet<_> = [QuestionType::Essay, QuestionType::Long, QuestionType::Mcq]
            .into_iter()
            .collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![QuestionType::Mcq, QuestionType::Long, QuestionType::Essay]
        );
    }

    #[test]
    fn test_label_and_slot_tables_cover_every_type() {
        for t in QuestionType::ALL {
            assert_eq!(QuestionType::from_label(t.label()), Some(t));
            assert_eq!(QuestionType::from_slot_key(t.slot_key()), Some(t));
        }
        assert_eq!(QuestionType::from_label("Essay"), Some(QuestionType::Essay));
        assert_eq!(QuestionType::from_label("Quiz"), None);
        assert_eq!(QuestionType::from_slot_key("essay"), None);
    }

    #[test]
    fn test_serde_uses_wire_labels() {
        let json = serde_json::to_string(&QuestionType::FillInBlanks).unwrap();
        assert_eq!(json, "\"Fill in the Blanks\"");

        let parsed: QuestionType = serde_json::from_str("\"True/False\"").unwrap();
        assert_eq!(parsed, QuestionType::TrueFalse);

        let err = serde_json::from_str::<QuestionType>("\"Matching\"").unwrap_err();
        assert!(err.to_string().contains("Matching"));
    }
}
