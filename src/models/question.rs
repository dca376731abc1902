use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::warn;

use crate::error::SchemaError;
use crate::models::question_type::QuestionType;

/// 题目 ID
pub type QuestionId = u64;

/// AI 批量题目跨多个章节时的章节标签
pub const AI_GENERATED_CHAPTER: &str = "AI Generated";

/// 题目的选项
///
/// 非选择题没有选项；选择题通常是 4 个选项，数量不做强制。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choices {
    Absent,
    Four([String; 4]),
    /// 数量不是 4 的选项列表
    Listed(Vec<String>),
}

impl Choices {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Choices::Absent => &[],
            Choices::Four(options) => options,
            Choices::Listed(options) => options,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Choices::Absent)
    }
}

/// 单个题目表述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SingleQuestionFields", into = "SingleQuestionFields")]
pub struct SingleQuestion {
    pub text: String,
    pub choices: Choices,
}

/// 线上格式：`{ text, options? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SingleQuestionFields {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

impl From<SingleQuestionFields> for SingleQuestion {
    fn from(fields: SingleQuestionFields) -> Self {
        let choices = match fields.options {
            // LLM 经常给非选择题输出空数组，按无选项处理
            None => Choices::Absent,
            Some(options) if options.is_empty() => Choices::Absent,
            Some(options) => match <[String; 4]>::try_from(options) {
                Ok(four) => Choices::Four(four),
                Err(options) => Choices::Listed(options),
            },
        };
        Self {
            text: fields.text,
            choices,
        }
    }
}

impl From<SingleQuestion> for SingleQuestionFields {
    fn from(question: SingleQuestion) -> Self {
        let options = match question.choices {
            Choices::Absent => None,
            Choices::Four(options) => Some(options.to_vec()),
            Choices::Listed(options) => Some(options),
        };
        Self {
            text: question.text,
            options,
        }
    }
}

impl SingleQuestion {
    /// 无选项的题目表述
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Choices::Absent,
        }
    }

    /// 带 4 个选项的题目表述
    pub fn with_options(text: impl Into<String>, options: [String; 4]) -> Self {
        Self {
            text: text.into(),
            choices: Choices::Four(options),
        }
    }
}

/// 题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub class: String,
    pub subject: String,
    pub chapter: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 长度大于 1 时为"或"选做题
    pub alternatives: Vec<SingleQuestion>,
    pub marks: NonZeroU32,
}

impl Question {
    /// 检查题目内容
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_alternatives(&self.alternatives)
    }

    /// 按题型整理选项，返回丢弃选项的表述数
    pub fn settle_choices(&mut self) -> usize {
        settle_choices(self.question_type, &mut self.alternatives)
    }

    /// 是否为"或"选做题
    pub fn is_either_or(&self) -> bool {
        self.alternatives.len() > 1
    }

    /// 任一表述的题干包含 `term`（不区分大小写）
    pub fn contains_text(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        self.alternatives
            .iter()
            .any(|alt| alt.text.to_lowercase().contains(&needle))
    }

    /// 第一个表述的题干，用于日志
    pub fn headline(&self) -> &str {
        self.alternatives
            .first()
            .map(|alt| alt.text.as_str())
            .unwrap_or_default()
    }
}

/// 题目来源信息：AI 题目进入试卷前补上的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub class: String,
    pub subject: String,
    pub chapter: String,
}

/// AI 生成的题目：没有 id / class / subject / chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub alternatives: Vec<SingleQuestion>,
    pub marks: NonZeroU32,
}

impl AiQuestion {
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_alternatives(&self.alternatives)
    }

    pub fn settle_choices(&mut self) -> usize {
        settle_choices(self.question_type, &mut self.alternatives)
    }

    /// 补上身份与来源信息，变成完整题目
    pub fn lift(self, id: QuestionId, provenance: &Provenance) -> Question {
        Question {
            id,
            class: provenance.class.clone(),
            subject: provenance.subject.clone(),
            chapter: provenance.chapter.clone(),
            question_type: self.question_type,
            alternatives: self.alternatives,
            marks: self.marks,
        }
    }
}

/// LLM 题库响应中的题目：带章节，没有 id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub alternatives: Vec<SingleQuestion>,
    pub marks: NonZeroU32,
    pub chapter: String,
}

impl BankQuestion {
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_alternatives(&self.alternatives)
    }

    pub fn settle_choices(&mut self) -> usize {
        settle_choices(self.question_type, &mut self.alternatives)
    }

    pub fn into_question(self, id: QuestionId, class: &str, subject: &str) -> Question {
        Question {
            id,
            class: class.to_string(),
            subject: subject.to_string(),
            chapter: self.chapter,
            question_type: self.question_type,
            alternatives: self.alternatives,
            marks: self.marks,
        }
    }
}

/// 不带选项的题型（判断、填空等）上数量不是 4 的选项列表直接丢弃；
/// 选择题保留原样。
fn settle_choices(question_type: QuestionType, alternatives: &mut [SingleQuestion]) -> usize {
    if question_type.expects_options() {
        return 0;
    }

    let mut dropped = 0;
    for alternative in alternatives.iter_mut() {
        if let Choices::Listed(options) = &alternative.choices {
            warn!(
                "{} 题不需要选项，丢弃 {} 个选项: {}",
                question_type,
                options.len(),
                alternative.text
            );
            alternative.choices = Choices::Absent;
            dropped += 1;
        }
    }
    dropped
}

fn validate_alternatives(alternatives: &[SingleQuestion]) -> Result<(), SchemaError> {
    if alternatives.is_empty() {
        return Err(SchemaError::EmptyAlternatives);
    }
    if alternatives.iter().any(|alt| alt.text.trim().is_empty()) {
        return Err(SchemaError::BlankText);
    }
    Ok(())
}
