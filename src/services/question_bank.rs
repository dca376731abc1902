//! 候选题库服务
//!
//! 根据班级、科目、章节和题型提供候选题。候选题只供挑选，不会自动进入试卷。
//!
//! 两种来源：
//! - `StaticQuestionBank` - TOML 静态题库（内置或外部文件）
//! - `PromptQuestionBank` - 由 LLM 按提示词现场生成

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use crate::engine::IdAllocator;
use crate::error::AppResult;
use crate::models::loaders::parse_question_bank;
use crate::models::{load_question_bank, PaperConfig, Question, QuestionType};
use crate::services::generation::{BankPromptRequest, QuestionGenerator};

const BUILTIN_BANK: &str = include_str!("../../data/question_bank.toml");

/// 候选题查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankQuery {
    pub class: String,
    pub subject: String,
    pub chapters: BTreeSet<String>,
    pub requested_types: BTreeSet<QuestionType>,
    pub language: String,
}

impl BankQuery {
    pub fn from_config(config: &PaperConfig) -> Self {
        Self {
            class: config.class.clone(),
            subject: config.subject.clone(),
            chapters: config.chapters.clone(),
            requested_types: config.requested_types(),
            language: config.language().to_string(),
        }
    }

    /// 没有章节或没有题型时，结果必然为空
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty() || self.requested_types.is_empty()
    }

    pub fn matches(&self, question: &Question) -> bool {
        question.class == self.class
            && question.subject == self.subject
            && self.chapters.contains(&question.chapter)
            && self.requested_types.contains(&question.question_type)
    }
}

/// 候选题来源
#[async_trait]
pub trait QuestionBankProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 按查询条件获取候选题；失败时调用方保持原有候选池
    async fn fetch_candidates(&self, query: &BankQuery) -> AppResult<Vec<Question>>;
}

/// 静态题库
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionBank {
    questions: Vec<Question>,
}

impl StaticQuestionBank {
    /// 内置示例题库
    pub fn builtin() -> AppResult<Self> {
        parse_question_bank(BUILTIN_BANK, "builtin:question_bank.toml").map(Self::from_questions)
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// 从 TOML 文件加载
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::from_questions(load_question_bank(path).await?))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 同步筛选
    pub fn filter(&self, query: &BankQuery) -> Vec<Question> {
        if query.is_empty() {
            return Vec::new();
        }
        self.questions
            .iter()
            .filter(|q| query.matches(q))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QuestionBankProvider for StaticQuestionBank {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_candidates(&self, query: &BankQuery) -> AppResult<Vec<Question>> {
        let found = self.filter(query);
        debug!("静态题库命中 {}/{} 道题", found.len(), self.questions.len());
        Ok(found)
    }
}

/// LLM 生成的题库
pub struct PromptQuestionBank {
    generator: QuestionGenerator,
    ids: IdAllocator,
}

impl PromptQuestionBank {
    /// `ids` 应与组卷引擎共享，保证临时 ID 不与试卷中的题目冲突
    pub fn new(generator: QuestionGenerator, ids: IdAllocator) -> Self {
        Self { generator, ids }
    }
}

#[async_trait]
impl QuestionBankProvider for PromptQuestionBank {
    fn name(&self) -> &str {
        "prompt"
    }

    async fn fetch_candidates(&self, query: &BankQuery) -> AppResult<Vec<Question>> {
        let request = BankPromptRequest::new(
            &query.class,
            &query.subject,
            &query.chapters,
            &query.requested_types,
            &query.language,
        );
        let questions = self.generator.fetch_bank_from_prompt(&request, &self.ids).await?;
        info!(
            "LLM 题库 ({}) 生成 {} 道候选题",
            self.generator.model_name(),
            questions.len()
        );
        Ok(questions)
    }
}
