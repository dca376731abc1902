//! AI 出题服务 - 业务能力层
//!
//! 只负责"把结构配置变成提示词，再把回复校验成题目"，不关心流程：
//! - 不重试，一次调用一次结果
//! - 回复不符合约定结构时返回校验错误，不会变成空结果
//! - 不校验题目数量和分值是否与结构一致（尽力而为）

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::engine::IdAllocator;
use crate::error::LlmError;
use crate::infrastructure::TextGenerator;
use crate::models::{
    AiQuestion, BankQuestion, Difficulty, PaperConfig, Question, QuestionType, QuestionTypeDetail,
};
use crate::utils::logging::truncate_text;

const SYSTEM_MESSAGE: &str = "You are an expert teacher specializing in creating exam papers \
and question banks for students in West Bengal, India. Questions must follow the WBBSE/WBCHSE \
syllabus. You always answer with a single JSON object and nothing else.";

const PAPER_RESPONSE_SHAPE: &str = r#"{"questions":[{"type":"MCQ","alternatives":[{"text":"...","options":["...","...","...","..."]}],"marks":1}]}"#;

const BANK_RESPONSE_SHAPE: &str = r#"{"questions":[{"type":"SAQ","alternatives":[{"text":"..."}],"marks":2,"chapter":"..."}]}"#;

/// 单个题型的数量与分值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRequest {
    pub count: u32,
    pub marks: u32,
}

impl From<&QuestionTypeDetail> for SlotRequest {
    fn from(detail: &QuestionTypeDetail) -> Self {
        Self {
            count: detail.count(),
            marks: detail.marks(),
        }
    }
}

/// 按结构出整卷的请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternGenerationRequest {
    pub class: String,
    pub subject: String,
    pub chapters: Vec<String>,
    pub difficulty: u8,
    pub language: String,
    pub mcq: SlotRequest,
    pub saq: SlotRequest,
    pub long: SlotRequest,
    pub true_false: SlotRequest,
    pub fill_in_blanks: SlotRequest,
    pub rochonadhormi: SlotRequest,
}

impl PatternGenerationRequest {
    pub fn new(config: &PaperConfig, difficulty: Difficulty, language: &str) -> Self {
        let slot = |t: QuestionType| SlotRequest::from(config.pattern.detail(t));
        Self {
            class: config.class.clone(),
            subject: config.subject.clone(),
            chapters: config.chapters.iter().cloned().collect(),
            difficulty: difficulty.value(),
            language: language.to_string(),
            mcq: slot(QuestionType::Mcq),
            saq: slot(QuestionType::Saq),
            long: slot(QuestionType::Long),
            true_false: slot(QuestionType::TrueFalse),
            fill_in_blanks: slot(QuestionType::FillInBlanks),
            rochonadhormi: slot(QuestionType::Essay),
        }
    }
}

/// 从提示词生成题库的请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankPromptRequest {
    pub class: String,
    pub subject: String,
    pub chapters: Vec<String>,
    pub question_types: Vec<QuestionType>,
    pub language: String,
}

impl BankPromptRequest {
    pub fn new(
        class: &str,
        subject: &str,
        chapters: &BTreeSet<String>,
        question_types: &BTreeSet<QuestionType>,
        language: &str,
    ) -> Self {
        Self {
            class: class.to_string(),
            subject: subject.to_string(),
            chapters: chapters.iter().cloned().collect(),
            question_types: question_types.iter().copied().collect(),
            language: language.to_string(),
        }
    }
}

/// 回复外层结构：`{ "questions": [...] }`
#[derive(Debug, Deserialize)]
struct QuestionsEnvelope<T> {
    questions: Vec<T>,
}

/// AI 出题服务
pub struct QuestionGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl QuestionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// 按结构生成整卷题目
    ///
    /// 返回的题目还没有 id / 班级 / 科目 / 章节，需要经组卷引擎的 `add_batch` 补上。
    pub async fn generate_question_set_for_pattern(
        &self,
        config: &PaperConfig,
        difficulty: Difficulty,
        language: &str,
    ) -> Result<Vec<AiQuestion>, LlmError> {
        let request = PatternGenerationRequest::new(config, difficulty, language);
        info!(
            "🤖 请求 AI 出题: 班级 {} | 科目 {} | 难度 {} | 目标总分 {}",
            request.class,
            request.subject,
            request.difficulty,
            config.total_marks()
        );

        let user_message = build_pattern_prompt(&request);
        let reply = self.generator.generate(SYSTEM_MESSAGE, &user_message).await?;

        let mut questions: Vec<AiQuestion> = parse_questions(&reply)?;
        for (index, question) in questions.iter_mut().enumerate() {
            question.settle_choices();
            question
                .validate()
                .map_err(|source| LlmError::InvalidQuestion { index, source })?;
        }

        info!("✓ AI 返回 {} 道题目", questions.len());
        Ok(questions)
    }

    /// 从提示词生成候选题库
    ///
    /// 章节为空时直接返回空列表，不调用模型。
    /// 返回的题目带有临时 ID，仍然只是候选题。
    pub async fn fetch_bank_from_prompt(
        &self,
        request: &BankPromptRequest,
        ids: &IdAllocator,
    ) -> Result<Vec<Question>, LlmError> {
        if request.chapters.is_empty() {
            debug!("未选择章节，跳过 AI 题库生成");
            return Ok(Vec::new());
        }
        if request.question_types.is_empty() {
            debug!("未启用任何题型，跳过 AI 题库生成");
            return Ok(Vec::new());
        }

        info!(
            "🤖 请求 AI 题库: 班级 {} | 科目 {} | 章节 {} 个 | 题型 {} 种",
            request.class,
            request.subject,
            request.chapters.len(),
            request.question_types.len()
        );

        let user_message = build_bank_prompt(request);
        let reply = self.generator.generate(SYSTEM_MESSAGE, &user_message).await?;

        let entries: Vec<BankQuestion> = parse_questions(&reply)?;
        let mut questions = Vec::with_capacity(entries.len());

        for (index, mut entry) in entries.into_iter().enumerate() {
            entry.settle_choices();
            entry
                .validate()
                .map_err(|source| LlmError::InvalidQuestion { index, source })?;

            if !request.chapters.contains(&entry.chapter) {
                warn!(
                    "丢弃不属于所选章节的题目 (章节: {}): {}",
                    entry.chapter,
                    truncate_text(
                        entry.alternatives.first().map(|a| a.text.as_str()).unwrap_or_default(),
                        40
                    )
                );
                continue;
            }

            questions.push(entry.into_question(ids.issue(), &request.class, &request.subject));
        }

        info!("✓ AI 题库返回 {} 道候选题", questions.len());
        Ok(questions)
    }
}

/// 构建整卷出题提示词
fn build_pattern_prompt(request: &PatternGenerationRequest) -> String {
    let request_json = serde_json::to_string_pretty(request).unwrap_or_default();
    let chapters = if request.chapters.is_empty() {
        "any chapter of the syllabus".to_string()
    } else {
        request.chapters.join(", ")
    };

    format!(
        r#"IMPORTANT: The entire question paper, including all question text and options, MUST be in the '{language}' language.

Generate an exam paper for this request:
{request_json}

Class: {class}
Subject: {subject}
Chapters: {chapters}
Difficulty Level (0-100): {difficulty}

Rules:
- For every question type (mcq, saq, long, trueFalse, fillInBlanks, rochonadhormi) generate exactly `count` questions, each worth exactly `marks` marks. Types with count 0 must not appear.
- The questions MUST match difficulty {difficulty} (0 is easiest, 100 is hardest).
- For some questions you may add an alternative "OR" question as a second item in `alternatives`.
- For MCQs provide exactly 4 distinct options.
- True/False questions are statements to be evaluated, without options.
- Fill in the Blanks questions use underscores (___) for the blank.
- Rochonadhormi questions are thoughtful, open-ended essay prompts.
- If the language is Bengali, write Bengali script in Unicode.
- The `type` field must be one of: "MCQ", "SAQ", "Long", "True/False", "Fill in the Blanks", "Rochonadhormi".

Return ONLY a JSON object of this shape:
{shape}"#,
        language = request.language,
        request_json = request_json,
        class = request.class,
        subject = request.subject,
        chapters = chapters,
        difficulty = request.difficulty,
        shape = PAPER_RESPONSE_SHAPE,
    )
}

/// 构建题库生成提示词
fn build_bank_prompt(request: &BankPromptRequest) -> String {
    let types: Vec<&str> = request.question_types.iter().map(|t| t.label()).collect();

    format!(
        r#"IMPORTANT: Every question, including all text and options, MUST be in the '{language}' language.

Build a question bank for:
Class: {class}
Subject: {subject}
Chapters: {chapters}
Question Types to Generate: {types}

Rules:
- For each question type generate a comprehensive and diverse list of high-quality questions.
- Questions MUST come from the listed chapters only; put the exact chapter name in the `chapter` field.
- For MCQs provide exactly 4 distinct options.
- True/False questions are statements to be evaluated, without options.
- Fill in the Blanks questions use underscores (___) for the blank.
- Rochonadhormi questions are thoughtful, open-ended essay prompts.
- Suggest a mark value for each question based on its type and complexity (e.g. MCQ: 1, SAQ: 2, Long: 5).

Return ONLY a JSON object of this shape:
{shape}"#,
        language = request.language,
        class = request.class,
        subject = request.subject,
        chapters = request.chapters.join(", "),
        types = types.join(", "),
        shape = BANK_RESPONSE_SHAPE,
    )
}

/// 解析回复中的 `{ "questions": [...] }`
fn parse_questions<T: DeserializeOwned>(reply: &str) -> Result<Vec<T>, LlmError> {
    let json = extract_json_object(reply).ok_or_else(|| LlmError::MissingJson {
        preview: truncate_text(reply, 80),
    })?;

    let envelope: QuestionsEnvelope<T> =
        serde_json::from_str(json).map_err(|source| LlmError::InvalidJson { source })?;

    Ok(envelope.questions)
}

/// 截取回复中第一个 `{` 到最后一个 `}`，去掉代码块围栏和多余说明
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}
