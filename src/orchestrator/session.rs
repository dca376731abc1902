//! 组卷会话 - 编排层
//!
//! 一个会话对应"一张正在组装的试卷"，是已选题目的唯一持有者：
//!
//! ```text
//! 编辑结构 (PaperConfig) ──→ 刷新候选题 (QuestionBankProvider)
//!                          ──→ 挑选 / 移除 / 清空 (PaperAssembly)
//!                          ──→ AI 按结构出题 (QuestionGenerator → add_batch)
//!                          ──→ 输出试卷 (AssembledPaper)
//! ```
//!
//! 外部调用分为 `begin_*` / `complete_*` 两步：发出时领取令牌，结果回来时
//! 只接受最新令牌的结果，过期结果直接丢弃。失败不修改任何状态。

use tracing::{debug, info, warn};

use crate::engine::{IdAllocator, MarksSummary, PaperAssembly};
use crate::error::{AppResult, LlmError};
use crate::models::{
    decode_pattern, encode_pattern, AiQuestion, Difficulty, PaperConfig, Question, QuestionId,
    AI_GENERATED_CHAPTER,
};
use crate::orchestrator::request_tracker::{RequestSlot, RequestTicket, RequestTracker};
use crate::render::AssembledPaper;
use crate::services::{BankQuery, QuestionBankProvider, QuestionGenerator};

/// 外部请求的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 结果已生效
    Applied { count: usize },
    /// 已有更新的请求，结果被丢弃
    Stale,
}

/// 组卷会话
#[derive(Debug)]
pub struct AssemblySession {
    config: PaperConfig,
    assembly: PaperAssembly,
    candidates: Vec<Question>,
    ids: IdAllocator,
    requests: RequestTracker,
    ai_chapter_label: String,
}

impl AssemblySession {
    pub fn new(config: PaperConfig, ids: IdAllocator) -> Self {
        Self {
            config,
            assembly: PaperAssembly::new(ids.clone()),
            candidates: Vec::new(),
            ids,
            requests: RequestTracker::new(),
            ai_chapter_label: AI_GENERATED_CHAPTER.to_string(),
        }
    }

    /// 从结构查询串创建会话，缺失的字段使用默认配置
    pub fn from_query(query: &str, ids: IdAllocator) -> Self {
        Self::new(decode_pattern(query), ids)
    }

    pub fn with_ai_chapter_label(mut self, label: impl Into<String>) -> Self {
        self.ai_chapter_label = label.into();
        self
    }

    pub fn config(&self) -> &PaperConfig {
        &self.config
    }

    /// 已选题目（已排序）
    pub fn selected(&self) -> &[Question] {
        self.assembly.questions()
    }

    pub fn candidates(&self) -> &[Question] {
        &self.candidates
    }

    /// 会话共享的 ID 分配器，LLM 题库应使用同一个
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    // ========== 结构编辑 ==========

    /// 返回编辑结构时使用的查询串
    pub fn edit_pattern_query(&self) -> String {
        encode_pattern(&self.config)
    }

    /// 应用编辑后的结构查询串
    pub fn apply_edited_pattern(&mut self, query: &str) {
        self.replace_config(decode_pattern(query));
    }

    /// 替换结构：清空已选题目和候选池，作废所有在途请求
    pub fn replace_config(&mut self, config: PaperConfig) {
        info!(
            "📝 试卷结构已更新: 班级 {} | 科目 {} | 总分 {}",
            config.class,
            config.subject,
            config.total_marks()
        );
        self.config = config;
        self.assembly.reset();
        self.candidates.clear();
        self.requests.invalidate_all();
    }

    // ========== 候选题库 ==========

    pub fn bank_query(&self) -> BankQuery {
        BankQuery::from_config(&self.config)
    }

    /// 发出候选题请求
    pub fn begin_bank_fetch(&mut self) -> (RequestTicket, BankQuery) {
        (self.requests.issue(RequestSlot::Bank), self.bank_query())
    }

    /// 处理候选题请求的结果：成功时整体替换候选池
    ///
    /// 不属于所选章节的题目会被丢弃。
    pub fn complete_bank_fetch(
        &mut self,
        ticket: RequestTicket,
        result: AppResult<Vec<Question>>,
    ) -> AppResult<Completion> {
        if !self.requests.is_current(&ticket) {
            debug!("丢弃过期的候选题结果 (令牌 {})", ticket.token());
            return Ok(Completion::Stale);
        }

        match result {
            Ok(mut questions) => {
                let chapters = &self.config.chapters;
                questions.retain(|q| {
                    let keep = chapters.contains(&q.chapter);
                    if !keep {
                        warn!("丢弃不属于所选章节的候选题 #{} (章节: {})", q.id, q.chapter);
                    }
                    keep
                });
                let count = questions.len();
                self.candidates = questions;
                info!("📚 候选题已刷新: {} 道", count);
                Ok(Completion::Applied { count })
            }
            Err(e) => {
                warn!("候选题获取失败，保留原候选池: {}", e);
                Err(e)
            }
        }
    }

    /// 从指定来源刷新候选题
    pub async fn refresh_candidates<P>(&mut self, provider: &P) -> AppResult<Completion>
    where
        P: QuestionBankProvider + ?Sized,
    {
        let (ticket, query) = self.begin_bank_fetch();
        debug!("从 {} 题库获取候选题", provider.name());
        let result = provider.fetch_candidates(&query).await;
        self.complete_bank_fetch(ticket, result)
    }

    /// 按题干搜索候选池（不区分大小写），空搜索词返回全部
    pub fn search_candidates(&self, term: &str) -> Vec<&Question> {
        self.candidates
            .iter()
            .filter(|q| q.contains_text(term))
            .collect()
    }

    /// 把候选池中的题目加入试卷，返回试卷是否因此多了一道题
    pub fn select_candidate(&mut self, id: QuestionId) -> bool {
        match self.candidates.iter().find(|q| q.id == id) {
            Some(question) => {
                let question = question.clone();
                let before = self.assembly.len();
                self.assembly.add(question);
                self.assembly.len() > before
            }
            None => {
                debug!("候选池中没有题目 #{}", id);
                false
            }
        }
    }

    /// 把当前候选池全部加入试卷
    pub fn select_all_candidates(&mut self) -> usize {
        let before = self.assembly.len();
        for question in self.candidates.clone() {
            self.assembly.add(question);
        }
        self.assembly.len() - before
    }

    // ========== AI 出题 ==========

    pub fn begin_generation(&mut self) -> RequestTicket {
        self.requests.issue(RequestSlot::Generation)
    }

    /// 处理 AI 出题结果：成功时整批加入试卷，失败时试卷不变
    pub fn complete_generation(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<AiQuestion>, LlmError>,
    ) -> AppResult<Completion> {
        if !self.requests.is_current(&ticket) {
            debug!("丢弃过期的 AI 出题结果 (令牌 {})", ticket.token());
            return Ok(Completion::Stale);
        }

        let batch = result.inspect_err(|e| warn!("AI 出题失败，试卷保持不变: {}", e))?;
        let provenance = self.config.ai_provenance(&self.ai_chapter_label);
        let assigned = self.assembly.add_batch(batch, &provenance);

        info!(
            "✓ 加入 {} 道 AI 题目，当前总分 {}/{}",
            assigned.len(),
            self.assembly.selected_marks(),
            self.config.total_marks()
        );
        Ok(Completion::Applied {
            count: assigned.len(),
        })
    }

    /// 让 AI 按当前结构出题并加入试卷
    pub async fn generate_with_ai(
        &mut self,
        generator: &QuestionGenerator,
        difficulty: Difficulty,
    ) -> AppResult<Completion> {
        let ticket = self.begin_generation();
        let config = self.config.clone();
        let result = generator
            .generate_question_set_for_pattern(&config, difficulty, config.language())
            .await;
        self.complete_generation(ticket, result)
    }

    // ========== 手动编辑 ==========

    pub fn add(&mut self, question: Question) -> &[Question] {
        self.assembly.add(question)
    }

    pub fn remove(&mut self, id: QuestionId) -> bool {
        self.assembly.remove(id)
    }

    /// 清空试卷，结构和候选池保留
    pub fn reset(&mut self) {
        self.assembly.reset();
    }

    pub fn selected_marks(&self) -> u64 {
        self.assembly.selected_marks()
    }

    pub fn summary(&self) -> MarksSummary {
        self.assembly.summary(&self.config)
    }

    /// 用于输出的试卷视图
    pub fn assembled_paper(&self) -> AssembledPaper<'_> {
        AssembledPaper::new(&self.config, self.assembly.questions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, FailureKind};
    use crate::infrastructure::TextGenerator;
    use crate::models::{QuestionType, SingleQuestion};
    use crate::services::{PromptQuestionBank, StaticQuestionBank};
    use async_trait::async_trait;
    use std::num::NonZeroU32;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedGenerator {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(LlmError::EmptyContent {
                model: "fixed".to_string(),
            })
        }
    }

    fn ai(question_type: QuestionType, marks: u32, text: &str) -> AiQuestion {
        AiQuestion {
            question_type,
            alternatives: vec![SingleQuestion::plain(text)],
            marks: NonZeroU32::new(marks).unwrap(),
        }
    }

    fn science_session() -> AssemblySession {
        AssemblySession::from_query(
            "class=10&subject=%E0%A6%AC%E0%A6%BF%E0%A6%9C%E0%A7%8D%E0%A6%9E%E0%A6%BE%E0%A6%A8&chapters=%E0%A6%86%E0%A6%B2%E0%A7%8B",
            IdAllocator::starting_at(10_000),
        )
    }

    #[test]
    fn test_from_query_decodes_pattern() {
        let session = science_session();
        assert_eq!(session.config().subject, "বিজ্ঞান");
        assert!(session.config().chapters.contains("আলো"));
        assert!(session.selected().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_and_select_candidates() {
        let mut session = science_session();
        let bank = StaticQuestionBank::builtin().unwrap();

        let completion = session.refresh_candidates(&bank).await.unwrap();
        assert!(matches!(completion, Completion::Applied { count } if count > 0));
        assert!(session.selected().is_empty());

        let id = session.candidates()[0].id;
        assert!(session.select_candidate(id));
        assert!(!session.select_candidate(987_654));
        assert_eq!(session.selected().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chapters_empties_pool_without_calling_llm() {
        let generator = FixedGenerator::new(None);
        let mut session = AssemblySession::new(PaperConfig::default(), IdAllocator::starting_at(1));
        let bank = PromptQuestionBank::new(
            QuestionGenerator::new(generator.clone()),
            session.ids().clone(),
        );

        // 先放入一些旧候选题
        let ticket = session.begin_bank_fetch().0;
        let old = StaticQuestionBank::builtin().unwrap().filter(&BankQuery {
            chapters: ["আলো".to_string()].into(),
            subject: "বিজ্ঞান".to_string(),
            ..session.bank_query()
        });
        assert!(!old.is_empty());
        session.complete_bank_fetch(ticket, Ok(old)).unwrap();
        assert!(!session.candidates().is_empty());

        let completion = session.refresh_candidates(&bank).await.unwrap();
        assert_eq!(completion, Completion::Applied { count: 0 });
        assert!(session.candidates().is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_select_candidate_reports_no_growth_for_selected_id() {
        let mut session = science_session();
        let ticket = session.begin_bank_fetch().0;
        let found = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        session.complete_bank_fetch(ticket, Ok(found)).unwrap();

        let id = session.candidates()[0].id;
        assert!(session.select_candidate(id));
        assert!(!session.select_candidate(id));
        assert_eq!(session.selected().len(), 1);
    }

    #[test]
    fn test_off_chapter_candidates_are_dropped() {
        let mut session = science_session();
        let ticket = session.begin_bank_fetch().0;
        let mut found = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        let in_chapter = found.len();
        let mut stray = found[0].clone();
        stray.id = 555;
        stray.chapter = "বিদ্যুৎ".to_string();
        found.push(stray);

        let completion = session.complete_bank_fetch(ticket, Ok(found)).unwrap();
        assert_eq!(completion, Completion::Applied { count: in_chapter });
        assert!(session.candidates().iter().all(|q| q.chapter == "আলো"));
    }

    #[test]
    fn test_search_candidates_by_text() {
        let mut session = science_session();
        let ticket = session.begin_bank_fetch().0;
        let found = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        session.complete_bank_fetch(ticket, Ok(found)).unwrap();

        let hits = session.search_candidates("বিচ্ছুরণ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 5);
        assert_eq!(session.search_candidates("  ").len(), session.candidates().len());
        assert!(session.search_candidates("no such text").is_empty());
    }

    #[test]
    fn test_stale_bank_result_is_discarded() {
        let mut session = science_session();
        let (first, _) = session.begin_bank_fetch();
        let (second, _) = session.begin_bank_fetch();

        let late = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        assert_eq!(
            session.complete_bank_fetch(first, Ok(late)).unwrap(),
            Completion::Stale
        );
        assert!(session.candidates().is_empty());

        assert_eq!(
            session.complete_bank_fetch(second, Ok(Vec::new())).unwrap(),
            Completion::Applied { count: 0 }
        );
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut session = science_session();
        let first = session.begin_generation();
        let second = session.begin_generation();

        let stale = session
            .complete_generation(first, Ok(vec![ai(QuestionType::Mcq, 1, "old")]))
            .unwrap();
        assert_eq!(stale, Completion::Stale);
        assert!(session.selected().is_empty());

        let applied = session
            .complete_generation(second, Ok(vec![ai(QuestionType::Mcq, 1, "new")]))
            .unwrap();
        assert_eq!(applied, Completion::Applied { count: 1 });
        assert_eq!(session.selected()[0].headline(), "new");
    }

    #[test]
    fn test_generation_uses_single_chapter_as_provenance() {
        let mut session = science_session();
        let ticket = session.begin_generation();
        session
            .complete_generation(ticket, Ok(vec![ai(QuestionType::Saq, 2, "q")]))
            .unwrap();
        assert_eq!(session.selected()[0].chapter, "আলো");
    }

    #[test]
    fn test_generation_uses_label_for_multiple_chapters() {
        let mut config = PaperConfig::default();
        config.chapters = ["A".to_string(), "B".to_string()].into();
        let mut session = AssemblySession::new(config, IdAllocator::starting_at(1))
            .with_ai_chapter_label("মিশ্র");

        let ticket = session.begin_generation();
        session
            .complete_generation(ticket, Ok(vec![ai(QuestionType::Long, 5, "q")]))
            .unwrap();
        assert_eq!(session.selected()[0].chapter, "মিশ্র");
    }

    #[tokio::test]
    async fn test_failed_generation_leaves_paper_intact() {
        let mut session = science_session();
        let ticket = session.begin_generation();
        session
            .complete_generation(ticket, Ok(vec![ai(QuestionType::Mcq, 1, "kept")]))
            .unwrap();
        let before = session.selected().to_vec();

        let generator = QuestionGenerator::new(FixedGenerator::new(Some("not json")));
        let err = session
            .generate_with_ai(&generator, Difficulty::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(LlmError::MissingJson { .. })));
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(session.selected(), before.as_slice());
    }

    #[tokio::test]
    async fn test_generate_with_ai_adds_batch() {
        let reply = r#"{"questions":[
            {"type":"Long","alternatives":[{"text":"L"},{"text":"L-OR"}],"marks":5},
            {"type":"MCQ","alternatives":[{"text":"M","options":["1","2","3","4"]}],"marks":1}
        ]}"#;
        let generator = QuestionGenerator::new(FixedGenerator::new(Some(reply)));
        let mut session = science_session();

        let completion = session
            .generate_with_ai(&generator, Difficulty::new(70).unwrap())
            .await
            .unwrap();

        assert_eq!(completion, Completion::Applied { count: 2 });
        let types: Vec<_> = session.selected().iter().map(|q| q.question_type).collect();
        assert_eq!(types, vec![QuestionType::Mcq, QuestionType::Long]);
        assert!(session.selected()[1].is_either_or());
        assert_eq!(session.selected_marks(), 6);
    }

    #[test]
    fn test_editing_pattern_resets_and_invalidates() {
        let mut session = science_session();
        let pending = session.begin_generation();
        session.add(Question {
            id: 1,
            class: "10".to_string(),
            subject: "বিজ্ঞান".to_string(),
            chapter: "আলো".to_string(),
            question_type: QuestionType::Saq,
            alternatives: vec![SingleQuestion::plain("?")],
            marks: NonZeroU32::new(2).unwrap(),
        });

        let query = session.edit_pattern_query();
        session.apply_edited_pattern(&query);

        assert!(session.selected().is_empty());
        assert!(session.candidates().is_empty());
        assert_eq!(session.config().subject, "বিজ্ঞান");
        assert_eq!(
            session
                .complete_generation(pending, Ok(vec![ai(QuestionType::Mcq, 1, "late")]))
                .unwrap(),
            Completion::Stale
        );
    }

    #[test]
    fn test_reset_keeps_candidates() {
        let mut session = science_session();
        let ticket = session.begin_bank_fetch().0;
        let found = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        session.complete_bank_fetch(ticket, Ok(found)).unwrap();
        let added = session.select_all_candidates();
        assert!(added > 0);

        session.reset();
        assert!(session.selected().is_empty());
        assert_eq!(session.selected_marks(), 0);
        assert!(!session.candidates().is_empty());
    }

    #[test]
    fn test_failed_bank_fetch_keeps_pool() {
        let mut session = science_session();
        let ticket = session.begin_bank_fetch().0;
        let found = StaticQuestionBank::builtin().unwrap().filter(&session.bank_query());
        let count = found.len();
        session.complete_bank_fetch(ticket, Ok(found)).unwrap();

        let ticket = session.begin_bank_fetch().0;
        let err = session
            .complete_bank_fetch(
                ticket,
                Err(AppError::Llm(LlmError::EmptyContent {
                    model: "m".to_string(),
                })),
            )
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(session.candidates().len(), count);
    }
}
