use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use paper_builder::models::load_catalog;
use paper_builder::utils::logging;
use paper_builder::{
    AssemblySession, Config, Difficulty, IdAllocator, OpenAiGenerator, PaperRenderer,
    PlainTextRenderer, QuestionGenerator, StaticQuestionBank, SubjectCatalog,
};

/// 用法: paper_builder ["class=10&subject=...&chapters=...&mcq.count=5"]
#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let query = std::env::args().nth(1).unwrap_or_default();
    let mut session = AssemblySession::from_query(&query, IdAllocator::from_clock())
        .with_ai_chapter_label(config.ai_chapter_label.clone());

    // 未选择章节时使用目录中该班级的全部章节
    if session.config().chapters.is_empty() {
        let catalog = match &config.catalog_file {
            Some(path) => load_catalog(Path::new(path)).await?,
            None => SubjectCatalog::builtin().context("内置科目目录解析失败")?,
        };
        let mut paper_config = session.config().clone();
        paper_config.chapters = catalog
            .chapters_for(&paper_config.subject, &paper_config.class)
            .iter()
            .cloned()
            .collect();
        warn!(
            "未选择章节，使用 {} 班 {} 的全部 {} 个章节",
            paper_config.class,
            paper_config.subject,
            paper_config.chapters.len()
        );
        session.replace_config(paper_config);
    }

    let generator = config
        .has_llm_credentials()
        .then(|| QuestionGenerator::new(Arc::new(OpenAiGenerator::new(&config))));
    logging::log_session_start(session.config(), generator.as_ref().map(|g| g.model_name()));

    // 静态题库
    let bank = match &config.bank_file {
        Some(path) => StaticQuestionBank::load(Path::new(path)).await?,
        None => StaticQuestionBank::builtin().context("内置题库解析失败")?,
    };
    info!("📚 题库共 {} 道题", bank.len());

    session.refresh_candidates(&bank).await?;
    let added = session.select_all_candidates();
    info!("✓ 从题库加入 {} 道题", added);

    // AI 出题
    if let Some(generator) = &generator {
        let difficulty = Difficulty::new(i64::from(config.default_difficulty))?;
        if let Err(e) = session.generate_with_ai(generator, difficulty).await {
            warn!("AI 出题失败 ({:?}): {}", e.kind(), e);
        }
    }

    logging::log_paper_summary(&session.summary());

    let text = PlainTextRenderer::default().render(&session.assembled_paper());
    println!("{text}");

    Ok(())
}
