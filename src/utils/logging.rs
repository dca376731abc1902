/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::engine::MarksSummary;
use crate::models::PaperConfig;

/// 初始化日志
///
/// 优先读取 `RUST_LOG`；未设置时按 `verbose` 选择默认级别。重复调用不会报错。
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,paper_builder=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录会话启动信息
///
/// # 参数
/// - `config`: 试卷配置
/// - `model_name`: LLM 模型名称，未配置密钥时为 `None`
pub fn log_session_start(config: &PaperConfig, model_name: Option<&str>) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 组卷会话启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "📋 班级 {} | 科目 {} | 章节 {} 个 | 目标总分 {}",
        config.class,
        config.subject,
        config.chapters.len(),
        config.total_marks()
    );
    match model_name {
        Some(model) => info!("🤖 AI 出题模型: {}", model),
        None => info!("🤖 未配置 LLM_API_KEY，跳过 AI 出题"),
    }
    info!("{}", "=".repeat(60));
}

/// 打印各题型分值统计
///
/// # 参数
/// - `summary`: 目标与已选分值对比
pub fn log_paper_summary(summary: &MarksSummary) {
    info!("\n{}", "─".repeat(60));
    info!("📊 试卷分值统计");
    for row in &summary.rows {
        let mark = if row.is_satisfied() { "✅" } else { "⚠️" };
        info!(
            "{} {:<20} 题数 {}/{} | 分值 {}/{}",
            mark,
            row.question_type.label(),
            row.selected_count,
            row.target_count,
            row.selected_marks,
            row.target_marks
        );
    }
    info!(
        "合计: {}/{} (剩余 {})",
        summary.selected_total,
        summary.target_total,
        summary.remaining()
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("আলোর প্রতিসরণ", 4), "আলোর...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
