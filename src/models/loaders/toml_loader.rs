use crate::error::{AppError, AppResult};
use crate::models::question::Question;
use crate::models::subject::SubjectCatalog;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// 题库文件结构，题目逐条解析
#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    questions: Vec<toml::Value>,
}

/// 解析题库 TOML 内容
///
/// 文件本身不是合法 TOML 时返回错误；单条题目字段不合规、内容不合规或 ID 重复时
/// 跳过该题并记录警告。
pub fn parse_question_bank(content: &str, origin: &str) -> AppResult<Vec<Question>> {
    let file: BankFile =
        toml::from_str(content).map_err(|e| AppError::toml_parse_failed(origin, e))?;

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(file.questions.len());

    for (index, entry) in file.questions.into_iter().enumerate() {
        let id = entry.get("id").and_then(toml::Value::as_integer);
        let mut question: Question = match entry.try_into() {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!(
                    "跳过第 {} 条题目 (id: {:?}, {}): {}",
                    index + 1,
                    id,
                    origin,
                    e.message()
                );
                continue;
            }
        };

        question.settle_choices();
        if let Err(e) = question.validate() {
            tracing::warn!("跳过题目 #{} ({}): {}", question.id, origin, e);
            continue;
        }
        if !seen.insert(question.id) {
            tracing::warn!("跳过重复的题目 ID #{} ({})", question.id, origin);
            continue;
        }
        questions.push(question);
    }

    Ok(questions)
}

/// 解析科目目录 TOML 内容
pub fn parse_catalog(content: &str, origin: &str) -> AppResult<SubjectCatalog> {
    toml::from_str(content).map_err(|e| AppError::toml_parse_failed(origin, e))
}

/// 从 TOML 文件加载题库
pub async fn load_question_bank(path: &Path) -> Result<Vec<Question>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取题库文件: {}", path.display()))?;

    let questions = parse_question_bank(&content, &path.to_string_lossy())
        .with_context(|| format!("无法解析题库文件: {}", path.display()))?;

    tracing::info!(
        "成功加载 {} 道题目: {}",
        questions.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(questions)
}

/// 从 TOML 文件加载科目目录
pub async fn load_catalog(path: &Path) -> Result<SubjectCatalog> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取科目目录: {}", path.display()))?;

    let catalog = parse_catalog(&content, &path.to_string_lossy())
        .with_context(|| format!("无法解析科目目录: {}", path.display()))?;

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"
[[questions]]
id = 10
class = "10"
subject = "English"
chapter = "Grammar"
type = "Fill in the Blanks"
marks = 1

[[questions.alternatives]]
text = "She ___ to school every day."

[[questions]]
id = 10
class = "10"
subject = "English"
chapter = "Grammar"
type = "SAQ"
marks = 2

[[questions.alternatives]]
text = "Duplicate id."

[[questions]]
id = 11
class = "10"
subject = "English"
chapter = "Grammar"
type = "Long"
marks = 5
alternatives = []
"#;

    #[test]
    fn test_parse_question_bank_skips_invalid_and_duplicates() {
        let questions = parse_question_bank(BANK, "inline").unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 10);
        assert_eq!(questions[0].headline(), "She ___ to school every day.");
    }

    const MIXED_BANK: &str = r#"
[[questions]]
id = 20
class = "10"
subject = "বিজ্ঞান"
chapter = "আলো"
type = "SAQ"
marks = 2

[[questions.alternatives]]
text = "আলোর প্রতিসরণ কাকে বলে?"

[[questions]]
id = 21
class = "10"
subject = "বিজ্ঞান"
chapter = "আলো"
type = "SAQ"
marks = 0

[[questions.alternatives]]
text = "Zero marks."

[[questions]]
id = 22
class = "10"
subject = "বিজ্ঞান"
chapter = "আলো"
type = "Essay??"
marks = 5

[[questions.alternatives]]
text = "Unknown type."

[[questions]]
id = 23
class = "10"
subject = "বিজ্ঞান"
chapter = "আলো"
type = "True/False"
marks = 1

[[questions.alternatives]]
text = "সমতল দর্পণে প্রতিবিম্ব সর্বদা অসদ্।"
options = ["True", "False"]
"#;

    #[test]
    fn test_bad_entries_do_not_sink_the_file() {
        let questions = parse_question_bank(MIXED_BANK, "mixed.toml").unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id).collect();

        assert_eq!(ids, vec![20, 23]);
        assert!(!questions[1].alternatives[0].choices.is_present());
    }

    #[test]
    fn test_parse_question_bank_reports_origin() {
        let err = parse_question_bank("questions = 3", "bank.toml").unwrap_err();
        assert!(err.to_string().contains("bank.toml"));
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = load_question_bank(Path::new("does/not/exist.toml")).await;
        assert!(result.is_err());
    }
}
