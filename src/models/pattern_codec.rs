//! 组卷参数的查询串编码
//!
//! 结构配置页 → 组卷页之间通过扁平的 key=value 查询串传递配置：
//!
//! ```text
//! schoolName=..&examTerm=..&time=..&class=10&subject=..&chapters=a,b
//! &mcq.enabled=true&mcq.count=15&mcq.marks=1&saq.enabled=...
//! ```
//!
//! 章节名逐个百分号编码后用逗号拼接（章节名中的逗号会被编码成 `%2C`）。
//! 解码时缺失或无法解析的键取默认配置中的值；负数按 0 处理。

use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::models::paper_config::{PaperConfig, Pattern, QuestionTypeDetail};
use crate::models::question_type::QuestionType;

const SCHOOL_NAME: &str = "schoolName";
const EXAM_TERM: &str = "examTerm";
const TIME: &str = "time";
const CLASS: &str = "class";
const SUBJECT: &str = "subject";
const CHAPTERS: &str = "chapters";
/// 旧版单章节参数，`all` 表示未选择
const LEGACY_CHAPTER: &str = "chapter";

/// 编码配置
pub fn encode_pattern(config: &PaperConfig) -> String {
    let mut pairs: Vec<(String, String)> = vec![
        (SCHOOL_NAME.to_string(), encode(&config.school_name)),
        (EXAM_TERM.to_string(), encode(&config.exam_term)),
        (TIME.to_string(), encode(&config.time)),
        (CLASS.to_string(), encode(&config.class)),
        (SUBJECT.to_string(), encode(&config.subject)),
        (
            CHAPTERS.to_string(),
            config
                .chapters
                .iter()
                .map(|c| encode(c))
                .collect::<Vec<_>>()
                .join(","),
        ),
    ];

    for (question_type, detail) in config.pattern.iter() {
        let slot = question_type.slot_key();
        pairs.push((format!("{slot}.enabled"), detail.is_enabled().to_string()));
        pairs.push((format!("{slot}.count"), detail.count().to_string()));
        pairs.push((format!("{slot}.marks"), detail.marks().to_string()));
    }

    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// 解码配置，缺失的键使用默认配置
pub fn decode_pattern(query: &str) -> PaperConfig {
    decode_pattern_with_defaults(query, &PaperConfig::default())
}

/// 解码配置，缺失的键使用 `defaults`
pub fn decode_pattern_with_defaults(query: &str, defaults: &PaperConfig) -> PaperConfig {
    let params = split_query(query);

    let text = |key: &str, fallback: &str| -> String {
        params
            .get(key)
            .map(|raw| decode(raw))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };

    let chapters = match (params.get(CHAPTERS), params.get(LEGACY_CHAPTER)) {
        (Some(raw), _) => decode_chapters(raw),
        (None, Some(raw)) => {
            let chapter = decode(raw);
            if chapter.is_empty() || chapter == "all" {
                BTreeSet::new()
            } else {
                BTreeSet::from([chapter])
            }
        }
        (None, None) => defaults.chapters.clone(),
    };

    let mut pattern = Pattern::default();
    for question_type in QuestionType::ALL {
        *pattern.detail_mut(question_type) =
            decode_detail(&params, question_type, defaults.pattern.detail(question_type));
    }

    PaperConfig {
        school_name: text(SCHOOL_NAME, &defaults.school_name),
        exam_term: text(EXAM_TERM, &defaults.exam_term),
        time: text(TIME, &defaults.time),
        class: text(CLASS, &defaults.class),
        subject: text(SUBJECT, &defaults.subject),
        chapters,
        pattern,
    }
}

fn decode_detail(
    params: &HashMap<String, String>,
    question_type: QuestionType,
    fallback: &QuestionTypeDetail,
) -> QuestionTypeDetail {
    let slot = question_type.slot_key();
    let key = |field: &str| format!("{slot}.{field}");

    let enabled = params
        .get(&key("enabled"))
        .and_then(|raw| parse_bool(raw))
        .unwrap_or(fallback.is_enabled());

    if !enabled {
        return QuestionTypeDetail::disabled();
    }

    let count = params
        .get(&key("count"))
        .and_then(|raw| parse_non_negative(&key("count"), raw))
        .unwrap_or(fallback.count());
    let marks = params
        .get(&key("marks"))
        .and_then(|raw| parse_non_negative(&key("marks"), raw))
        .unwrap_or(fallback.marks());

    QuestionTypeDetail::enabled(count, marks)
}

fn split_query(query: &str) -> HashMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), v.to_string())
        })
        .collect()
}

fn decode_chapters(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(decode)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match decode(raw).trim() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// 负数按 0 处理，超出 u32 的按上限处理，无法解析返回 None
fn parse_non_negative(key: &str, raw: &str) -> Option<u32> {
    let value: i64 = decode(raw).trim().parse().ok()?;
    if value < 0 {
        warn!("参数 {} 为负数 ({})，按 0 处理", key, value);
        return Some(0);
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// 兼容表单提交中用 `+` 表示的空格
fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|v| v.into_owned())
        .unwrap_or(spaced)
}
