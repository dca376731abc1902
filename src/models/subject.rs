//! 科目目录：科目 → 班级 → 章节

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::AppResult;
use crate::models::loaders::parse_catalog;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// 单个科目的班级与章节
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubjectDetails {
    pub classes: Vec<String>,
    #[serde(default)]
    pub chapters: BTreeMap<String, Vec<String>>,
}

/// 科目目录
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SubjectCatalog {
    #[serde(default)]
    subjects: BTreeMap<String, SubjectDetails>,
}

impl SubjectCatalog {
    /// 内置目录
    pub fn builtin() -> AppResult<Self> {
        parse_catalog(BUILTIN_CATALOG, "<builtin catalog>")
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    pub fn classes_for(&self, subject: &str) -> &[String] {
        self.subjects
            .get(subject)
            .map(|details| details.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn first_class(&self, subject: &str) -> Option<&str> {
        self.classes_for(subject).first().map(String::as_str)
    }

    pub fn chapters_for(&self, subject: &str, class: &str) -> &[String] {
        self.subjects
            .get(subject)
            .and_then(|details| details.chapters.get(class))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 章节是否属于该科目和班级
    pub fn has_chapter(&self, subject: &str, class: &str, chapter: &str) -> bool {
        self.chapters_for(subject, class)
            .iter()
            .any(|c| c == chapter)
    }
}
