use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次 LLM 请求的超时秒数，0 表示不限制
    pub llm_timeout_secs: u64,
    // --- 题库配置 ---
    /// 静态题库 TOML 文件，未设置时使用内置题库
    pub bank_file: Option<String>,
    /// 科目目录 TOML 文件，未设置时使用内置目录
    pub catalog_file: Option<String>,
    // --- 组卷配置 ---
    /// AI 生成题目的默认难度 (0-100)
    pub default_difficulty: u8,
    /// AI 批量题目跨多个章节时使用的章节标签
    pub ai_chapter_label: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 4096,
            llm_timeout_secs: 120,
            bank_file: None,
            catalog_file: None,
            default_difficulty: 50,
            ai_chapter_label: crate::models::AI_GENERATED_CHAPTER.to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            bank_file: std::env::var("BANK_FILE").ok().filter(|v| !v.is_empty()).or(default.bank_file),
            catalog_file: std::env::var("CATALOG_FILE").ok().filter(|v| !v.is_empty()).or(default.catalog_file),
            default_difficulty: std::env::var("DEFAULT_DIFFICULTY").ok().and_then(|v| v.parse().ok()).filter(|d| *d <= 100).unwrap_or(default.default_difficulty),
            ai_chapter_label: std::env::var("AI_CHAPTER_LABEL").unwrap_or(default.ai_chapter_label),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    pub fn llm_timeout(&self) -> Option<Duration> {
        (self.llm_timeout_secs > 0).then(|| Duration::from_secs(self.llm_timeout_secs))
    }

    /// 是否配置了 LLM 密钥
    pub fn has_llm_credentials(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_credentials() {
        let config = Config::default();
        assert!(!config.has_llm_credentials());
        assert_eq!(config.default_difficulty, 50);
        assert_eq!(config.ai_chapter_label, "AI Generated");
        assert_eq!(config.llm_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let config = Config {
            llm_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.llm_timeout(), None);
    }
}
