//! 错误类型
//!
//! 按来源分层：LLM 边界、文件加载、配置。引擎本身的操作都是全函数，不会产生错误。

use thiserror::Error;

/// 失败分类
///
/// 调用方只需要区分"响应不合规"与"调用没完成"，引擎对两者一视同仁：操作失败，状态不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 外部服务返回的数据不符合约定结构
    Validation,
    /// 外部调用未能完成（网络 / 服务错误）
    Transport,
    /// 本地错误（文件、配置）
    Other,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::Llm(e) => e.kind(),
            AppError::File(_) | AppError::Config(_) => FailureKind::Other,
        }
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source,
        })
    }
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求构建失败
    #[error("LLM请求构建失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 请求超时
    #[error("LLM请求超时 ({model}, {secs}秒)")]
    Timeout { model: String, secs: u64 },
    /// 响应中找不到 JSON 对象
    #[error("LLM响应中没有JSON对象: {preview}")]
    MissingJson { preview: String },
    /// JSON 与约定结构不符
    #[error("LLM响应结构不符合约定: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    /// 单个题目不合规
    #[error("第 {index} 道题不合规: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: SchemaError,
    },
}

impl LlmError {
    /// 失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::ApiCallFailed { .. }
            | LlmError::RequestBuildFailed { .. }
            | LlmError::EmptyContent { .. }
            | LlmError::Timeout { .. } => FailureKind::Transport,
            LlmError::MissingJson { .. }
            | LlmError::InvalidJson { .. }
            | LlmError::InvalidQuestion { .. } => FailureKind::Validation,
        }
    }
}

/// 题目数据结构错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// 没有任何题目表述
    #[error("alternatives 不能为空")]
    EmptyAlternatives,
    /// 题干为空
    #[error("题干不能为空")]
    BlankText,
    /// 无法识别的题型
    #[error("无法识别的题型: {0}")]
    UnknownQuestionType(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 难度超出 0-100
    #[error("难度 {value} 超出范围 [0, 100]")]
    DifficultyOutOfRange { value: i64 },
    /// 科目不在目录中
    #[error("未知科目: {subject}")]
    UnknownSubject { subject: String },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
