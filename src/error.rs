//! 错误类型
//!
//! 分为两类：
//! - `UnitError`：单个处理单元（文本块 / 页面）的失败，由调度器吸收
//! - `AppError`：初始化或致命错误，直接返回给调用者

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// 单元处理错误
///
/// 由适配器（调用真实服务商的边界代码）负责分类，
/// 调度器只根据标签决定是否重试，不再解析错误文本。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitError {
    /// 暂时性错误（限流、配额不足），可延迟重试
    #[error("暂时性错误: {0}")]
    Transient(String),
    /// 永久性错误（响应格式错误、服务商报错、超时等），直接回退
    #[error("处理失败: {0}")]
    Permanent(String),
}

impl UnitError {
    /// 根据服务商返回的错误信息进行分类
    ///
    /// 包含 `429`、`quota`、以 `rate` 开头的单词、`too many requests`
    /// 或 `resource exhausted` 的信息视为限流类错误（不区分大小写）。
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if rate_limit_pattern().is_match(&message) {
            UnitError::Transient(message)
        } else {
            UnitError::Permanent(message)
        }
    }

    /// 单次调用超时
    pub fn timeout(limit: Duration) -> Self {
        UnitError::Permanent(format!("调用超时 ({:?})", limit))
    }

    /// 是否为限流类错误
    pub fn is_transient(&self) -> bool {
        matches!(self, UnitError::Transient(_))
    }

    /// 原始错误信息
    pub fn message(&self) -> &str {
        match self {
            UnitError::Transient(msg) | UnitError::Permanent(msg) => msg,
        }
    }
}

fn rate_limit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)429|quota|\brate|rate.?limit|too many requests|resource[ _]exhausted")
            .expect("限流正则表达式无效")
    })
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必需的配置项缺失
    #[error("缺少必需的配置项: {name}")]
    MissingValue { name: String },

    /// 配置值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },

    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 应用程序错误类型
///
/// 只用于初始化失败和整批无法开始的情况，单元级错误不会走到这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文档光栅化失败
    #[error("文档光栅化失败 ({path}): {source}")]
    Rasterize {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// 外部服务初始化失败
    #[error("服务初始化失败 ({service}): {reason}")]
    Service { service: String, reason: String },
}

impl AppError {
    /// 创建光栅化错误
    pub fn rasterize_failed(path: impl Into<String>, source: anyhow::Error) -> Self {
        AppError::Rasterize {
            path: path.into(),
            source,
        }
    }

    /// 创建服务初始化错误
    pub fn service_failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Service {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
