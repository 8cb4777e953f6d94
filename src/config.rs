use crate::error::ConfigError;
use crate::orchestrator::RetryPolicy;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 文本块并发处理数
    pub max_workers: usize,
    /// 两次外部调用之间的最小间隔（毫秒）
    pub min_request_interval_ms: u64,
    /// 限流重试前的等待时间（秒）
    pub retry_delay_secs: u64,
    /// 限流错误的最大重试次数
    pub max_retries: usize,
    /// 单个单元调用的超时时间（秒），0 表示不限制
    pub unit_timeout_secs: u64,
    /// 单个文本块的最大字符数
    pub max_chunk_size: usize,
    /// OCR 页面并发数
    pub ocr_workers: usize,
    /// 光栅化分辨率
    pub ocr_dpi: u32,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    // --- Vision API 配置 ---
    pub vision_api_key: String,
    pub vision_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 5,
            min_request_interval_ms: 200,
            retry_delay_secs: 5,
            max_retries: 1,
            unit_timeout_secs: 300,
            max_chunk_size: 20_000,
            ocr_workers: 5,
            ocr_dpi: 200,
            request_timeout_secs: 90,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
            llm_temperature: 0.3,
            vision_api_key: String::new(),
            vision_api_url: "https://vision.googleapis.com/v1/images:annotate".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_workers: env_or("MAX_WORKERS", default.max_workers),
            min_request_interval_ms: env_or(
                "MIN_REQUEST_INTERVAL_MS",
                default.min_request_interval_ms,
            ),
            retry_delay_secs: env_or("RETRY_DELAY_SECS", default.retry_delay_secs),
            max_retries: env_or("MAX_RETRIES", default.max_retries),
            unit_timeout_secs: env_or("UNIT_TIMEOUT_SECS", default.unit_timeout_secs),
            max_chunk_size: env_or("MAX_CHUNK_SIZE", default.max_chunk_size),
            ocr_workers: env_or("OCR_WORKERS", default.ocr_workers),
            ocr_dpi: env_or("OCR_DPI", default.ocr_dpi),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", default.request_timeout_secs),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_or("LLM_TEMPERATURE", default.llm_temperature),
            vision_api_key: std::env::var("VISION_API_KEY").unwrap_or(default.vision_api_key),
            vision_api_url: std::env::var("VISION_API_URL").unwrap_or(default.vision_api_url),
        }
    }

    /// 从 TOML 文件加载配置，未填写的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 检查数值类配置是否合法
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "必须大于 0"));
        }
        if self.ocr_workers == 0 {
            return Err(invalid("ocr_workers", "必须大于 0"));
        }
        if self.max_chunk_size == 0 {
            return Err(invalid("max_chunk_size", "必须大于 0"));
        }
        if self.ocr_dpi == 0 {
            return Err(invalid("ocr_dpi", "必须大于 0"));
        }
        Ok(())
    }

    /// LLM 密钥，缺失时返回致命错误
    pub fn require_llm_key(&self) -> Result<&str, ConfigError> {
        require("LLM_API_KEY", &self.llm_api_key)
    }

    /// Vision API 密钥，缺失时返回致命错误
    pub fn require_vision_key(&self) -> Result<&str, ConfigError> {
        require("VISION_API_KEY", &self.vision_api_key)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn unit_timeout(&self) -> Option<Duration> {
        (self.unit_timeout_secs > 0).then(|| Duration::from_secs(self.unit_timeout_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    std::env::var(var_name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingValue {
            name: name.to_string(),
        })
    } else {
        Ok(value)
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.min_request_interval(), Duration::from_millis(200));
        assert_eq!(config.retry_policy(), RetryPolicy::new(1, Duration::from_secs(5)));
        assert_eq!(config.request_timeout(), Duration::from_secs(90));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_keys_are_fatal() {
        let config = Config::default();
        assert!(matches!(
            config.require_llm_key(),
            Err(ConfigError::MissingValue { .. })
        ));
        assert!(config.require_vision_key().is_err());
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let config = Config {
            unit_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.unit_timeout(), None);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config {
            max_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            max_workers = 8
            llm_model_name = "gemini-2.5-flash"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.llm_model_name, "gemini-2.5-flash");
        assert_eq!(config.max_chunk_size, 20_000);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = Config::from_toml_file("/nonexistent/doc_pipeline.toml");
        assert!(matches!(result, Err(ConfigError::FileReadFailed { .. })));
    }
}
