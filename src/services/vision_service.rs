//! 文字识别服务 - 业务能力层
//!
//! 调用 Google Vision `images:annotate` 接口识别单页图片中的文字

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, UnitError};

/// 文字识别能力
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// 识别 base64 编码的图片，返回提取的文字（可能为空）
    async fn recognize(&self, encoded_image: &str) -> Result<String, UnitError>;
}

/// Google Vision 客户端
pub struct VisionService {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionService {
    /// 创建新的 Vision 服务
    ///
    /// 缺少 API 密钥或 HTTP 客户端无法构建时直接失败。
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_vision_key()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::service_failed("vision", e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.vision_api_url.clone(),
            api_key,
        })
    }

    async fn extract_text_from_image(&self, encoded_image: &str) -> Result<String, UnitError> {
        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: encoded_image,
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                    max_results: 1,
                }],
            }],
        };

        debug!("调用 Vision API，图片大小: {} 字节 (base64)", encoded_image.len());

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UnitError::Permanent(format!("Vision API 请求超时: {}", e))
                } else {
                    UnitError::from_provider_message(format!("Vision API 请求失败: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = provider_error_message(&body);
            warn!("Vision API 返回错误 ({}): {}", status, message);

            let message = format!("Google Vision API error: {}", message);
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                UnitError::Transient(message)
            } else {
                UnitError::from_provider_message(message)
            });
        }

        let body: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| UnitError::Permanent(format!("无法解析 Vision API 响应: {}", e)))?;

        Ok(first_description(body))
    }
}

#[async_trait]
impl TextRecognizer for VisionService {
    async fn recognize(&self, encoded_image: &str) -> Result<String, UnitError> {
        self.extract_text_from_image(encoded_image).await
    }
}

// ========== 请求 / 响应结构 ==========

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<AnnotateImageRequest<'a>>,
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageContent<'a>,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Deserialize, Default)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// 从错误响应体中取出服务商的错误信息
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| "API request failed".to_string())
}

/// 第一条标注是整页文字
fn first_description(response: AnnotateResponse) -> String {
    response
        .responses
        .into_iter()
        .next()
        .and_then(|r| r.text_annotations.into_iter().next())
        .map(|a| a.description)
        .unwrap_or_default()
}
