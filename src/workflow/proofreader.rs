//! 校对流程 - 流程层
//!
//! 定义"一个文本块"的校对过程：拼提示词 → 调用模型 → 提取修正后的文本

use std::sync::Arc;
use tracing::debug;

use crate::error::UnitError;
use crate::models::Language;
use crate::services::ChatModel;
use crate::utils::logging::truncate_text;

/// 响应中修正文本的起始标记
const CORRECTED_MARKER: &str = "CORRECTED_TEXT:";

/// 修正文本之后可能出现的附加段落
const TRAILING_SECTIONS: [&str; 2] = ["CHANGES_MADE:", "FORMATTING_APPLIED:"];

/// 没有标记时需要去掉的前缀
const STRIPPED_PREFIXES: [&str; 5] = [
    "TECHNICAL ERRORS FOUND:",
    "CHANGES_MADE:",
    "FORMATTING_APPLIED:",
    "No technical corrections needed",
    "No obvious technical errors found",
];

/// 无标记响应至少要这么长才被接受
const MIN_UNMARKED_RESPONSE_CHARS: usize = 50;

/// 校对器
///
/// 职责：
/// - 为单个文本块构建提示词
/// - 从模型响应中提取修正后的文本
/// - 不关心分块、并发和重试
pub struct Proofreader {
    model: Arc<dyn ChatModel>,
}

impl Proofreader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// 校对单个文本块
    ///
    /// # 返回
    /// - 模型错误原样返回，交给调度器的重试策略处理
    /// - 无法提取修正文本时返回空字符串（调度器会保留原文）
    pub async fn proofread_chunk(
        &self,
        chunk: &str,
        language: &Language,
    ) -> Result<String, UnitError> {
        let prompt = build_prompt(chunk, language);
        let response = self.model.generate(&prompt, None).await?;

        match extract_corrected_text(&response) {
            Some(text) => Ok(text),
            None => {
                debug!("无法从响应中提取修正文本: {}", truncate_text(&response, 80));
                Ok(String::new())
            }
        }
    }
}

/// 构建校对提示词
pub fn build_prompt(chunk: &str, language: &Language) -> String {
    format!(
        r#"ROLE: You restore text produced by an OCR scan. Fix technical recognition errors only and keep the author's voice, style and intent exactly as they are.

PRINCIPLES:
 * Minimum intervention: change only what is clearly an OCR error.
 * Invisible corrections: a reader must not be able to tell a correction was made.

LEVEL 1 - MECHANICAL FIXES ({language}):
 * Misrecognised characters
 * Missing, extra or broken vowel marks, anusvara and conjuncts
 * Spaces inside words and missing spaces between words
 * Mangled punctuation
 * Words split by end-of-line hyphenation
 * Paragraph breaks and headings
{specific}
LEVEL 2 - WORD-LEVEL FIXES:
 * Replace words that are gibberish only because of OCR errors
 * Replacements must match the surrounding register and tone

DO NOT translate. DO NOT improve, modernise or rephrase. DO NOT change tone or vocabulary level.

Text to process:
{chunk}

Response format:
{marker}
[the corrected text only]
"#,
        language = language.name(),
        specific = language_specific_checks(language),
        chunk = chunk,
        marker = CORRECTED_MARKER,
    )
}

/// 按语言追加的检查项，非古吉拉特语一律按印地语处理
fn language_specific_checks(language: &Language) -> &'static str {
    match language {
        Language::Gujarati => {
            " * Gujarati matras (ા, િ, ી, ુ, ૂ, ૃ, ે, ૈ, ો, ૌ), conjuncts and half letters\n \
             * Gujarati punctuation (।, ॥)\n \
             * Commonly confused letters: ત/ટ, પ/બ, ક/ખ\n"
        }
        _ => {
            " * Hindi matras (ा, ि, ी, ु, ू, ृ, े, ै, ो, ौ), conjuncts and half letters\n \
             * Hindi punctuation (।, ॥)\n \
             * Commonly confused letters: त/ट, प/फ, क/ख, द/ध\n"
        }
    }
}

/// 从模型响应中提取修正后的文本
pub fn extract_corrected_text(response: &str) -> Option<String> {
    if let Some((_, corrected)) = response.split_once(CORRECTED_MARKER) {
        let mut corrected = corrected;
        for section in TRAILING_SECTIONS {
            if let Some((head, _)) = corrected.split_once(section) {
                corrected = head;
            }
        }
        let corrected = corrected.trim();
        if !corrected.is_empty() {
            return Some(corrected.to_string());
        }
    }

    let mut cleaned = response.trim();
    for prefix in STRIPPED_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim();
        }
    }

    if cleaned.chars().count() > MIN_UNMARKED_RESPONSE_CHARS {
        Some(cleaned.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedModel(Result<String, UnitError>);

    #[async_trait]
    impl ChatModel for FixedModel {
        async fn generate(
            &self,
            _prompt: &str,
            _system: Option<&str>,
        ) -> Result<String, UnitError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_extract_with_marker() {
        let response = "CORRECTED_TEXT:\nसुधरा हुआ पाठ\nCHANGES_MADE: fixed matras";
        assert_eq!(extract_corrected_text(response).as_deref(), Some("सुधरा हुआ पाठ"));
    }

    #[test]
    fn test_extract_cuts_formatting_section() {
        let response = "CORRECTED_TEXT: text body FORMATTING_APPLIED: none";
        assert_eq!(extract_corrected_text(response).as_deref(), Some("text body"));
    }

    #[test]
    fn test_extract_without_marker_requires_length() {
        assert_eq!(extract_corrected_text("short reply"), None);

        let long = "a".repeat(60);
        assert_eq!(extract_corrected_text(&long).as_deref(), Some(long.as_str()));
    }

    #[test]
    fn test_extract_strips_known_prefixes() {
        let body = "b".repeat(55);
        let response = format!("TECHNICAL ERRORS FOUND: {}", body);
        assert_eq!(extract_corrected_text(&response), Some(body));
    }

    #[test]
    fn test_extract_empty_marker_falls_through() {
        assert_eq!(extract_corrected_text("CORRECTED_TEXT:   "), None);
    }

    #[test]
    fn test_prompt_is_language_specific() {
        let gujarati = build_prompt("ચકાસણી", &Language::Gujarati);
        assert!(gujarati.contains("ત/ટ"));
        assert!(gujarati.contains("ચકાસણી"));

        let hindi = build_prompt("जाँच", &Language::Hindi);
        assert!(hindi.contains("त/ट"));

        let other = build_prompt("x", &Language::Other("Marathi".to_string()));
        assert!(other.contains("Hindi matras"));
        assert!(other.contains("(Marathi)"));
    }

    #[tokio::test]
    async fn test_proofread_chunk_returns_corrected_text() {
        let model = Arc::new(FixedModel(Ok("CORRECTED_TEXT:\nठीक".to_string())));
        let proofreader = Proofreader::new(model);
        let result = proofreader.proofread_chunk("ठिक", &Language::Hindi).await;
        assert_eq!(result, Ok("ठीक".to_string()));
    }

    #[tokio::test]
    async fn test_proofread_chunk_unextractable_is_empty() {
        let model = Arc::new(FixedModel(Ok("ok".to_string())));
        let proofreader = Proofreader::new(model);
        assert_eq!(
            proofreader.proofread_chunk("x", &Language::Hindi).await,
            Ok(String::new())
        );
    }

    #[tokio::test]
    async fn test_proofread_chunk_propagates_errors() {
        let model = Arc::new(FixedModel(Err(UnitError::Transient("429".to_string()))));
        let proofreader = Proofreader::new(model);
        let err = proofreader.proofread_chunk("x", &Language::Hindi).await.unwrap_err();
        assert!(err.is_transient());
    }
}
