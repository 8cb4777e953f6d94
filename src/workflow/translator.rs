//! 翻译流程 - 流程层
//!
//! 定义"一个文本块"的翻译过程：清理梵文标记 → 拼提示词 → 调用模型

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::UnitError;
use crate::models::Language;
use crate::services::ChatModel;

/// 翻译器
///
/// 职责：
/// - 统一模型输出中不一致的梵文标记
/// - 为单个文本块构建翻译提示词
/// - 不关心分块、并发和重试
pub struct Translator {
    model: Arc<dyn ChatModel>,
}

impl Translator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// 翻译单个文本块
    ///
    /// 模型错误原样返回，交给调度器处理。
    pub async fn translate_chunk(
        &self,
        chunk: &str,
        source: &Language,
        target: &Language,
    ) -> Result<String, UnitError> {
        debug!("翻译文本块: {} → {}", source, target);

        let cleaned = clean_sanskrit_formatting(chunk);
        let prompt = build_prompt(&cleaned, target);
        let response = self.model.generate(&prompt, None).await?;

        Ok(response.trim().to_string())
    }
}

/// 把各种写法的梵文标记统一为 `<...>`
///
/// 双星号写法必须先于单星号处理，否则会残留星号。
pub fn clean_sanskrit_formatting(text: &str) -> String {
    sanskrit_patterns()
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "<$1>").into_owned()
        })
}

fn sanskrit_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?is)\*\*sanskrit\*\*(.*?)\*\*/sanskrit\*\*",
            r"(?is)\*sanskrit\*(.*?)\*/sanskrit\*",
            r"(?is)\[sanskrit\](.*?)\[/sanskrit\]",
            r"(?is)<sanskrit>(.*?)</sanskrit>",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("梵文标记正则表达式无效"))
        .collect()
    })
}

/// 构建翻译提示词
pub fn build_prompt(chunk: &str, target: &Language) -> String {
    format!(
        r#"You are a master translator and literary stylist for texts with strong cultural and religious specificity. Produce a polished, high-register {target} translation with natural flow and cultural resonance, not a literal rendering.

OUTPUT RULE: respond with the translated text ONLY. No introductions, headings, metadata or commentary.

PREPROCESSING: the source may contain OCR mistakes. Look past them to the author's intended words; do not alter the style.

STRATEGY:
1. Internally identify the writing style (academic, devotional, historical, instructional, ...) and the document genre.
2. Choose the elevated {target} register that fits that genre.
3. Write for an educated Indian {target}-speaking audience: precise, formal, widely understood; avoid casual Western phrasing.

TERMINOLOGY: do NOT translate core Jain religious, philosophical or technical terms (Anekantavada, Samyak Charitra, Kevala Jnana, Tirthankara, ...); keep them as transliterated in the source. Keep text inside <angle brackets> unchanged.

Text:
{chunk}
"#,
        target = target.name(),
        chunk = chunk,
    )
}
