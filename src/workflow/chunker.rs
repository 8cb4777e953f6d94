//! 文本分块
//!
//! 按自然边界把长文本切成有上限的块，保持顺序，可以无损拼回：
//! 1. 先按空行切段落
//! 2. 段落本身超长时，再按句号 `।` 切句；切不开则按制表符切
//! 3. 单个句子 / 段落本身超长时整体作为一个块输出，不截断

/// 段落边界
pub const PARAGRAPH_BOUNDARY: &str = "\n\n";

/// 印度系文字的句号（danda）
pub const SENTENCE_BOUNDARY: char = '।';

/// 句子重新拼接时使用的分隔符
pub const SENTENCE_JOINER: &str = "\t";

/// 把文本切成有序的块
///
/// 长度按字符计。除单个不可再分的片段本身超长外，每块长度不超过 `max_chunk_size`。
/// 空白块不会输出，空文本返回空列表。
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let mut acc = ChunkAccumulator::new(max_chunk_size);

    for paragraph in text.split(PARAGRAPH_BOUNDARY) {
        if char_len(paragraph) > max_chunk_size {
            acc.flush();
            for sentence in split_sentences(paragraph) {
                acc.push(sentence, SENTENCE_JOINER);
            }
        } else {
            acc.push(paragraph, PARAGRAPH_BOUNDARY);
        }
    }

    acc.finish()
}

/// 拆分超长段落
///
/// 句号保留在所属句子末尾，避免丢字符。
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let sentences: Vec<&str> = paragraph.split_inclusive(SENTENCE_BOUNDARY).collect();
    if sentences.len() > 1 {
        sentences
    } else {
        paragraph.split('\t').collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

struct ChunkAccumulator {
    max_chunk_size: usize,
    buffer: String,
    buffer_len: usize,
    chunks: Vec<String>,
}

impl ChunkAccumulator {
    fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size,
            buffer: String::new(),
            buffer_len: 0,
            chunks: Vec::new(),
        }
    }

    /// 追加片段，放不下时先把已有内容作为一块输出
    fn push(&mut self, piece: &str, separator: &str) {
        let piece_len = char_len(piece);
        if self.buffer_len + piece_len > self.max_chunk_size {
            self.flush();
        }
        self.buffer.push_str(piece);
        self.buffer.push_str(separator);
        self.buffer_len += piece_len + char_len(separator);
    }

    fn flush(&mut self) {
        let trimmed = self.buffer.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.buffer.clear();
        self.buffer_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// 不可再分的源片段：每个段落及其拆出的句子
    fn atomic_pieces(text: &str) -> Vec<String> {
        text.split(PARAGRAPH_BOUNDARY)
            .flat_map(|paragraph| std::iter::once(paragraph).chain(split_sentences(paragraph)))
            .map(|piece| piece.trim().to_string())
            .collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("\n\n\n\n", 100).is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(chunk_text("  एक छोटा वाक्य  ", 100), vec!["एक छोटा वाक्य"]);
    }

    #[test]
    fn test_paragraphs_are_grouped() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        // "aaaa\n\nbbbb" 长度 10
        assert_eq!(chunk_text(text, 10), vec!["aaaa\n\nbbbb", "cccc"]);
        assert_eq!(chunk_text(text, 100), vec!["aaaa\n\nbbbb\n\ncccc"]);
    }

    #[test]
    fn test_oversized_paragraph_splits_on_danda() {
        let text = "पहला वाक्य।दूसरा वाक्य।तीसरा";
        let chunks = chunk_text(text, 12);
        assert_eq!(chunks, vec!["पहला वाक्य।", "दूसरा वाक्य।", "तीसरा"]);
    }

    #[test]
    fn test_oversized_paragraph_splits_on_tab_without_danda() {
        let text = "alpha beta\tgamma delta\tepsilon";
        let chunks = chunk_text(text, 12);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta", "epsilon"]);
    }

    #[test]
    fn test_sentences_share_chunk_when_they_fit() {
        let text = "ab।cd।ef";
        let chunks = chunk_text(text, 7);
        assert_eq!(chunks, vec!["ab।\tcd।", "ef"]);
    }

    #[test]
    fn test_atomic_segment_is_not_truncated() {
        let long = "x".repeat(50);
        let text = format!("short\n\n{}\n\nend", long);
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks, vec!["short".to_string(), long, "end".to_string()]);
    }

    #[test]
    fn test_oversized_sentence_is_not_joined_with_neighbours() {
        let text = "ab।cdefghijkl।mn";
        let chunks = chunk_text(text, 5);
        assert_eq!(chunks, vec!["ab।", "cdefghijkl।", "mn"]);
        assert!(!chunks[1].contains(SENTENCE_JOINER));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 每个天城文字符占 3 字节
        let text = "कखगघ\n\nचछजझ";
        assert_eq!(chunk_text(text, 10), vec!["कखगघ\n\nचछजझ"]);
    }

    #[test]
    fn test_no_paragraph_boundary_is_one_paragraph() {
        let text = "line one\nline two";
        assert_eq!(chunk_text(text, 100), vec!["line one\nline two"]);
    }

    proptest! {
        #[test]
        fn prop_reconstructs_losslessly(
            text in "[a-zक-ह।\t\n ]{0,300}",
            max in 1usize..60,
        ) {
            let chunks = chunk_text(&text, max);
            let rebuilt: String = chunks.concat();
            prop_assert_eq!(strip_whitespace(&rebuilt), strip_whitespace(&text));
        }

        #[test]
        fn prop_chunks_respect_limit_unless_atomic(
            text in "[a-z।\t\n ]{0,300}",
            max in 1usize..60,
        ) {
            for chunk in chunk_text(&text, max) {
                prop_assert!(!chunk.trim().is_empty());
                if char_len(&chunk) > max {
                    // 超长块只能是单个片段
                    prop_assert!(!chunk.contains(PARAGRAPH_BOUNDARY));
                    prop_assert!(atomic_pieces(&text).contains(&chunk));
                }
            }
        }
    }
}
