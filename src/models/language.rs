use std::fmt;

/// 文档语言
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    /// 印地语
    Hindi,
    /// 古吉拉特语
    Gujarati,
    /// 英语
    English,
    /// 其他语言（保留原始名称）
    Other(String),
}

impl Language {
    /// 获取标准名称（用于拼接提示词）
    pub fn name(&self) -> &str {
        match self {
            Language::Hindi => "Hindi",
            Language::Gujarati => "Gujarati",
            Language::English => "English",
            Language::Other(name) => name,
        }
    }

    /// 从字符串解析语言（不区分大小写）
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hindi" | "hi" => Language::Hindi,
            "gujarati" | "gu" => Language::Gujarati,
            "english" | "en" => Language::English,
            _ => Language::Other(s.trim().to_string()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Language::parse("Gujarati"), Language::Gujarati);
        assert_eq!(Language::parse(" hindi "), Language::Hindi);
        assert_eq!(Language::parse("en"), Language::English);
        assert_eq!(Language::parse("Marathi"), Language::Other("Marathi".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::Gujarati.to_string(), "Gujarati");
        assert_eq!(Language::Other("Marathi".to_string()).to_string(), "Marathi");
    }
}
