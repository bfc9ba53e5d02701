use std::fmt;

/// 语言水平（CEFR）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    /// 无法识别的水平，保留原始字符串
    Unrecognized(String),
}

impl Level {
    /// 解析水平字符串（不区分大小写，永不失败）
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "A1" => Level::A1,
            "A2" => Level::A2,
            "B1" => Level::B1,
            "B2" => Level::B2,
            "C1" => Level::C1,
            "C2" => Level::C2,
            _ => Level::Unrecognized(s.trim().to_string()),
        }
    }

    /// 每句最多词数；无法识别的水平返回 None
    pub fn max_words(&self) -> Option<u32> {
        match self {
            Level::A1 => Some(10),
            Level::A2 => Some(12),
            Level::B1 => Some(14),
            Level::B2 => Some(16),
            Level::C1 => Some(18),
            Level::C2 => Some(20),
            Level::Unrecognized(_) => None,
        }
    }

    /// 句长规则，写进每一个提示词
    pub fn sentence_rule(&self) -> String {
        match self.max_words() {
            Some(n) => format!("Max {} words per sentence.", n),
            None => "Keep sentences concise and level-appropriate.".to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
            Level::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一个单元的科目记录，每行输入对应一条
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRecord {
    pub level: Level,
    pub unit_title: String,
    pub grammar_focus: String,
    pub vocab_topics: Vec<String>,
}
