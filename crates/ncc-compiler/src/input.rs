//! Configuration input

/// Configuration text, either whole or already split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInput {
    Text(String),
    Lines(Vec<String>),
}

impl ConfigInput {
    /// Raw lines in input order. `Text` is split on `\n` and `\r\n`.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => text.lines().collect(),
            Self::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

impl From<String> for ConfigInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ConfigInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<String>> for ConfigInput {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for ConfigInput {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

/// True for lines the compiler skips
pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}
