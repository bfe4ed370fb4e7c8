use std::{fmt::Display, str::FromStr};

/// Storage key within a single contract's subtree, e.g. `balances.<address>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotPathBuf {
    segments: Vec<String>,
}

impl FromStr for DotPathBuf {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DotPathBuf {
            segments: s
                .split('.')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}

impl Display for DotPathBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl DotPathBuf {
    pub fn new() -> Self {
        DotPathBuf {
            segments: Vec::new(),
        }
    }

    pub fn push(mut self, segment: impl ToString) -> Self {
        let segment = segment.to_string();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }
}

impl Default for DotPathBuf {
    fn default() -> Self {
        Self::new()
    }
}
