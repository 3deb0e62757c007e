use serde::{Deserialize, Serialize};

/// A captured assignment: global, class-level or receiver attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableInfo {
    /// Assignment target as written (`x`, `self.name`, `a, b`)
    pub name: String,

    /// Starting line number (1-indexed)
    pub start_line: usize,

    /// Ending line number (1-indexed)
    pub end_line: usize,

    /// Verbatim declaration text, stripped of surrounding whitespace
    pub text: String,
}

impl VariableInfo {
    pub fn new(
        name: impl Into<String>,
        start_line: usize,
        end_line: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_line,
            end_line,
            text: text.into(),
        }
    }

    /// Attribute name for receiver assignments (`self.count` -> `count`)
    pub fn attribute_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(_, attr)| attr)
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_name() {
        let var = VariableInfo::new("self.count", 3, 3, "self.count = 0");
        assert_eq!(var.attribute_name(), "count");

        let global = VariableInfo::new("LIMIT", 1, 1, "LIMIT = 10");
        assert_eq!(global.attribute_name(), "LIMIT");
    }
}
