use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Programming languages with a structural extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
}

impl Language {
    /// All known languages
    pub const ALL: &'static [Language] = &[Language::Python];

    /// Lowercase identifier ("python")
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
        }
    }

    /// Detect the language from a file extension (with or without the leading dot)
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.trim_start_matches('.') {
            "py" | "pyw" | "pyi" => Some(Language::Python),
            _ => None,
        }
    }

    /// Detect the language of a file path
    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension(".py"), Some(Language::Python));
        assert_eq!(Language::from_extension("pyi"), Some(Language::Python));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_from_str_and_display() {
        let lang: Language = "Python".parse().unwrap();
        assert_eq!(lang, Language::Python);
        assert_eq!(lang.to_string(), "python");
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Language::from_path(Path::new("/root/pkg/mod.py")),
            Some(Language::Python)
        );
        assert_eq!(Language::from_path(Path::new("README")), None);
    }
}
