use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the reader can display, speak and practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "el-GR")]
    Greek,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Greek];

    /// Full BCP-47 tag handed to the speech engines.
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Greek => "el-GR",
        }
    }

    /// Primary subtag used for voice matching ("en", "el").
    pub fn primary_subtag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Greek => "el",
        }
    }

    /// The parallel language shown next to this one.
    pub fn other(self) -> Language {
        match self {
            Language::English => Language::Greek,
            Language::Greek => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    /// Accepts full tags ("el-GR") as well as bare primary subtags ("el"),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let primary = s.trim().split(['-', '_']).next().unwrap_or_default();
        Language::ALL
            .into_iter()
            .find(|lang| lang.primary_subtag().eq_ignore_ascii_case(primary))
            .ok_or_else(|| anyhow!("Unsupported language tag '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.tag().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_parse_loose_tags() {
        assert_eq!("el".parse::<Language>().unwrap(), Language::Greek);
        assert_eq!("EN_gb".parse::<Language>().unwrap(), Language::English);
        assert!("he-IL".parse::<Language>().is_err());
    }

    #[test]
    fn test_other() {
        assert_eq!(Language::English.other(), Language::Greek);
        assert_eq!(Language::Greek.other(), Language::English);
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&Language::Greek).unwrap();
        assert_eq!(json, "\"el-GR\"");
    }
}
