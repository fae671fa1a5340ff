use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TranslateError;

/// A validated language code such as `hi`, `en`, or `zh-CN`.
///
/// The primary subtag is 2-3 ASCII letters and is stored lowercase. An
/// optional region subtag (2-4 ASCII alphanumerics, `-` or `_` separated) is
/// kept as written and always rendered with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LangCode {
    primary: String,
    region: Option<String>,
}

impl LangCode {
    pub fn parse(raw: &str) -> Result<Self, TranslateError> {
        let trimmed = raw.trim();
        let invalid = || TranslateError::InvalidLang(raw.to_string());

        let (primary, region) = match trimmed.split_once(['-', '_']) {
            Some((p, r)) => (p, Some(r)),
            None => (trimmed, None),
        };

        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if let Some(r) = region {
            if !(2..=4).contains(&r.len()) || !r.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
        }

        Ok(Self {
            primary: primary.to_ascii_lowercase(),
            region: region.map(str::to_string),
        })
    }

    /// Primary language subtag, e.g. `zh` for `zh-CN`.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl Default for LangCode {
    fn default() -> Self {
        Self {
            primary: "hi".into(),
            region: None,
        }
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(r) => write!(f, "{}-{}", self.primary, r),
            None => f.write_str(&self.primary),
        }
    }
}

impl FromStr for LangCode {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LangCode {
    type Error = TranslateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LangCode> for String {
    fn from(code: LangCode) -> Self {
        code.to_string()
    }
}
