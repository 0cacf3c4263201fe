use crate::errors::HookError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_LANGUAGE: &str = "und-u-va-posix";

static RE_LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,8}(-[A-Za-z0-9]{1,8})*$").unwrap());

/// BCP 47 language tag the manager was configured with.
///
/// Hook file names are always ordered case-insensitively, whatever the tag. The
/// tag is carried for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language(String);

impl Language {
    /// Case-insensitive order of hook file names. Names that differ only in
    /// case fall back to byte order so the result is total.
    pub fn collate(&self, a: &str, b: &str) -> Ordering {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    }
}

impl Default for Language {
    fn default() -> Self {
        Language(DEFAULT_LANGUAGE.to_string())
    }
}

impl FromStr for Language {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !RE_LANGUAGE_TAG.is_match(s) {
            return Err(HookError::Language(s.to_string()));
        }
        Ok(Language(s.to_string()))
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
