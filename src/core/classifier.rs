//! Window-title heuristic: decides whether a player title is a track or an ad.
//!
//! Rules are evaluated in a fixed order and the first one that fires wins:
//!
//! 1. degenerate titles (empty, a bare placeholder such as `Spotify Premium`,
//!    or shorter than `min_title_len` characters) are ads;
//! 2. a configured keyword anywhere in the case-folded title is an ad, even
//!    when the title also carries a separator (`Spotify - Advertisement`);
//! 3. an `Artist - Track` separator means content;
//! 4. everything else falls through to the [`NoSeparatorPolicy`].
//!
//! With the default policy this yields the same verdicts as "separator first,
//! then keyword override", while letting keywords and placeholders still
//! apply when the policy is switched to `Content`.

use crate::domain::model::Classification;
use crate::utils::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_SEPARATORS: [&str; 3] = [" - ", " \u{2013} ", " \u{2014} "];
pub const DEFAULT_MIN_TITLE_LEN: usize = 3;

/// What to do with a title that has no `Artist - Track` separator.
///
/// Defaults to `Advertisement`. This favours recall: instrumental or oddly
/// formatted titles get muted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum NoSeparatorPolicy {
    #[default]
    Advertisement,
    Content,
}

impl From<NoSeparatorPolicy> for Classification {
    fn from(value: NoSeparatorPolicy) -> Self {
        match value {
            NoSeparatorPolicy::Advertisement => Classification::Advertisement,
            NoSeparatorPolicy::Content => Classification::Content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Substring,
    /// Token must stand alone, so `ad` does not fire inside `Radiohead`.
    WordBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub token: String,
    #[serde(default)]
    pub mode: MatchMode,
}

impl KeywordRule {
    pub fn substring(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            mode: MatchMode::Substring,
        }
    }

    pub fn word(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            mode: MatchMode::WordBoundary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRules {
    pub separators: Vec<String>,
    pub keywords: Vec<KeywordRule>,
    pub placeholders: Vec<String>,
    pub min_title_len: usize,
    pub no_separator: NoSeparatorPolicy,
}

impl ClassificationRules {
    /// 針對指定播放器的預設規則
    pub fn for_player(player_name: &str) -> Self {
        let player = player_name.trim().to_lowercase();
        Self {
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            keywords: vec![
                KeywordRule::substring("advertisement"),
                KeywordRule::substring("quảng cáo"),
                KeywordRule::substring(player.clone()),
                KeywordRule::word("ad"),
            ],
            placeholders: vec![
                player.clone(),
                format!("{} premium", player),
                format!("{} free", player),
            ],
            min_title_len: DEFAULT_MIN_TITLE_LEN,
            no_separator: NoSeparatorPolicy::default(),
        }
    }
}

/// Which rule produced a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Degenerate,
    Keyword(String),
    Separator,
    NoSeparator(NoSeparatorPolicy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub classification: Classification,
    pub reason: Reason,
}

#[derive(Debug, Clone)]
pub struct TitleClassifier {
    separators: Vec<String>,
    keywords: Option<Regex>,
    placeholders: HashSet<String>,
    min_title_len: usize,
    no_separator: NoSeparatorPolicy,
}

impl TitleClassifier {
    pub fn new(rules: ClassificationRules) -> Result<Self> {
        let alternatives: Vec<String> = rules
            .keywords
            .iter()
            .filter(|rule| !rule.token.trim().is_empty())
            .map(|rule| {
                let escaped = regex::escape(&rule.token.trim().to_lowercase());
                match rule.mode {
                    MatchMode::Substring => escaped,
                    MatchMode::WordBoundary => format!(r"\b{}\b", escaped),
                }
            })
            .collect();

        let keywords = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&alternatives.join("|"))?)
        };

        Ok(Self {
            separators: rules
                .separators
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect(),
            keywords,
            placeholders: rules
                .placeholders
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
            min_title_len: rules.min_title_len,
            no_separator: rules.no_separator,
        })
    }

    pub fn for_player(player_name: &str) -> Result<Self> {
        Self::new(ClassificationRules::for_player(player_name))
    }

    pub fn classify(&self, title: &str) -> Classification {
        self.evaluate(title).classification
    }

    pub fn evaluate(&self, title: &str) -> Verdict {
        let trimmed = title.trim();
        let folded = trimmed.to_lowercase();

        if trimmed.is_empty()
            || trimmed.chars().count() < self.min_title_len
            || self.placeholders.contains(&folded)
        {
            return Verdict {
                classification: Classification::Advertisement,
                reason: Reason::Degenerate,
            };
        }

        if let Some(hit) = self.keywords.as_ref().and_then(|re| re.find(&folded)) {
            return Verdict {
                classification: Classification::Advertisement,
                reason: Reason::Keyword(hit.as_str().to_string()),
            };
        }

        if self.separators.iter().any(|sep| trimmed.contains(sep.as_str())) {
            return Verdict {
                classification: Classification::Content,
                reason: Reason::Separator,
            };
        }

        Verdict {
            classification: self.no_separator.into(),
            reason: Reason::NoSeparator(self.no_separator),
        }
    }
}
