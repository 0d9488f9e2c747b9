//! Compiled Unicode regex wrapper (spec §4.1).
//!
//! `regex::Regex` already supports the full Unicode character-property
//! classes the standard rule templates need (`\p{L}`, `\p{Lu}`, `\A`,
//! `\z`, ...), so this module is a thin contract wrapper rather than a
//! new matching engine, following the shape of `obv_lexer`'s compiled
//! pattern lookup. Rule templates that came from POSIX-anchor sources
//! (`\Z` rather than `\z`) are translated before reaching here — see
//! `config::rule_templates::translate_posix_anchors`.

use crate::error::{Result, TokenizerError};
use regex::Regex;

/// Outcome of matching a rule's pattern against a word. `prefix` is the
/// unmatched input before the match; `suffix` is the unmatched input
/// after. `captures` holds the match's capture groups in declaration
/// order, or the whole match if the pattern defines no groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub prefix: String,
    pub suffix: String,
    pub captures: Vec<String>,
}

/// A compiled pattern plus the text it was compiled from, so config
/// errors can point back at the original source.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern_text: String,
    regex: Regex,
}

impl RegexMatcher {
    pub fn compile(pattern_text: &str) -> Result<Self> {
        let regex = Regex::new(pattern_text).map_err(|e| {
            TokenizerError::config_at("invalid regex pattern", format!("{pattern_text}: {e}"))
        })?;
        Ok(RegexMatcher {
            pattern_text: pattern_text.to_string(),
            regex,
        })
    }

    pub fn pattern_text(&self) -> &str {
        &self.pattern_text
    }

    /// Matches anywhere in `input`. Returns `None` if no match is
    /// found.
    pub fn match_all(&self, input: &str) -> Option<MatchResult> {
        let m = self.regex.find(input)?;
        let prefix = input[..m.start()].to_string();
        let suffix = input[m.end()..].to_string();

        let caps = self.regex.captures(input)?;
        let has_groups = self.regex.captures_len() > 1;

        let captures = if has_groups {
            (1..caps.len())
                .filter_map(|i| caps.get(i))
                .map(|c| c.as_str().to_string())
                .collect()
        } else {
            vec![m.as_str().to_string()]
        };

        Some(MatchResult {
            prefix,
            suffix,
            captures,
        })
    }
}
