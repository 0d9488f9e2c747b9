//! Normalizer + character filter (spec §4.3, §4.7 `[FILTER]`).
//!
//! Both are pure functions on strings and are treated as external
//! collaborators per spec.md §1 ("Unicode normalization/character-
//! substitution filtering ... used as pure functions on strings") — the
//! actual NFC/NFD/NFKC/NFKD algorithms are not reimplemented here, they
//! are delegated to `unicode-normalization`.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Which Unicode normalization form to apply before tokenization.
/// Default is NFC (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
    /// No normalization at all — useful for tests and for inputs that
    /// are already known-normalized.
    None,
}

impl NormalizationForm {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "NFC" => Some(NormalizationForm::Nfc),
            "NFD" => Some(NormalizationForm::Nfd),
            "NFKC" => Some(NormalizationForm::Nfkc),
            "NFKD" => Some(NormalizationForm::Nfkd),
            "NONE" => Some(NormalizationForm::None),
            _ => None,
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            NormalizationForm::Nfc => input.nfc().collect(),
            NormalizationForm::Nfd => input.nfd().collect(),
            NormalizationForm::Nfkc => input.nfkc().collect(),
            NormalizationForm::Nfkd => input.nfkd().collect(),
            NormalizationForm::None => input.to_string(),
        }
    }
}

/// Point-wise character substitution table, built from `[FILTER]`
/// entries (`src dst`, one code point to zero-or-more replacement
/// characters; an empty `dst` deletes the character).
#[derive(Debug, Clone, Default)]
pub struct CharFilter {
    substitutions: HashMap<char, String>,
}

impl CharFilter {
    pub fn new() -> Self {
        CharFilter::default()
    }

    pub fn add(&mut self, src: char, dst: impl Into<String>) {
        self.substitutions.insert(src, dst.into());
    }

    pub fn apply(&self, input: &str) -> String {
        if self.substitutions.is_empty() {
            return input.to_string();
        }
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            match self.substitutions.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        out
    }
}

/// Applies normalization then the character filter, in that order
/// (spec §4.3: "normalize the input ... then apply the character
/// filter").
pub fn normalize_and_filter(input: &str, form: NormalizationForm, filter: &CharFilter) -> String {
    let normalized = form.apply(input);
    filter.apply(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_deletes_on_empty_replacement() {
        let mut f = CharFilter::new();
        f.add('\u{00AD}', "");
        assert_eq!(f.apply("so\u{00AD}ft"), "soft");
    }

    #[test]
    fn filter_substitutes_multi_char_replacement() {
        let mut f = CharFilter::new();
        f.add('\u{2026}', "...");
        assert_eq!(f.apply("wait\u{2026}"), "wait...");
    }

    #[test]
    fn normalization_form_parse_is_case_insensitive() {
        assert_eq!(NormalizationForm::parse("nfc"), Some(NormalizationForm::Nfc));
        assert_eq!(NormalizationForm::parse("NFKD"), Some(NormalizationForm::Nfkd));
        assert_eq!(NormalizationForm::parse("bogus"), None);
    }

    #[test]
    fn running_normalization_twice_is_idempotent() {
        let input = "e\u{0301}cole";
        let once = NormalizationForm::Nfc.apply(input);
        let twice = NormalizationForm::Nfc.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_and_filter_runs_normalization_before_filter() {
        // "e" + combining acute accent NFC-composes to "é" (U+00E9) before
        // the filter runs, so a filter rule on plain ASCII 'e' no longer
        // applies to the composed result.
        let mut f = CharFilter::new();
        f.add('e', "E");
        let out = normalize_and_filter("e\u{0301}", NormalizationForm::Nfc, &f);
        assert_eq!(out, "\u{00E9}");
    }
}
