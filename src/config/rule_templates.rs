//! Standard rule templates (spec §4.7).
//!
//! Each template has a `$NAME` placeholder that is substituted with the
//! `|`-joined alternation of the corresponding aggregate section before
//! compiling. The seven standard rules are always inserted at the front
//! of the rule list, in the fixed order below, so they take precedence
//! over any user `[RULES]` entry (spec §4.4).

/// The standard rule ids in their fixed precedence order.
pub const STANDARD_RULE_ORDER: &[&str] = &[
    "NUMBER-ORDINAL",
    "ABBREVIATION-KNOWN",
    "WORD-TOKEN",
    "WORD-WITHPREFIX",
    "WORD-WITHSUFFIX",
    "PREFIX",
    "SUFFIX",
];

/// Aggregate sections feeding an inert placeholder when empty: a
/// template whose aggregate is empty matches nothing (an alternation of
/// zero alternatives, represented as the never-matching pattern `\z\A`
/// wrapped in a non-capturing group, so the surrounding template stays
/// well-formed rather than producing an empty-alternation regex error).
const NEVER_MATCHES: &str = "[^\\s\\S]";

fn alternation(fragments: &[String]) -> String {
    if fragments.is_empty() {
        NEVER_MATCHES.to_string()
    } else {
        fragments.join("|")
    }
}

pub fn number_ordinal(ordinals: &[String]) -> String {
    format!(
        r"\p{{N}}+-?(?:{})(?:\z|\P{{Lu}}|\P{{Ll}})",
        alternation(ordinals)
    )
}

pub fn abbreviation_known(abbrevs: &[String]) -> String {
    format!(
        r"(?:\p{{P}}*)?(?:\A|[^\p{{L}}\.])((?:{})\.)(?:\z|\P{{L}})",
        alternation(abbrevs)
    )
}

pub fn word_token(tokens: &[String]) -> String {
    format!(r"({})(?:\p{{P}}*)?$", alternation(tokens))
}

pub fn word_with_prefix(attached_prefixes: &[String]) -> String {
    format!(
        r"(?:\A|[^\p{{Lu}}\.]|[^\p{{Ll}}\.])(?:{})\p{{L}}+",
        alternation(attached_prefixes)
    )
}

pub fn word_with_suffix(attached_suffixes: &[String]) -> String {
    format!(
        r"((?:\p{{Lu}}|\p{{Ll}})+(?:{}))(?:\z|\P{{Lu}}|\P{{Ll}})",
        alternation(attached_suffixes)
    )
}

pub fn prefix(prefixes: &[String]) -> String {
    format!(
        r"(?:\A|[^\p{{Lu}}\.]|[^\p{{Ll}}\.])({})(\p{{L}}+)",
        alternation(prefixes)
    )
}

pub fn suffix(suffixes: &[String]) -> String {
    format!(
        r"(\p{{Lu}}|\p{{Ll}}+)({})(?:\z|\P{{L}})",
        alternation(suffixes)
    )
}

/// `regex` (the Rust crate) implements `\A` for absolute start but only
/// `\z` (lowercase) for absolute end — it has no `\Z`. The standard
/// templates above are written with `\z` directly; this translates any
/// `\Z` appearing in a *user-supplied* pattern (`[RULES]` entries, or
/// aggregate-section fragments that happen to include an explicit
/// anchor) to the engine's actual spelling, per spec.md §9's note that
/// an engine lacking a required anchor should have the templates
/// rewritten rather than the matching behavior changed.
pub fn translate_posix_anchors(pattern: &str) -> String {
    pattern.replace(r"\Z", r"\z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_ordinal_substitutes_alternation() {
        let p = number_ordinal(&["st".to_string(), "nd".to_string()]);
        assert!(p.contains("st|nd"));
    }

    #[test]
    fn empty_aggregate_produces_never_matching_alternative() {
        let p = word_token(&[]);
        assert!(p.contains(NEVER_MATCHES));
    }

    #[test]
    fn translate_posix_anchors_rewrites_uppercase_z() {
        assert_eq!(translate_posix_anchors(r"foo\Zbar"), r"foo\zbar");
        assert_eq!(translate_posix_anchors(r"\A\z"), r"\A\z");
    }
}
