//! Configuration loader (spec §4.7).
//!
//! Line-oriented, UTF-8. No prior module in this codebase's lineage did
//! this (the compiled-in "configuration" used to be fixed `phf` sets);
//! the overall "has sensible compiled-in defaults, overridable by
//! configuration" shape is grounded on `prelude.rs`'s `Standard` trait
//! default, and the section/`%include` grammar is supplemented from
//! `examples/original_source/src/tokenize.cxx` (ucto) where spec.md is
//! silent on loader mechanics (see SPEC_FULL.md §4.7). The default
//! EOS-marker set is a `phf::Set`, the same compiled-in-character-set
//! shape used for `SENTENCE_TERMINATORS` and friends in `prelude.rs`;
//! the builtin punctuation/number fallback rules are compiled once
//! behind `once_cell::sync::Lazy` and cloned per config, since `Regex`
//! is cheap to clone but not free to recompile.

mod rule_templates;

use crate::error::{Result, TokenizerError};
use crate::normalize::{CharFilter, NormalizationForm};
use crate::quote::QuoteRegistry;
use crate::regex_matcher::RegexMatcher;
use crate::rule::{Rule, RuleSet};
use once_cell::sync::Lazy;
use phf::phf_set;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default EOS markers (spec §4.7), compiled in the same shape as the
/// teacher's `prelude.rs` `phf_set!` character sets.
static DEFAULT_EOS_MARKERS: phf::Set<char> = phf_set! { '!', '?' };

const DEFAULT_EXPLICIT_EOS_MARKER: &str = "<utt>";

/// A fully loaded, immutable-after-load tokenizer configuration.
#[derive(Debug)]
pub struct Config {
    pub rules: RuleSet,
    pub quotes: QuoteRegistry,
    pub eos_markers: HashSet<char>,
    pub filter: CharFilter,
    pub normalization_form: NormalizationForm,
    pub explicit_eos_marker: String,
    pub detect_sentences: bool,
    pub detect_quotes: bool,
    /// Parsed but not wired into any standard rule, matching the
    /// original tool's own (disabled) handling of this section — see
    /// DESIGN.md open-question resolutions.
    pub units: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut quotes = QuoteRegistry::new();
        for (open, close) in default_quote_pairs() {
            quotes.add(open, close);
        }

        Config {
            rules: RuleSet::new(),
            quotes,
            eos_markers: DEFAULT_EOS_MARKERS.iter().copied().collect(),
            filter: CharFilter::new(),
            normalization_form: NormalizationForm::Nfc,
            explicit_eos_marker: DEFAULT_EXPLICIT_EOS_MARKER.to_string(),
            detect_sentences: true,
            detect_quotes: true,
            units: Vec::new(),
        }
    }
}

/// Default quote pairs when `[QUOTES]` is empty (spec §4.7):
/// `("`, `")`, (`'`, `'`), (`"„‟`, `"`).
fn default_quote_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("\"", "\""),
        ("\u{2018}", "\u{2019}"),
        ("\u{201C}\u{201E}\u{201F}", "\u{201D}"),
    ]
}

#[derive(Debug, Default)]
struct RawSections {
    rules: Vec<(String, String)>,
    rule_order: Vec<String>,
    abbreviations: Vec<String>,
    attached_prefixes: Vec<String>,
    attached_suffixes: Vec<String>,
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    tokens: Vec<String>,
    units: Vec<String>,
    ordinals: Vec<String>,
    eos_markers: Vec<char>,
    quotes: Vec<(String, String)>,
    filter: Vec<(char, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Rules,
    RuleOrder,
    Abbreviations,
    AttachedPrefixes,
    AttachedSuffixes,
    Prefixes,
    Suffixes,
    Tokens,
    Units,
    Ordinals,
    EosMarkers,
    Quotes,
    Filter,
}

impl Section {
    fn from_header(line: &str) -> Option<Section> {
        match line {
            "[RULES]" => Some(Section::Rules),
            "[RULE-ORDER]" => Some(Section::RuleOrder),
            "[ABBREVIATIONS]" => Some(Section::Abbreviations),
            "[ATTACHEDPREFIXES]" => Some(Section::AttachedPrefixes),
            "[ATTACHEDSUFFIXES]" => Some(Section::AttachedSuffixes),
            "[PREFIXES]" => Some(Section::Prefixes),
            "[SUFFIXES]" => Some(Section::Suffixes),
            "[TOKENS]" => Some(Section::Tokens),
            "[UNITS]" => Some(Section::Units),
            "[ORDINALS]" => Some(Section::Ordinals),
            "[EOSMARKERS]" => Some(Section::EosMarkers),
            "[QUOTES]" => Some(Section::Quotes),
            "[FILTER]" => Some(Section::Filter),
            _ => None,
        }
    }

    /// Sections that support `%include` (spec §4.7).
    fn supports_include(self) -> bool {
        matches!(
            self,
            Section::Rules | Section::Filter | Section::Quotes | Section::EosMarkers
        )
    }

    fn include_extension(self) -> &'static str {
        match self {
            Section::Rules => "rule",
            Section::Filter => "filter",
            Section::Quotes => "quote",
            Section::EosMarkers => "eos",
            _ => unreachable!("include only supported on the sections checked above"),
        }
    }
}

impl Config {
    /// Loads a configuration given either a plain name (resolved
    /// against `default_dir`) or a path containing `/` (used as-is,
    /// with its containing directory as the include root) — spec §6.
    pub fn load(name_or_path: &str, default_dir: &Path) -> Result<Config> {
        let (file_path, include_root) = resolve_config_path(name_or_path, default_dir);
        let text = std::fs::read_to_string(&file_path).map_err(|e| {
            TokenizerError::config_at(
                "unable to read configuration file",
                format!("{}: {e}", file_path.display()),
            )
        })?;
        Self::parse(&text, &include_root)
    }

    /// Parses already-read configuration text, resolving any
    /// `%include` directives against `include_root`.
    pub fn parse(text: &str, include_root: &Path) -> Result<Config> {
        let mut raw = RawSections::default();
        parse_into(text, include_root, &mut raw)?;
        build_config(raw)
    }
}

fn resolve_config_path(name_or_path: &str, default_dir: &Path) -> (PathBuf, PathBuf) {
    if name_or_path.contains('/') {
        let path = PathBuf::from(name_or_path);
        let root = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        (path, root)
    } else {
        (default_dir.join(name_or_path), default_dir.to_path_buf())
    }
}

fn parse_into(text: &str, include_root: &Path, raw: &mut RawSections) -> Result<()> {
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(s) = Section::from_header(line) {
            section = s;
            continue;
        }

        if let Some(rest) = line.strip_prefix("%include ") {
            if !section.supports_include() {
                return Err(TokenizerError::config_at(
                    "%include used in a section that does not support it",
                    line.to_string(),
                ));
            }
            let included = include_root.join(format!("{}.{}", rest.trim(), section.include_extension()));
            let included_text = std::fs::read_to_string(&included).map_err(|e| {
                TokenizerError::config_at(
                    "unable to read %include target",
                    format!("{}: {e}", included.display()),
                )
            })?;
            parse_into(&included_text, include_root, raw)?;
            continue;
        }

        parse_body_line(section, line, raw)?;
    }

    Ok(())
}

fn parse_body_line(section: Section, line: &str, raw: &mut RawSections) -> Result<()> {
    match section {
        Section::None => Err(TokenizerError::config_at(
            "configuration body line outside any section",
            line.to_string(),
        )),
        Section::Rules => {
            let (id, pattern) = line
                .split_once('=')
                .ok_or_else(|| TokenizerError::config_at("malformed [RULES] entry, expected id=pattern", line.to_string()))?;
            raw.rules.push((id.trim().to_string(), pattern.trim().to_string()));
            Ok(())
        }
        Section::RuleOrder => {
            raw.rule_order.extend(line.split_whitespace().map(|s| s.to_string()));
            Ok(())
        }
        Section::Abbreviations => {
            raw.abbreviations.push(line.to_string());
            Ok(())
        }
        Section::AttachedPrefixes => {
            raw.attached_prefixes.push(line.to_string());
            Ok(())
        }
        Section::AttachedSuffixes => {
            raw.attached_suffixes.push(line.to_string());
            Ok(())
        }
        Section::Prefixes => {
            raw.prefixes.push(line.to_string());
            Ok(())
        }
        Section::Suffixes => {
            raw.suffixes.push(line.to_string());
            Ok(())
        }
        Section::Tokens => {
            raw.tokens.push(line.to_string());
            Ok(())
        }
        Section::Units => {
            raw.units.push(line.to_string());
            Ok(())
        }
        Section::Ordinals => {
            raw.ordinals.push(line.to_string());
            Ok(())
        }
        Section::EosMarkers => {
            raw.eos_markers.push(parse_unicode_escape(line)?);
            Ok(())
        }
        Section::Quotes => {
            let mut parts = line.split_whitespace();
            let open = parts
                .next()
                .ok_or_else(|| TokenizerError::config_at("malformed [QUOTES] entry, expected 'open close'", line.to_string()))?;
            let close = parts
                .next()
                .ok_or_else(|| TokenizerError::config_at("malformed [QUOTES] entry, expected 'open close'", line.to_string()))?;
            raw.quotes.push((unescape(open)?, unescape(close)?));
            Ok(())
        }
        Section::Filter => {
            let mut parts = line.splitn(2, char::is_whitespace);
            let src = parts
                .next()
                .ok_or_else(|| TokenizerError::config_at("malformed [FILTER] entry, expected 'src dst'", line.to_string()))?;
            let dst = parts.next().unwrap_or("").trim_start();
            let src_unescaped = unescape(src)?;
            let mut chars = src_unescaped.chars();
            let src_char = chars
                .next()
                .ok_or_else(|| TokenizerError::config_at("[FILTER] src must be a single code point", line.to_string()))?;
            if chars.next().is_some() {
                return Err(TokenizerError::config_at(
                    "[FILTER] src must be a single code point",
                    line.to_string(),
                ));
            }
            raw.filter.push((src_char, unescape(dst)?));
            Ok(())
        }
    }
}

/// Backslash-unescape shared by `[QUOTES]`, `[FILTER]`, and
/// `[EOSMARKERS]` (spec §4.7 applies this grammar uniformly rather than
/// redefining it per section — see SPEC_FULL.md §4.7).
fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(8).collect();
                out.push(parse_hex_escape(&hex)?);
            }
            Some(other) => {
                return Err(TokenizerError::config_at("unknown escape sequence", format!("\\{other}")));
            }
            None => return Err(TokenizerError::config_at("trailing backslash in escape sequence", s.to_string())),
        }
    }

    Ok(out)
}

fn parse_unicode_escape(line: &str) -> Result<char> {
    let hex = line
        .strip_prefix("\\u")
        .ok_or_else(|| TokenizerError::config_at("[EOSMARKERS] entry must be a \\uXXXX or \\uXXXXXXXX escape", line.to_string()))?;
    parse_hex_escape(hex)
}

fn parse_hex_escape(hex: &str) -> Result<char> {
    // \uXXXX (4 hex digits) or \uXXXXXXXX (8 hex digits).
    let digits = if hex.len() >= 8 { &hex[..8] } else { hex };
    let code = u32::from_str_radix(digits, 16)
        .map_err(|e| TokenizerError::config_at("invalid \\u escape", format!("{digits}: {e}")))?;
    char::from_u32(code).ok_or_else(|| TokenizerError::config_at("\\u escape is not a valid code point", digits.to_string()))
}

fn build_config(raw: RawSections) -> Result<Config> {
    let mut config = Config::default();

    if !raw.eos_markers.is_empty() {
        config.eos_markers = raw.eos_markers.into_iter().collect();
    }

    if !raw.quotes.is_empty() {
        let mut quotes = QuoteRegistry::new();
        for (open, close) in raw.quotes {
            quotes.add(open, close);
        }
        config.quotes = quotes;
    }

    for (src, dst) in raw.filter {
        config.filter.add(src, dst);
    }

    config.units = raw.units;

    let mut rules = RuleSet::new();

    let standard_templates: [(&str, String); 7] = [
        ("NUMBER-ORDINAL", rule_templates::number_ordinal(&raw.ordinals)),
        ("ABBREVIATION-KNOWN", rule_templates::abbreviation_known(&raw.abbreviations)),
        ("WORD-TOKEN", rule_templates::word_token(&raw.tokens)),
        ("WORD-WITHPREFIX", rule_templates::word_with_prefix(&raw.attached_prefixes)),
        ("WORD-WITHSUFFIX", rule_templates::word_with_suffix(&raw.attached_suffixes)),
        ("PREFIX", rule_templates::prefix(&raw.prefixes)),
        ("SUFFIX", rule_templates::suffix(&raw.suffixes)),
    ];

    let mut seen_ids: HashSet<String> = HashSet::new();

    for (id, pattern) in standard_templates {
        let matcher = RegexMatcher::compile(&rule_templates::translate_posix_anchors(&pattern))?;
        rules.push(Rule::new(id, matcher));
        seen_ids.insert(id.to_string());
    }

    for (id, pattern) in raw.rules {
        if !seen_ids.insert(id.clone()) {
            return Err(TokenizerError::config_at("duplicate rule id", id));
        }
        let matcher = RegexMatcher::compile(&rule_templates::translate_posix_anchors(&pattern))?;
        rules.push(Rule::new(id, matcher));
    }

    if !raw.rule_order.is_empty() {
        rules.reorder(&raw.rule_order);
    }

    append_builtin_fallback_rules(&mut rules, &seen_ids)?;

    config.rules = rules;

    Ok(config)
}

/// The retrieval pack's `original_source/` copy of the real tokenizer
/// this spec distills from ships its language data (the actual default
/// `[RULES]`/`[SUFFIXES]`/`[PREFIXES]` content) as a separate data file,
/// which the pack filtered out as non-code. Without it, a genuinely
/// empty configuration can never split punctuation off a word — spec
/// §4.4's literal last resort ("no rule matches, emit the entire input
/// as one WORD token") would otherwise turn `world.` into a single
/// `WORD` token, contradicting the worked example in spec.md §8 where
/// `Hello world.` splits into `world` and `.` with the period typed
/// `PUNCTUATION`.
///
/// These two built-in rules fill that gap: unconditional, lowest
/// precedence (inserted after everything else, including any
/// `[RULE-ORDER]` directive), and only added when no standard or user
/// rule already claims the id — a user who writes their own `PUNCTUATION`
/// or `NUMBER` rule fully replaces the corresponding default. Their ids
/// are chosen to coincide with the generic token-type names on purpose:
/// §4.5's detector matches tokens "whose type starts with `PUNCTUATION`",
/// a string-prefix test that a rule id of `PUNCTUATION` satisfies exactly
/// (see `TokenType::is_punctuation`).
///
/// `PUNCTUATION` matches exactly one punctuation code point, not a run
/// of them: the sentence/quote detector (§4.5) and `resolveQuote` act on
/// individual punctuation tokens (an opening quote, a `!`, a closing
/// quote, a comma, each its own token), so a greedy `\p{P}+` would fuse
/// e.g. `!",` in `"Hi!", he said.` into one token and hide the quote
/// character from quote resolution entirely. `NUMBER` stays `+`: digits
/// of one number are meant to stay together (`123`, not `1`, `2`, `3`).
static PUNCTUATION_FALLBACK: Lazy<RegexMatcher> =
    Lazy::new(|| RegexMatcher::compile(r"\p{P}").expect("builtin PUNCTUATION fallback pattern is valid"));
static NUMBER_FALLBACK: Lazy<RegexMatcher> =
    Lazy::new(|| RegexMatcher::compile(r"\p{N}+").expect("builtin NUMBER fallback pattern is valid"));

fn append_builtin_fallback_rules(rules: &mut RuleSet, seen_ids: &HashSet<String>) -> Result<()> {
    if !seen_ids.contains("PUNCTUATION") {
        rules.push(Rule::new("PUNCTUATION", PUNCTUATION_FALLBACK.clone()));
    }
    if !seen_ids.contains("NUMBER") {
        rules.push(Rule::new("NUMBER", NUMBER_FALLBACK.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_standard_eos_markers_and_quote_pairs() {
        let config = Config::default();
        assert!(config.eos_markers.contains(&'!'));
        assert!(config.eos_markers.contains(&'?'));
        assert_eq!(config.rules.len(), 0);
        assert_eq!(config.explicit_eos_marker, "<utt>");
    }

    #[test]
    fn parse_builds_standard_rules_in_precedence_order() {
        let text = "[ORDINALS]\nst\nnd\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        let ids: Vec<&str> = config.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            &ids[..7],
            &[
                "NUMBER-ORDINAL",
                "ABBREVIATION-KNOWN",
                "WORD-TOKEN",
                "WORD-WITHPREFIX",
                "WORD-WITHSUFFIX",
                "PREFIX",
                "SUFFIX",
            ]
        );
    }

    #[test]
    fn empty_config_still_gets_builtin_punctuation_and_number_fallback_rules() {
        let config = Config::parse("", Path::new(".")).unwrap();
        let ids: Vec<&str> = config.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(&ids[ids.len() - 2..], &["PUNCTUATION", "NUMBER"]);
    }

    #[test]
    fn user_rule_named_punctuation_suppresses_the_builtin_fallback() {
        let text = "[RULES]\nPUNCTUATION=\\.\\.\\.\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        let count = config.rules.iter().filter(|r| r.id == "PUNCTUATION").count();
        assert_eq!(count, 1);
        // the NUMBER fallback is untouched and still appended
        assert!(config.rules.iter().any(|r| r.id == "NUMBER"));
    }

    #[test]
    fn parse_user_rules_follow_standard_rules() {
        let text = "[RULES]\nURL=https?://\\S+\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        let ids: Vec<&str> = config.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids[7], "URL");
    }

    #[test]
    fn parse_rejects_duplicate_rule_ids() {
        let text = "[RULES]\nURL=a\nURL=b\n";
        let err = Config::parse(text, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("duplicate rule id"));
    }

    #[test]
    fn parse_rule_order_reorders_user_rules() {
        let text = "[RULES]\nA=a\nB=b\n[RULE-ORDER]\nB A\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        let ids: Vec<&str> = config.rules.iter().map(|r| r.id.as_str()).collect();
        let pos_b = ids.iter().position(|&i| i == "B").unwrap();
        let pos_a = ids.iter().position(|&i| i == "A").unwrap();
        assert!(pos_b < pos_a);
    }

    #[test]
    fn parse_eos_markers_uses_unicode_escapes() {
        let text = "[EOSMARKERS]\n\\u0021\n\\u003F\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        assert!(config.eos_markers.contains(&'!'));
        assert!(config.eos_markers.contains(&'?'));
        assert_eq!(config.eos_markers.len(), 2);
    }

    #[test]
    fn parse_filter_deletes_with_empty_dst() {
        let text = "[FILTER]\n\\u00AD \n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        assert_eq!(config.filter.apply("so\u{00AD}ft"), "soft");
    }

    #[test]
    fn parse_quotes_overrides_defaults() {
        let text = "[QUOTES]\n( )\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        assert_eq!(config.quotes.lookup_open('('), Some(")"));
        assert_eq!(config.quotes.lookup_open('"'), None);
    }

    #[test]
    fn blank_and_comment_lines_are_ignored_everywhere() {
        let text = "[RULES]\n# a comment\n\nURL=foo\n";
        let config = Config::parse(text, Path::new(".")).unwrap();
        assert!(config.rules.iter().any(|r| r.id == "URL"));
    }

    #[test]
    fn body_line_outside_any_section_is_a_config_error() {
        let text = "stray line\n";
        let err = Config::parse(text, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("config error"));
    }
}
