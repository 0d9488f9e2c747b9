//! Named classification rules and their ordering (spec §3, §4.4).
//!
//! Modeled on `sairupesh36-my-spacy-tokenizer-rs`'s `TokenizerRules`
//! (an ordered `Vec<Regex>` tried in turn until one matches), but
//! carrying a stable `id` per rule so the token's `type` can record
//! which rule won, and so `[RULE-ORDER]` can reorder by name.

use crate::regex_matcher::{MatchResult, RegexMatcher};
use crate::token::RuleId;

/// A single named rule: an id plus its compiled pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub matcher: RegexMatcher,
}

impl Rule {
    pub fn new(id: impl Into<String>, matcher: RegexMatcher) -> Self {
        Rule {
            id: id.into(),
            matcher,
        }
    }
}

/// An ordered collection of rules. The first rule (by configured order)
/// whose pattern matches anywhere in the input wins for a given word.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Returns the first rule (in order) that matches `word`, along with
    /// its match decomposition. There is no scoring or longest-match
    /// arbitration beyond rule order (spec §4.4).
    pub fn first_match(&self, word: &str) -> Option<(&Rule, MatchResult)> {
        for rule in &self.rules {
            if let Some(m) = rule.matcher.match_all(word) {
                return Some((rule, m));
            }
        }
        None
    }

    /// Reorders the rule list according to `order`, an explicit id
    /// sequence from `[RULE-ORDER]`. Any rule whose id is not listed in
    /// `order` is appended afterwards in its original declared order,
    /// with a diagnostic logged (spec §4.3: "a rule-order directive may
    /// reorder the entire list by id; any user rule whose id is not
    /// listed is appended ... with a diagnostic log entry"). Ids in
    /// `order` that don't correspond to any declared rule are a warning
    /// (spec §7), not an error, and are simply skipped.
    pub fn reorder(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.rules);
        let mut reordered = Vec::with_capacity(remaining.len());

        for id in order {
            if let Some(pos) = remaining.iter().position(|r| &r.id == id) {
                reordered.push(remaining.remove(pos));
            } else {
                log::warn!("rule-order references unknown rule id `{id}`");
            }
        }

        if !remaining.is_empty() {
            for rule in &remaining {
                log::debug!(
                    "rule `{}` not named in [RULE-ORDER]; appending in declared order",
                    rule.id
                );
            }
            reordered.append(&mut remaining);
        }

        self.rules = reordered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, pattern: &str) -> Rule {
        Rule::new(id, RegexMatcher::compile(pattern).unwrap())
    }

    #[test]
    fn first_match_wins_by_order_not_by_length() {
        let mut rules = RuleSet::new();
        rules.push(rule("SHORT", r"\d"));
        rules.push(rule("LONG", r"\d+"));

        let (winner, m) = rules.first_match("123").unwrap();
        assert_eq!(winner.id, "SHORT");
        assert_eq!(m.captures, vec!["1".to_string()]);
    }

    #[test]
    fn reorder_moves_named_rules_to_the_front_in_requested_order() {
        let mut rules = RuleSet::new();
        rules.push(rule("A", r"a"));
        rules.push(rule("B", r"b"));
        rules.push(rule("C", r"c"));

        rules.reorder(&["C".to_string(), "A".to_string()]);

        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn reorder_with_unknown_id_is_ignored_not_fatal() {
        let mut rules = RuleSet::new();
        rules.push(rule("A", r"a"));

        rules.reorder(&["NOPE".to_string(), "A".to_string()]);

        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);
    }
}
