//! Token representation (spec §3).
//!
//! A token is `(type, text, role)`. `type` is one of the closed built-in
//! kinds, or the id of the rule that matched it. `role` is a bitset of
//! sentence/quote/paragraph/spacing flags, generalized from
//! `tokenizer/token.rs`'s hand-rolled `u16` flag constants into a
//! `bitflags!` set.

use bitflags::bitflags;
use std::fmt;

/// Identifies a configured rule by its declared id.
pub type RuleId = String;

/// The classification of a token: one of the closed built-in kinds, or
/// the id of the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    Word,
    Number,
    Punctuation,
    Currency,
    Unknown,
    Rule(RuleId),
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Word => write!(f, "WORD"),
            TokenType::Number => write!(f, "NUMBER"),
            TokenType::Punctuation => write!(f, "PUNCTUATION"),
            TokenType::Currency => write!(f, "CURRENCY"),
            TokenType::Unknown => write!(f, "UNKNOWN"),
            TokenType::Rule(id) => write!(f, "{id}"),
        }
    }
}

impl TokenType {
    /// The detector (§4.5) tests tokens "whose type starts with
    /// `PUNCTUATION`" — a string-prefix test on the rendered type, not
    /// an enum discriminant check. A rule id of `PUNCTUATION` (the
    /// built-in fallback rule, or a user rule chosen to match it) counts
    /// just as much as the built-in `Punctuation` kind; `PUNCTUATION-EOS`
    /// would too.
    pub fn is_punctuation(&self) -> bool {
        self.to_string().starts_with("PUNCTUATION")
    }
}

bitflags! {
    /// Role bitset (spec §3). `TEMPENDOFSENTENCE` is internal and must
    /// never survive onto a token handed back to a caller (invariant 2,
    /// §8).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Role: u16 {
        const NOSPACE            = 0b0000_0001;
        const BEGINOFSENTENCE     = 0b0000_0010;
        const ENDOFSENTENCE       = 0b0000_0100;
        const TEMPENDOFSENTENCE   = 0b0000_1000;
        const NEWPARAGRAPH        = 0b0001_0000;
        const BEGINQUOTE          = 0b0010_0000;
        const ENDQUOTE            = 0b0100_0000;
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Role::NOSPACE, "NOSPACE"),
            (Role::BEGINOFSENTENCE, "BEGINOFSENTENCE"),
            (Role::ENDOFSENTENCE, "ENDOFSENTENCE"),
            (Role::TEMPENDOFSENTENCE, "TEMPENDOFSENTENCE"),
            (Role::NEWPARAGRAPH, "NEWPARAGRAPH"),
            (Role::BEGINQUOTE, "BEGINQUOTE"),
            (Role::ENDQUOTE, "ENDQUOTE"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", parts.join("|"))
    }
}

/// A single annotated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub typ: TokenType,
    pub text: String,
    pub role: Role,
}

impl Token {
    pub fn new(typ: TokenType, text: impl Into<String>, role: Role) -> Self {
        Token {
            typ,
            text: text.into(),
            role,
        }
    }

    #[inline]
    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    #[inline]
    pub fn has_role(&self, flag: Role) -> bool {
        self.role.contains(flag)
    }

    #[inline]
    pub fn set_role(&mut self, flag: Role, on: bool) {
        self.role.set(flag, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_lists_set_flags_in_order() {
        let role = Role::BEGINOFSENTENCE | Role::NOSPACE;
        assert_eq!(role.to_string(), "NOSPACE|BEGINOFSENTENCE");
    }

    #[test]
    fn role_display_empty_is_empty_string() {
        assert_eq!(Role::empty().to_string(), "");
    }

    #[test]
    fn token_type_display_uses_rule_id_for_rule_matches() {
        let t = TokenType::Rule("ABBREVIATION-KNOWN".to_string());
        assert_eq!(t.to_string(), "ABBREVIATION-KNOWN");
    }

    #[test]
    fn is_punctuation_matches_rule_ids_by_prefix() {
        assert!(TokenType::Punctuation.is_punctuation());
        assert!(TokenType::Rule("PUNCTUATION".to_string()).is_punctuation());
        assert!(!TokenType::Rule("NUMBER".to_string()).is_punctuation());
        assert!(!TokenType::Word.is_punctuation());
    }

    #[test]
    fn set_role_toggles_flag() {
        let mut t = Token::new(TokenType::Word, "hi", Role::empty());
        assert!(!t.has_role(Role::BEGINOFSENTENCE));
        t.set_role(Role::BEGINOFSENTENCE, true);
        assert!(t.has_role(Role::BEGINOFSENTENCE));
        t.set_role(Role::BEGINOFSENTENCE, false);
        assert!(!t.has_role(Role::BEGINOFSENTENCE));
    }
}
