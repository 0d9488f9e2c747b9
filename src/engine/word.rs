//! Recursive word-rule dispatch (spec §4.4), implemented with an
//! explicit worklist rather than literal function recursion — spec §9
//! notes these are equivalent and the worklist form avoids unbounded
//! call depth on pathological input. Architecturally grounded on
//! `sairupesh36-my-spacy-tokenizer-rs`'s prefix/suffix/infix splitting
//! loop, the closest pack match for this prefix/match/suffix shape.

use crate::rule::RuleSet;
use crate::token::{Role, Token, TokenType};
use unicode_general_category::{get_general_category, GeneralCategory};

enum WordTask {
    Tokenize {
        text: String,
        trailing_space: bool,
    },
    EmitCaptures {
        rule_id: String,
        captures: Vec<String>,
        suffix_nonempty: bool,
        trailing_space: bool,
    },
}

/// Tokenizes a single whitespace-delimited word, descending into rules
/// as needed. `trailing_space` says whether a space follows this word
/// in the original input (the outermost call from the line engine).
pub fn tokenize_word(word: &str, trailing_space: bool, rules: &RuleSet) -> Vec<Token> {
    let mut output = Vec::new();
    let mut stack = vec![WordTask::Tokenize {
        text: word.to_string(),
        trailing_space,
    }];

    while let Some(task) = stack.pop() {
        match task {
            WordTask::Tokenize {
                text,
                trailing_space,
            } => tokenize_one(&text, trailing_space, rules, &mut stack, &mut output),
            WordTask::EmitCaptures {
                rule_id,
                captures,
                suffix_nonempty,
                trailing_space,
            } => emit_captures(rule_id, captures, suffix_nonempty, trailing_space, &mut output),
        }
    }

    output
}

fn tokenize_one(
    text: &str,
    trailing_space: bool,
    rules: &RuleSet,
    stack: &mut Vec<WordTask>,
    output: &mut Vec<Token>,
) {
    if text.is_empty() {
        return;
    }

    if text.chars().count() == 1 {
        if let Some(tok) = classify_single_char(text, trailing_space) {
            output.push(tok);
        }
        return;
    }

    if !has_punctuation_or_digit(text) {
        output.push(Token::new(TokenType::Word, text, role_for(trailing_space)));
        return;
    }

    match rules.first_match(text) {
        Some((rule, m)) => {
            let suffix_nonempty = !m.suffix.is_empty();

            if suffix_nonempty {
                stack.push(WordTask::Tokenize {
                    text: m.suffix,
                    trailing_space,
                });
            }

            stack.push(WordTask::EmitCaptures {
                rule_id: rule.id.clone(),
                captures: m.captures,
                suffix_nonempty,
                trailing_space,
            });

            if !m.prefix.is_empty() {
                stack.push(WordTask::Tokenize {
                    text: m.prefix,
                    trailing_space: false,
                });
            }
        }
        None => {
            output.push(Token::new(TokenType::Word, text, role_for(trailing_space)));
        }
    }
}

fn emit_captures(
    rule_id: String,
    captures: Vec<String>,
    suffix_nonempty: bool,
    trailing_space: bool,
    output: &mut Vec<Token>,
) {
    let last = captures.len().saturating_sub(1);

    for (i, capture) in captures.into_iter().enumerate() {
        let nospace = suffix_nonempty || i != last || !trailing_space;
        let role = if nospace { Role::NOSPACE } else { Role::empty() };
        output.push(Token::new(TokenType::Rule(rule_id.clone()), capture, role));
    }
}

fn role_for(trailing_space: bool) -> Role {
    if trailing_space {
        Role::empty()
    } else {
        Role::NOSPACE
    }
}

/// §4.3 point 2: a word that is a single code point, or has no
/// punctuation and no digits, is pushed as `WORD` without descending
/// into rules.
fn has_punctuation_or_digit(text: &str) -> bool {
    text.chars().any(|c| is_digit(c) || is_punctuation_category(c))
}

fn classify_single_char(text: &str, trailing_space: bool) -> Option<Token> {
    let c = text.chars().next()?;
    let role = role_for(trailing_space);

    if is_currency(c) {
        Some(Token::new(TokenType::Currency, text, role))
    } else if is_punctuation_category(c) {
        Some(Token::new(TokenType::Punctuation, text, role))
    } else if c.is_alphabetic() {
        Some(Token::new(TokenType::Word, text, role))
    } else if is_digit(c) {
        Some(Token::new(TokenType::Number, text, role))
    } else if c.is_whitespace() {
        None
    } else {
        Some(Token::new(TokenType::Unknown, text, role))
    }
}

pub(crate) fn is_currency(c: char) -> bool {
    get_general_category(c) == GeneralCategory::CurrencySymbol
}

pub(crate) fn is_digit(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::DecimalNumber | GeneralCategory::LetterNumber | GeneralCategory::OtherNumber
    )
}

pub(crate) fn is_punctuation_category(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
    )
}
