//! Sentence- and quote-bound detector (spec §4.5).
//!
//! A single forward pass over a newly-appended region of the buffer.
//! No pack example implements anything resembling this state machine;
//! grounded directly on `examples/original_source/src/tokenize.cxx`'s
//! `detectSentenceBounds`/`resolveQuote` (ucto), re-expressed with plain
//! local variables in place of the original's member counters.

use crate::buffer::TokenBuffer;
use crate::engine::word::is_punctuation_category;
use crate::quote::QuoteRegistry;
use crate::token::Role;
use std::collections::HashSet;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Runs the detector over buffer indices `[start, buffer.len())`.
///
/// `quote_level` is read fresh at each punctuation token as
/// `quotes.stack_len()` *before* that token's own quote action is
/// applied — the stack only grows and shrinks through quote actions
/// gated on `detect_quotes`, so `quote_level` is always `0` when quote
/// detection is disabled, matching spec §4.5's implicit assumption.
/// Crossing a `NEWPARAGRAPH` token clears the stack ("reset to 0").
pub fn detect_bounds(
    buffer: &mut TokenBuffer,
    quotes: &mut QuoteRegistry,
    eos_markers: &HashSet<char>,
    start: usize,
    detect_sentences: bool,
    detect_quotes: bool,
) {
    let mut i = start;
    while i < buffer.len() {
        let is_new_paragraph = buffer.get(i).map(|t| t.has_role(Role::NEWPARAGRAPH)).unwrap_or(false);
        if is_new_paragraph {
            quotes.clear_stack();
        }

        let is_punct = buffer.get(i).map(|t| t.typ.is_punctuation()).unwrap_or(false);
        if is_punct {
            if detect_sentences {
                run_eos_test(buffer, quotes, eos_markers, i);
            }
            if detect_quotes {
                run_quote_step(buffer, quotes, i);
            }
        }

        i += 1;
    }
}

fn run_eos_test(buffer: &mut TokenBuffer, quotes: &QuoteRegistry, eos_markers: &HashSet<char>, i: usize) {
    let c0 = match buffer.get(i).and_then(|t| t.first_char()) {
        Some(c) => c,
        None => return,
    };
    let last_idx = buffer.len() - 1;

    let mut is_eos = false;
    if c0 == '.' {
        is_eos = if i == last_idx {
            true
        } else {
            match buffer.get(i + 1).and_then(|t| t.first_char()) {
                Some(next_c) if case_distinguishing_block(next_c) => is_upper_title_or_punct(next_c),
                Some(_) => true,
                None => true,
            }
        };
    }
    if eos_markers.contains(&c0) {
        is_eos = true;
    }

    if !is_eos {
        return;
    }

    if quotes.stack_len() > 0 {
        set_role(buffer, i, Role::TEMPENDOFSENTENCE, true);
        if i > 0 && has_role(buffer, i - 1, Role::TEMPENDOFSENTENCE) {
            set_role(buffer, i - 1, Role::TEMPENDOFSENTENCE, false);
        }
        return;
    }

    set_role(buffer, i, Role::ENDOFSENTENCE, true);
    if i + 1 < buffer.len() && !has_role(buffer, i + 1, Role::BEGINOFSENTENCE) {
        set_role(buffer, i + 1, Role::BEGINOFSENTENCE, true);
    }
    if i > 0 && has_role(buffer, i - 1, Role::ENDOFSENTENCE) && !has_role(buffer, i - 1, Role::BEGINOFSENTENCE) {
        set_role(buffer, i - 1, Role::ENDOFSENTENCE, false);
        set_role(buffer, i, Role::BEGINOFSENTENCE, false);
    }
}

fn run_quote_step(buffer: &mut TokenBuffer, quotes: &mut QuoteRegistry, i: usize) {
    let c = match buffer.get(i).and_then(|t| t.first_char()) {
        Some(c) => c,
        None => return,
    };

    if is_ascii_or_fullwidth_quote(c) {
        let open_alts = c.to_string();
        if !resolve_quote(buffer, quotes, i, &open_alts) {
            quotes.push(i, c);
        }
        return;
    }

    if quotes.lookup_open(c).is_some() {
        quotes.push(i, c);
        return;
    }

    if let Some(open_alts) = quotes.lookup_close(c).map(|s| s.to_string()) {
        resolve_quote(buffer, quotes, i, &open_alts);
    }
}

/// Searches the stack for the most recent open matching `open_alts`;
/// on success marks `BEGINQUOTE`/`ENDQUOTE` and pops the entry, on
/// failure to balance leaves the stack entry popped but unmarked.
/// Returns whether a matching open was found at all (spec: "On
/// failure, push" only applies when no matching open exists).
fn resolve_quote(buffer: &mut TokenBuffer, quotes: &mut QuoteRegistry, end_idx: usize, open_alts: &str) -> bool {
    let mut stack_pos = None;
    let begin_idx = match quotes.lookup(open_alts, &mut stack_pos) {
        Some(idx) => idx,
        None => return false,
    };
    let stack_pos = stack_pos.expect("lookup returned Some index implies Some stack position");

    let mut sub: i64 = 0;
    let mut exp: i64 = 0;
    let mut cur_begin = begin_idx + 1;

    for j in (begin_idx + 1)..end_idx {
        let (has_beginquote, has_endquote, has_bos, has_eos, has_tempeos) = {
            let t = buffer.get(j).expect("j < end_idx <= buffer.len()");
            (
                t.has_role(Role::BEGINQUOTE),
                t.has_role(Role::ENDQUOTE),
                t.has_role(Role::BEGINOFSENTENCE),
                t.has_role(Role::ENDOFSENTENCE),
                t.has_role(Role::TEMPENDOFSENTENCE),
            )
        };

        if has_beginquote {
            sub += 1;
        }

        if sub == 0 {
            if has_bos {
                exp += 1;
            }
            if has_eos {
                exp -= 1;
            }
            if has_tempeos {
                set_role(buffer, j, Role::TEMPENDOFSENTENCE, false);
                set_role(buffer, j, Role::ENDOFSENTENCE, true);
                set_role(buffer, cur_begin, Role::BEGINOFSENTENCE, true);
                cur_begin = j + 1;
            }
        } else if has_endquote && has_eos {
            set_role(buffer, cur_begin, Role::BEGINOFSENTENCE, true);
            cur_begin = j + 1;
        }

        if has_endquote {
            sub -= 1;
        }
    }

    let balanced = exp == 0 && sub == 0;
    let rescuable = exp == 1 && sub == 0;

    if balanced || rescuable {
        if rescuable && end_idx > 0 && !has_role(buffer, end_idx - 1, Role::ENDOFSENTENCE) {
            set_role(buffer, end_idx - 1, Role::ENDOFSENTENCE, true);
        }
        set_role(buffer, begin_idx, Role::BEGINQUOTE, true);
        set_role(buffer, end_idx, Role::ENDQUOTE, true);
        propagate_endofsentence_after_endquote(buffer, quotes, end_idx);
        quotes.erase_at(stack_pos);
        true
    } else {
        quotes.erase_at(stack_pos);
        false
    }
}

fn propagate_endofsentence_after_endquote(buffer: &mut TokenBuffer, quotes: &QuoteRegistry, end_idx: usize) {
    if end_idx == 0 || !has_role(buffer, end_idx - 1, Role::ENDOFSENTENCE) {
        return;
    }

    let last_idx = buffer.len() - 1;
    let is_last = end_idx == last_idx;

    let next_char = buffer.get(end_idx + 1).and_then(|t| t.first_char());
    let after_next_char = buffer.get(end_idx + 2).and_then(|t| t.first_char());

    let next_starts_sentence = next_char.map(is_bos_char).unwrap_or(false);
    let next_is_quote = next_char.map(|c| quotes.is_quote(c)).unwrap_or(false);
    let after_starts_sentence = after_next_char.map(is_bos_char).unwrap_or(false);
    let next_is_last = end_idx + 1 == last_idx;

    let should_propagate = is_last
        || next_starts_sentence
        || (next_is_quote && after_starts_sentence)
        || (next_is_quote && next_is_last);

    if should_propagate {
        set_role(buffer, end_idx, Role::ENDOFSENTENCE, true);
    }
}

fn case_distinguishing_block(c: char) -> bool {
    matches!(c as u32,
        0x0000..=0x007F    // Basic Latin
        | 0x0370..=0x03FF  // Greek and Coptic
        | 0x0400..=0x04FF  // Cyrillic
        | 0x0530..=0x058F  // Armenian
        | 0x10A0..=0x10FF  // Georgian
        | 0x10400..=0x1044F // Deseret
    )
}

fn is_upper_title_or_punct(c: char) -> bool {
    c.is_uppercase() || get_general_category(c) == GeneralCategory::TitlecaseLetter || is_punctuation_category(c)
}

/// Per spec §4.5 point (b): a case-distinguishing block character that
/// is itself uppercase or title-case — narrower than the EOS test's
/// own "uppercase, title-case, or punctuation", since punctuation after
/// a closing quote doesn't by itself start a new sentence.
fn is_bos_char(c: char) -> bool {
    case_distinguishing_block(c) && (c.is_uppercase() || get_general_category(c) == GeneralCategory::TitlecaseLetter)
}

fn is_ascii_or_fullwidth_quote(c: char) -> bool {
    c == '\'' || c == '"' || c == '\u{FF02}'
}

fn has_role(buffer: &TokenBuffer, idx: usize, flag: Role) -> bool {
    buffer.get(idx).map(|t| t.has_role(flag)).unwrap_or(false)
}

fn set_role(buffer: &mut TokenBuffer, idx: usize, flag: Role, on: bool) {
    if let Some(t) = buffer.get_mut(idx) {
        t.set_role(flag, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};

    fn word(text: &str) -> Token {
        Token::new(TokenType::Word, text, Role::empty())
    }

    fn punct(text: &str) -> Token {
        Token::new(TokenType::Punctuation, text, Role::empty())
    }

    fn markers() -> HashSet<char> {
        "!?".chars().collect()
    }

    #[test]
    fn period_before_uppercase_is_eos_and_marks_next_bos() {
        let mut buf = TokenBuffer::new();
        buf.push(word("Hello"));
        buf.push(punct("."));
        buf.push(word("World"));
        let mut quotes = QuoteRegistry::new();

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(buf.get(1).unwrap().has_role(Role::ENDOFSENTENCE));
        assert!(buf.get(2).unwrap().has_role(Role::BEGINOFSENTENCE));
    }

    #[test]
    fn period_before_lowercase_in_case_distinguishing_block_is_not_eos() {
        let mut buf = TokenBuffer::new();
        buf.push(word("Mr"));
        buf.push(punct("."));
        buf.push(word("smith"));
        let mut quotes = QuoteRegistry::new();

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(!buf.get(1).unwrap().has_role(Role::ENDOFSENTENCE));
        assert!(!buf.get(2).unwrap().has_role(Role::BEGINOFSENTENCE));
    }

    #[test]
    fn period_as_last_token_is_eos() {
        let mut buf = TokenBuffer::new();
        buf.push(word("Done"));
        buf.push(punct("."));
        let mut quotes = QuoteRegistry::new();

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(buf.get(1).unwrap().has_role(Role::ENDOFSENTENCE));
    }

    #[test]
    fn consecutive_eos_markers_collapse_to_the_rightmost() {
        let mut buf = TokenBuffer::new();
        buf.push(word("Hi"));
        buf.push(punct("!"));
        buf.push(punct("!"));
        buf.push(word("Bye"));
        let mut quotes = QuoteRegistry::new();

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(!buf.get(1).unwrap().has_role(Role::ENDOFSENTENCE));
        assert!(buf.get(2).unwrap().has_role(Role::ENDOFSENTENCE));
        assert!(!buf.get(2).unwrap().has_role(Role::BEGINOFSENTENCE));
        assert!(buf.get(3).unwrap().has_role(Role::BEGINOFSENTENCE));
    }

    #[test]
    fn balanced_quote_marks_begin_and_end_quote() {
        let mut buf = TokenBuffer::new();
        buf.push(word("She"));
        buf.push(word("said"));
        buf.push(punct("\""));
        buf.push(word("Hi"));
        buf.push(punct("\""));
        let mut quotes = QuoteRegistry::new();
        quotes.add("\"", "\"");

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(buf.get(2).unwrap().has_role(Role::BEGINQUOTE));
        assert!(buf.get(4).unwrap().has_role(Role::ENDQUOTE));
        assert_eq!(quotes.stack_len(), 0);
    }

    #[test]
    fn eos_inside_open_quote_sets_tempendofsentence_not_endofsentence() {
        let mut buf = TokenBuffer::new();
        buf.push(punct("\""));
        buf.push(word("Hi"));
        buf.push(punct("!"));
        let mut quotes = QuoteRegistry::new();
        quotes.add("\"", "\"");
        quotes.push(0, '"'); // simulate an already-open quote from a prior pass

        detect_bounds(&mut buf, &mut quotes, &markers(), 1, true, true);

        assert!(buf.get(2).unwrap().has_role(Role::TEMPENDOFSENTENCE));
        assert!(!buf.get(2).unwrap().has_role(Role::ENDOFSENTENCE));
    }

    /// A closing quote's `ENDOFSENTENCE` propagation (spec §4.5 condition
    /// c) must recognize the *next* sentence's opening quote even when
    /// it isn't ASCII/full-width — e.g. a curly single quote opening the
    /// next quoted sentence right after a curly double quote closes this
    /// one. `u_isquote` in the ground-truth source (`tokenize.cxx`)
    /// checks the configured quote registry, not just ASCII/full-width;
    /// `quotes.is_quote` must be consulted here too, or two sentences
    /// like this silently merge into one.
    #[test]
    fn endquote_propagation_recognizes_a_configured_non_ascii_quote_as_the_next_opener() {
        let mut buf = TokenBuffer::new();
        buf.push(word("She"));
        buf.push(word("said"));
        buf.push(punct("\u{201C}")); // opening curly double quote
        buf.push(word("Hi"));
        buf.push(punct(".")); // end of sentence, still inside the quote
        buf.push(punct("\u{201D}")); // closing curly double quote
        buf.push(punct("\u{2018}")); // opening curly single quote (next sentence)
        buf.push(word("Next"));
        buf.push(punct("."));
        buf.push(punct("\u{2019}")); // closing curly single quote

        let mut quotes = QuoteRegistry::new();
        quotes.add("\u{201C}\u{201E}\u{201F}", "\u{201D}");
        quotes.add("\u{2018}", "\u{2019}");

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        assert!(buf.get(5).unwrap().has_role(Role::ENDQUOTE));
        assert!(
            buf.get(5).unwrap().has_role(Role::ENDOFSENTENCE),
            "closing quote should inherit ENDOFSENTENCE: followed by a configured \
             (non-ASCII) opening quote whose own next token starts a sentence"
        );
        assert!(buf.get(6).unwrap().has_role(Role::BEGINQUOTE));
    }

    #[test]
    fn new_paragraph_token_clears_the_quote_stack() {
        let mut buf = TokenBuffer::new();
        let mut start = word("Para");
        start.set_role(Role::NEWPARAGRAPH, true);
        buf.push(start);
        buf.push(punct("\""));
        let mut quotes = QuoteRegistry::new();
        quotes.add("\"", "\"");
        quotes.push(5, '"'); // stale entry from the previous paragraph

        detect_bounds(&mut buf, &mut quotes, &markers(), 0, true, true);

        // the stale entry is gone; the fresh quote char at index 1 was
        // pushed as a new, unresolved open
        assert_eq!(quotes.stack_len(), 1);
        assert_eq!(quotes.stack_top(), Some((1, '"')));
    }
}
