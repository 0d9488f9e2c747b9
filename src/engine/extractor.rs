//! Sentence extractor (spec §4.6): `countSentences`, `getSentence`,
//! `flushSentences`. All three operate purely on buffer role flags —
//! "quote-level 0" is recomputed by walking `BEGINQUOTE`/`ENDQUOTE`
//! balance rather than kept as separate running state, since the
//! buffer is the only thing these functions are handed.

use crate::buffer::TokenBuffer;
use crate::error::{Result, TokenizerError};
use crate::quote::QuoteRegistry;
use crate::token::{Role, Token};

/// Counts buffered quote-level-0 `ENDOFSENTENCE` markers. With `force`,
/// first promotes every still-unresolved `TEMPENDOFSENTENCE` to a real
/// `ENDOFSENTENCE` (marking `BEGINOFSENTENCE` on the sentence it closes),
/// then counts, then — if the last buffered token still lacks
/// `ENDOFSENTENCE` — marks it too, so every buffered token ends up
/// inside exactly one sentence.
pub fn count_sentences(buffer: &mut TokenBuffer, force: bool) -> usize {
    if force {
        promote_unpaired_tempeos(buffer);
    }

    let mut count = count_quote_level_0_eos(buffer);

    if force && !buffer.is_empty() {
        let last = buffer.len() - 1;
        if !has_role(buffer, last, Role::ENDOFSENTENCE) {
            set_role(buffer, last, Role::ENDOFSENTENCE, true);
            count += 1;
        }
    }

    count
}

/// Returns the tokens of the `k`-th (0-indexed) quote-level-0 sentence,
/// from its `BEGINOFSENTENCE` through its matching `ENDOFSENTENCE`
/// inclusive.
pub fn get_sentence(buffer: &TokenBuffer, k: usize) -> Result<Vec<Token>> {
    let (begins, ends) = quote_level_0_bounds(buffer);

    let begin_idx = *begins
        .get(k)
        .ok_or_else(|| TokenizerError::range(format!("sentence index {k} is out of range ({} available)", begins.len())))?;
    let end_idx = *ends
        .iter()
        .find(|&&e| e >= begin_idx)
        .ok_or_else(|| TokenizerError::logic("sentence has no matching end-of-sentence marker"))?;

    Ok(buffer.range(begin_idx, end_idx + 1).cloned().collect())
}

/// Removes all tokens up to and including the `n`-th (1-indexed)
/// quote-level-0 `ENDOFSENTENCE`, marks the new head `BEGINOFSENTENCE`,
/// and re-indexes the quote stack to match.
pub fn flush_sentences(buffer: &mut TokenBuffer, quotes: &mut QuoteRegistry, n: usize) -> Result<Vec<Token>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let (_, ends) = quote_level_0_bounds(buffer);
    let cut = *ends
        .get(n - 1)
        .ok_or_else(|| TokenizerError::range(format!("cannot flush {n} sentences, only {} available", ends.len())))?;

    let drained = buffer.drain_front(cut + 1);
    quotes.flush_stack(cut + 1);
    buffer.mark_head_as_sentence_start();

    Ok(drained)
}

fn quote_level_0_bounds(buffer: &TokenBuffer) -> (Vec<usize>, Vec<usize>) {
    let mut depth: i64 = 0;
    let mut begins = Vec::new();
    let mut ends = Vec::new();

    for i in 0..buffer.len() {
        let t = buffer.get(i).expect("i < buffer.len()");
        if depth == 0 && t.has_role(Role::BEGINOFSENTENCE) {
            begins.push(i);
        }
        if depth == 0 && t.has_role(Role::ENDOFSENTENCE) {
            ends.push(i);
        }
        if t.has_role(Role::BEGINQUOTE) {
            depth += 1;
        }
        if t.has_role(Role::ENDQUOTE) {
            depth -= 1;
        }
    }

    (begins, ends)
}

fn count_quote_level_0_eos(buffer: &TokenBuffer) -> usize {
    quote_level_0_bounds(buffer).1.len()
}

/// Walks the buffer left to right, tracking the current open
/// sub-sentence's start (`cur_begin`). Any `TEMPENDOFSENTENCE` still
/// standing at force-flush time never got resolved by a later quote
/// close, so it is promoted in place: the same promotion the detector
/// (§4.5) performs inside `resolveQuote`, applied across the whole
/// buffer rather than one quote span.
fn promote_unpaired_tempeos(buffer: &mut TokenBuffer) {
    let mut cur_begin = 0usize;

    for i in 0..buffer.len() {
        let has_tempeos = has_role(buffer, i, Role::TEMPENDOFSENTENCE);
        let has_eos = has_role(buffer, i, Role::ENDOFSENTENCE);

        if has_tempeos {
            set_role(buffer, i, Role::TEMPENDOFSENTENCE, false);
            set_role(buffer, i, Role::ENDOFSENTENCE, true);
            set_role(buffer, cur_begin, Role::BEGINOFSENTENCE, true);
            cur_begin = i + 1;
        } else if has_eos {
            cur_begin = i + 1;
        }
    }
}

fn has_role(buffer: &TokenBuffer, idx: usize, flag: Role) -> bool {
    buffer.get(idx).map(|t| t.has_role(flag)).unwrap_or(false)
}

fn set_role(buffer: &mut TokenBuffer, idx: usize, flag: Role, on: bool) {
    if let Some(t) = buffer.get_mut(idx) {
        t.set_role(flag, on);
    }
}
