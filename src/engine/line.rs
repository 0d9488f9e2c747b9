//! Line engine (spec §4.3): normalize + filter, whitespace-delimited
//! word splitting, explicit end-of-sentence marker handling, and
//! paragraph-break signalling. Ties `normalize.rs`, `engine::word`, and
//! `engine::detector` together into the one entry point a caller
//! actually drives a line through.

use crate::buffer::TokenBuffer;
use crate::config::Config;
use crate::engine::{detector, extractor, word};
use crate::error::Result;
use crate::normalize::normalize_and_filter;
use crate::quote::QuoteRegistry;
use crate::token::Role;

/// Tokenizes one input line, appending tokens to `buffer`. Returns the
/// number of tokens appended (`0` for a blank line).
///
/// A blank line signals a paragraph break and force-*marks* every
/// pending sentence complete (promoting unresolved `TEMPENDOFSENTENCE`s
/// and marking a trailing token without `ENDOFSENTENCE`), but it does
/// not itself remove anything from `buffer`. Actual removal stays the
/// extractor's caller-driven `flush_sentences` (spec §4.6: "when the
/// caller requests, the extractor reads completed sentences out and
/// flushes them") — if this function flushed and discarded the tokens
/// itself, a completed-right-at-a-paragraph-break sentence would vanish
/// before any caller (`Tokenizer::tokenize_stream` included) ever sees
/// it. Callers that want the blank line to drain the buffer immediately
/// call `count_sentences`/`flush_sentences` themselves right after.
pub fn tokenize_line(
    raw_line: &str,
    config: &Config,
    buffer: &mut TokenBuffer,
    quotes: &mut QuoteRegistry,
    paragraph_signal: &mut bool,
    pending_explicit_bos: &mut bool,
) -> Result<usize> {
    if raw_line.trim().is_empty() {
        *paragraph_signal = true;
        extractor::count_sentences(buffer, true);
        return Ok(0);
    }

    let normalized = normalize_and_filter(raw_line, config.normalization_form, &config.filter);
    let begin_count = buffer.len();

    let chars: Vec<char> = normalized.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut current_word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            if !current_word.is_empty() {
                process_word(&current_word, true, config, buffer, pending_explicit_bos);
                current_word.clear();
            }
        } else {
            current_word.push(c);
            if i == last {
                process_word(&current_word, false, config, buffer, pending_explicit_bos);
                current_word.clear();
            }
        }
    }

    let appended = buffer.len() - begin_count;

    if appended > 0 {
        if *paragraph_signal {
            if let Some(t) = buffer.get_mut(begin_count) {
                t.set_role(Role::NEWPARAGRAPH, true);
                t.set_role(Role::BEGINOFSENTENCE, true);
            }
            *paragraph_signal = false;
            *pending_explicit_bos = false;
        }

        detector::detect_bounds(
            buffer,
            quotes,
            &config.eos_markers,
            begin_count,
            config.detect_sentences,
            config.detect_quotes,
        );
    }

    Ok(appended)
}

/// Handles one whitespace-delimited chunk: the explicit end-of-sentence
/// marker (spec §4.3 point 1) takes priority over ordinary dispatch.
/// The marker's prefix/suffix recurse with hardcoded `false`/`true`
/// trailing-space hints rather than this chunk's real boundary — see
/// DESIGN.md's open-question resolution 5, grounded on
/// `examples/original_source/src/tokenize.cxx`'s own
/// `tokenizeWord(prefix, false)` / `tokenizeWord(suffix, true)` calls.
///
/// The marker ends the sentence at the prefix's last token (not
/// whatever happens to be `buffer`'s last token once the suffix is also
/// pushed) and opens a new one at the suffix's first token. When the
/// suffix is empty — the marker sat at the end of this chunk, e.g. a
/// trailing `<utt>` with nothing after it — there is no token yet to
/// carry the new sentence's `BEGINOFSENTENCE`; `pending_explicit_bos`
/// remembers the obligation across chunks, and across `tokenize_line`
/// calls, until the next token emitted (in this line or a later one)
/// claims it.
fn process_word(chunk: &str, trailing_space: bool, config: &Config, buffer: &mut TokenBuffer, pending_explicit_bos: &mut bool) {
    if let Some(pos) = chunk.rfind(config.explicit_eos_marker.as_str()) {
        let marker_len = config.explicit_eos_marker.len();
        let prefix = &chunk[..pos];
        let suffix = &chunk[pos + marker_len..];

        if !prefix.is_empty() {
            let prefix_begin = buffer.len();
            for t in word::tokenize_word(prefix, false, &config.rules) {
                buffer.push(t);
            }
            claim_pending_bos(buffer, prefix_begin, pending_explicit_bos);
        }

        if buffer.is_empty() {
            log::warn!("explicit end-of-sentence marker found with no preceding token to mark");
        } else {
            let last = buffer.len() - 1;
            if let Some(t) = buffer.get_mut(last) {
                t.set_role(Role::ENDOFSENTENCE, true);
            }
        }

        if !suffix.is_empty() {
            let suffix_begin = buffer.len();
            for t in word::tokenize_word(suffix, true, &config.rules) {
                buffer.push(t);
            }
            if let Some(t) = buffer.get_mut(suffix_begin) {
                t.set_role(Role::BEGINOFSENTENCE, true);
            }
            *pending_explicit_bos = false;
        } else {
            *pending_explicit_bos = true;
        }
        return;
    }

    let begin = buffer.len();
    for t in word::tokenize_word(chunk, trailing_space, &config.rules) {
        buffer.push(t);
    }
    claim_pending_bos(buffer, begin, pending_explicit_bos);
}

fn claim_pending_bos(buffer: &mut TokenBuffer, begin: usize, pending_explicit_bos: &mut bool) {
    if *pending_explicit_bos && buffer.len() > begin {
        if let Some(t) = buffer.get_mut(begin) {
            t.set_role(Role::BEGINOFSENTENCE, true);
        }
        *pending_explicit_bos = false;
    }
}
