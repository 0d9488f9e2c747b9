//! Rule-driven, Unicode-aware sentence and word tokenizer.
//!
//! A [`Tokenizer`] owns a loaded [`Config`], the token buffer, the
//! runtime quote stack, and the paragraph signal that carries across
//! calls. Each public entry point — [`Tokenizer::tokenize_line`],
//! [`Tokenizer::get_sentence`], [`Tokenizer::flush_sentences`],
//! [`Tokenizer::tokenize_stream`] — runs to completion before
//! returning; nothing here is async or re-entrant. Distinct
//! [`Tokenizer`] instances share no state and may run independently in
//! parallel.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod quote;
pub mod regex_matcher;
pub mod rule;
pub mod stream;
pub mod token;

use buffer::TokenBuffer;
use config::Config;
use error::Result;
use quote::QuoteRegistry;
use std::io::BufRead;
use std::path::Path;
use token::Token;

/// Owns everything one tokenization session touches: the loaded
/// configuration, the buffered-but-not-yet-flushed tokens, the runtime
/// quote stack, and whether the next token begins a new paragraph.
#[derive(Debug)]
pub struct Tokenizer {
    config: Config,
    buffer: TokenBuffer,
    quotes: QuoteRegistry,
    paragraph_signal: bool,
    /// Set when an explicit end-of-sentence marker (spec §4.3 point 1)
    /// closed a sentence with nothing after it in that chunk; carried
    /// over to whichever token is emitted next, even across a
    /// `tokenize_line` call boundary, so that token gets
    /// `BEGINOFSENTENCE`.
    pending_explicit_bos: bool,
}

impl Tokenizer {
    /// Builds a tokenizer from an already-loaded configuration. The
    /// configuration's quote pairs are copied into this instance's own
    /// runtime stack; `config` itself is never mutated afterward.
    pub fn new(config: Config) -> Self {
        let quotes = config.quotes.clone();
        Tokenizer {
            config,
            buffer: TokenBuffer::new(),
            quotes,
            paragraph_signal: true,
            pending_explicit_bos: false,
        }
    }

    /// Loads a configuration by name or path (spec §4.7) and builds a
    /// tokenizer from it.
    pub fn from_config_file(name_or_path: &str, default_dir: &Path) -> Result<Self> {
        Ok(Tokenizer::new(Config::load(name_or_path, default_dir)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of tokens currently buffered but not yet flushed out.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Tokenizes one input line, appending to the internal buffer.
    /// Returns the number of tokens appended; `0` for a blank line,
    /// which instead signals a paragraph break and force-marks every
    /// pending sentence complete (it does not itself flush — call
    /// [`Tokenizer::count_sentences`]/[`Tokenizer::flush_sentences`]
    /// afterward to drain them, as [`Tokenizer::tokenize_stream`] does).
    pub fn tokenize_line(&mut self, line: &str) -> Result<usize> {
        engine::line::tokenize_line(
            line,
            &self.config,
            &mut self.buffer,
            &mut self.quotes,
            &mut self.paragraph_signal,
            &mut self.pending_explicit_bos,
        )
    }

    /// Counts complete, quote-level-0 sentences currently buffered.
    /// With `force`, first promotes every unresolved
    /// `TEMPENDOFSENTENCE` and marks a trailing token lacking
    /// `ENDOFSENTENCE`, so nothing buffered is left unaccounted for.
    pub fn count_sentences(&mut self, force: bool) -> usize {
        engine::extractor::count_sentences(&mut self.buffer, force)
    }

    /// Returns the `k`-th (0-indexed) quote-level-0 sentence without
    /// removing it from the buffer.
    pub fn get_sentence(&self, k: usize) -> Result<Vec<Token>> {
        engine::extractor::get_sentence(&self.buffer, k)
    }

    /// Removes and returns the first `n` (1-indexed count) complete
    /// sentences from the buffer, re-indexing the quote stack and
    /// marking the new head `BEGINOFSENTENCE`.
    pub fn flush_sentences(&mut self, n: usize) -> Result<Vec<Token>> {
        engine::extractor::flush_sentences(&mut self.buffer, &mut self.quotes, n)
    }

    /// Consumes `reader` line by line and returns every token of every
    /// sentence completed along the way, including whatever remains
    /// pending at EOF (force-flushed). See [`stream::tokenize_stream`]
    /// for the exact per-line behavior.
    pub fn tokenize_stream<R: BufRead>(&mut self, reader: R, one_sentence_per_line_input: bool) -> Result<Vec<Token>> {
        stream::tokenize_stream(self, reader, one_sentence_per_line_input)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(Config::default())
    }
}
