//! Stream processing and textual output (spec §6).
//!
//! Grounded on teacher `example/main.rs`'s line-at-a-time driver loop
//! (minus its CLI argument parsing, which has no spec counterpart).

use crate::error::Result;
use crate::token::{Role, Token};
use crate::Tokenizer;
use std::io::{BufRead, ErrorKind};

/// `tokenizeStream`: consumes `reader` line by line, stripping a
/// trailing `\r` from each line. When `one_sentence_per_line_input` is
/// set, a non-blank line is treated as exactly one sentence by
/// appending the tokenizer's configured explicit end-of-sentence marker
/// before tokenizing it. Blank lines pass through unmodified — the line
/// engine already turns them into a paragraph signal and a force-flush.
/// After every line, whatever sentences are now complete (without
/// forcing) are drained and appended to the result; at EOF, anything
/// still pending is force-flushed.
///
/// Invalid UTF-8 on a single line is a warning (spec §7), not a fatal
/// coding error: `BufRead::lines` reports it as an `io::Error` of kind
/// `InvalidData`, which is logged and the offending line is skipped;
/// processing continues with the next line. Any other I/O error (e.g. a
/// genuine read failure) still aborts the stream.
pub fn tokenize_stream<R: BufRead>(tokenizer: &mut Tokenizer, reader: R, one_sentence_per_line_input: bool) -> Result<Vec<Token>> {
    let mut emitted = Vec::new();

    for line in reader.lines() {
        let mut line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                log::warn!("skipping line with invalid UTF-8: {e}");
                continue;
            }
            Err(e) => return Err(crate::error::TokenizerError::coding(format!("failed to read line from stream: {e}"))),
        };
        if line.ends_with('\r') {
            line.pop();
        }

        if one_sentence_per_line_input && !line.trim().is_empty() {
            line.push(' ');
            line.push_str(&tokenizer.config().explicit_eos_marker);
        }

        tokenizer.tokenize_line(&line)?;

        let available = tokenizer.count_sentences(false);
        if available > 0 {
            emitted.extend(tokenizer.flush_sentences(available)?);
        }
    }

    let remaining = tokenizer.count_sentences(true);
    if remaining > 0 {
        emitted.extend(tokenizer.flush_sentences(remaining)?);
    }

    Ok(emitted)
}

/// How to render a token stream back to text.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// `<text>\t<type>\t<role-flags>` per line instead of reconstructed
    /// running text.
    pub verbose: bool,
    pub lowercase: bool,
    pub uppercase: bool,
    /// Emit a newline at every sentence boundary instead of the
    /// configured end-of-sentence mark.
    pub one_sentence_per_line: bool,
    /// The mark emitted at a non-paragraph-ending sentence boundary
    /// when not in `one_sentence_per_line` mode. Default `<utt>`.
    pub eos_mark: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            verbose: false,
            lowercase: false,
            uppercase: false,
            one_sentence_per_line: false,
            eos_mark: "<utt>".to_string(),
        }
    }
}

/// Renders a completed sentence (or any token slice) back to text.
pub fn format_tokens(tokens: &[Token], opts: &OutputOptions) -> String {
    let mut out = String::new();
    let last_idx = tokens.len().saturating_sub(1);

    for (i, tok) in tokens.iter().enumerate() {
        let text = cased_text(&tok.text, opts);

        if opts.verbose {
            out.push_str(&text);
            out.push('\t');
            out.push_str(&tok.typ.to_string());
            out.push('\t');
            out.push_str(&tok.role.to_string());
            out.push('\n');
            continue;
        }

        out.push_str(&text);

        if !tok.has_role(Role::ENDOFSENTENCE) {
            if !tok.has_role(Role::NOSPACE) && i != last_idx {
                out.push(' ');
            }
            continue;
        }

        let ends_paragraph = i == last_idx || tokens[i + 1].has_role(Role::NEWPARAGRAPH);
        if ends_paragraph {
            out.push_str("\n\n");
        } else if opts.one_sentence_per_line {
            out.push('\n');
        } else {
            out.push(' ');
            out.push_str(&opts.eos_mark);
            out.push(' ');
        }
    }

    out
}

fn cased_text(text: &str, opts: &OutputOptions) -> String {
    if opts.lowercase {
        text.to_lowercase()
    } else if opts.uppercase {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;
    use std::path::Path;

    #[test]
    fn tokenize_stream_emits_completed_sentences_and_strips_cr() {
        let mut tok = Tokenizer::new(Config::parse("", Path::new(".")).unwrap());
        let input = Cursor::new("Hello world.\r\nBye now.\r\n");

        let tokens = tokenize_stream(&mut tok, input, false).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world", ".", "Bye", "now", "."]);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let mut tok = Tokenizer::new(Config::parse("", Path::new(".")).unwrap());
        let mut bytes = b"Hello world.\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe not utf8\n");
        bytes.extend_from_slice(b"Bye now.\n");
        let input = Cursor::new(bytes);

        let tokens = tokenize_stream(&mut tok, input, false).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world", ".", "Bye", "now", "."]);
    }

    #[test]
    fn one_sentence_per_line_mode_appends_explicit_marker() {
        let mut tok = Tokenizer::new(Config::parse("", Path::new(".")).unwrap());
        let input = Cursor::new("one two\nthree four\n");

        let tokens = tokenize_stream(&mut tok, input, true).unwrap();
        assert!(tokens.iter().any(|t| t.has_role(Role::ENDOFSENTENCE) && t.text == "two"));
        assert!(tokens.iter().any(|t| t.has_role(Role::ENDOFSENTENCE) && t.text == "four"));
    }

    #[test]
    fn format_tokens_respects_nospace_and_verbose_mode() {
        let mut tok = Tokenizer::new(Config::parse("", Path::new(".")).unwrap());
        let input = Cursor::new("Hello world.\n");
        let tokens = tokenize_stream(&mut tok, input, false).unwrap();

        let plain = format_tokens(&tokens, &OutputOptions::default());
        assert!(plain.starts_with("Hello world."));

        let verbose_opts = OutputOptions {
            verbose: true,
            ..OutputOptions::default()
        };
        let verbose = format_tokens(&tokens, &verbose_opts);
        assert!(verbose.contains("Hello\tWORD\t"));
    }
}
