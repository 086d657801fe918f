//! Line tokenizer for DAQ configuration files.
//!
//! A line is split into value tokens using these rules:
//!
//! * whitespace outside a quoted span separates tokens and never yields an empty token;
//! * `"` toggles string mode and is never copied into a token;
//! * inside a string, `\"` is a literal quote (no other escape is recognised);
//! * `#` outside a string starts a trailing comment running to the end of the line;
//! * a quote left open at the end of the line is not an error.
//!
//! Quoted and unquoted text with no whitespace between them stick together, so
//! `John" Smith"` is the single token `John Smith`. The same rule turns
//! `5.14"Smith"` into `5.14Smith`, silently merging what may have been meant as
//! two columns; files must separate columns with whitespace.

/// Returns `true` for the characters treated as column separators.
pub(crate) fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

/// Configurable tokenizer. The default keeps trailing comments as a final token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lexer {
    discard_comments: bool,
}

impl Lexer {
    /// Creates a lexer that keeps trailing comments.
    pub const fn new() -> Self {
        Self {
            discard_comments: false,
        }
    }

    /// Sets whether trailing `#` comments are dropped instead of emitted as a token.
    #[must_use]
    pub const fn discard_comments(mut self, discard: bool) -> Self {
        self.discard_comments = discard;
        self
    }

    /// Whether this lexer drops trailing comments.
    pub const fn discards_comments(&self) -> bool {
        self.discard_comments
    }

    /// Splits a single line into tokens.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut chars = line.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if !in_string && is_blank(c) {
                flush(&mut tokens, &mut current);
                continue;
            }
            match c {
                '\\' if in_string && matches!(chars.peek(), Some((_, '"'))) => {
                    chars.next();
                    current.push('"');
                }
                '#' if !in_string => {
                    flush(&mut tokens, &mut current);
                    if !self.discard_comments {
                        tokens.push(line[idx..].to_string());
                    }
                    return tokens;
                }
                '"' => in_string = !in_string,
                _ => current.push(c),
            }
        }
        flush(&mut tokens, &mut current);
        tokens
    }
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Tokenizes `line`, keeping a trailing comment as the last token.
pub fn tokenize_line(line: &str) -> Vec<String> {
    Lexer::new().tokenize(line)
}

/// Tokenizes `line`, dropping any trailing comment.
pub fn tokenize_line_without_comments(line: &str) -> Vec<String> {
    Lexer::new().discard_comments(true).tokenize(line)
}
