//! A module implementing lexical analysis (tokenization) for the shell's command lines.

use thiserror::Error;

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word with its quotes already removed.
    Word(String),
    /// The sequential operator, `;`.
    Semicolon,
    /// The AND operator, `&&`.
    AndIf,
    /// The OR operator, `||`.
    OrIf,
}

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("Unterminated quoted string")]
    UnfinishedQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    /// Creates a new instance of the lexical analysis Finite State Machine.
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Performs lexical analysis on the input string and returns a vector of tokens.
    ///
    /// Whitespace separates words, `;`, `&&` and `||` separate commands, and a `#` at the
    /// start of a word discards the rest of the line. Quotes group text into the current
    /// word and are removed; there are no escapes and no nesting.
    fn make_tokens(&mut self) -> Result<Vec<Token>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => {
                    if ch == '#' {
                        break;
                    }
                    self.handle_start(ch, &mut out);
                }
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_quote(ch, '\''),
                LexingState::ReadingDoubleQuote => self.handle_quote(ch, '"'),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::ReadingWord => self.finish_word(&mut out),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Emits an operator token for `ch` if it starts one, consuming the second
    /// character of `&&`/`||`.
    fn try_operator(&mut self, ch: char) -> Option<Token> {
        match ch {
            ';' => Some(Token::Semicolon),
            '&' | '|' if self.peek_char() == Some(ch) => {
                self.read_char();
                Some(if ch == '&' { Token::AndIf } else { Token::OrIf })
            }
            _ => None,
        }
    }

    fn handle_start(&mut self, ch: char, out: &mut Vec<Token>) {
        if is_delim(ch) {
            return;
        }
        if let Some(op) = self.try_operator(ch) {
            out.push(op);
            return;
        }
        self.state = LexingState::ReadingWord;
        self.handle_word(ch, out);
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) {
        if is_delim(ch) {
            self.finish_word(out);
            self.state = LexingState::Start;
            return;
        }
        if let Some(op) = self.try_operator(ch) {
            self.finish_word(out);
            out.push(op);
            self.state = LexingState::Start;
            return;
        }
        match ch {
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => self.buffer.push(c),
        }
    }

    fn handle_quote(&mut self, ch: char, quote: char) {
        if ch == quote {
            self.state = LexingState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }

    fn finish_word(&mut self, out: &mut Vec<Token>) {
        out.push(Token::Word(std::mem::take(&mut self.buffer)));
    }
}

fn is_delim(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// The main entry point function to perform lexical analysis.
///
/// # Returns
/// A vector of tokens on success, or a `LexingError` if a quote is left open.
pub fn split_into_tokens(line: &str) -> Result<Vec<Token>, LexingError> {
    LexingFSM::new(line).make_tokens()
}

/// Split `text` into plain words, ignoring operators. Used for alias bodies.
pub fn split_into_words(text: &str) -> Result<Vec<String>, LexingError> {
    Ok(split_into_tokens(text)?
        .into_iter()
        .filter_map(|token| match token {
            Token::Word(w) => Some(w),
            _ => None,
        })
        .collect())
}
